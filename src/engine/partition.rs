//! Splitting a table into contiguous chunks.

use std::ops::Range;

/// A contiguous chunk of rows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk<T> {
    /// The position of the chunk in the partition.
    pub index: usize,

    /// The 0-based rows of the original table held by the chunk.
    pub rows: Range<usize>,

    /// The items.
    pub items: Vec<T>,
}

/// Computes the sizes of `n` contiguous chunks covering `len` items.
///
/// The sizes differ by at most one and the larger chunks come first. When
/// `n` exceeds `len`, the trailing chunks are empty. An `n` of zero is
/// treated as one.
///
/// # Examples
///
/// ```
/// use annohit::engine::partition;
///
/// assert_eq!(partition::sizes(10, 3), vec![4, 3, 3]);
/// assert_eq!(partition::sizes(2, 4), vec![1, 1, 0, 0]);
/// assert_eq!(partition::sizes(0, 2), vec![0, 0]);
/// ```
pub fn sizes(len: usize, n: usize) -> Vec<usize> {
    let n = n.max(1);
    let (base, extra) = (len / n, len % n);

    (0..n).map(|i| base + usize::from(i < extra)).collect()
}

/// Splits items into `n` contiguous chunks, preserving their order.
///
/// # Examples
///
/// ```
/// use annohit::engine::partition;
///
/// let chunks = partition::split((0..5).collect::<Vec<_>>(), 2);
///
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].rows, 0..3);
/// assert_eq!(chunks[0].items, vec![0, 1, 2]);
/// assert_eq!(chunks[1].rows, 3..5);
/// assert_eq!(chunks[1].items, vec![3, 4]);
/// ```
pub fn split<T>(items: Vec<T>, n: usize) -> Vec<Chunk<T>> {
    let sizes = sizes(items.len(), n);
    let mut items = items.into_iter();
    let mut start = 0;

    sizes
        .into_iter()
        .enumerate()
        .map(|(index, size)| {
            let rows = start..start + size;
            start += size;

            Chunk {
                index,
                rows,
                items: items.by_ref().take(size).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_cover_every_item() {
        for len in 0..40 {
            for n in 1..=12 {
                let sizes = sizes(len, n);

                assert_eq!(sizes.len(), n);
                assert_eq!(sizes.iter().sum::<usize>(), len);

                let max = sizes.iter().max().copied().unwrap_or_default();
                let min = sizes.iter().min().copied().unwrap_or_default();
                assert!(max - min <= 1);
                assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
            }
        }
    }

    #[test]
    fn test_zero_chunks() {
        assert_eq!(sizes(3, 0), vec![3]);
    }

    #[test]
    fn test_split_preserves_order() {
        let items = (0..17).collect::<Vec<_>>();

        for n in 1..=17 {
            let chunks = split(items.clone(), n);

            assert!(chunks.iter().enumerate().all(|(i, chunk)| chunk.index == i));
            assert!(chunks
                .iter()
                .all(|chunk| chunk.items == items[chunk.rows.clone()]));

            let joined = chunks
                .into_iter()
                .flat_map(|chunk| chunk.items)
                .collect::<Vec<_>>();
            assert_eq!(joined, items);
        }
    }
}
