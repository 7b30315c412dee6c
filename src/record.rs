//! Sequence records and their features.

pub mod feature;
pub mod genbank;

pub use feature::Feature;

use crate::core::Interval;

/// A sequence record resolved from an accession.
///
/// Records are never modified after they are created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SequenceRecord {
    /// The accession.
    accession: String,

    /// The upper-cased sequence.
    sequence: Vec<u8>,

    /// The features in the order they were provided.
    features: Vec<Feature>,
}

impl SequenceRecord {
    /// Creates a new sequence record.
    ///
    /// The sequence is upper-cased.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::record::SequenceRecord;
    ///
    /// let record = SequenceRecord::new("seq0", b"acgt".to_vec(), Vec::new());
    ///
    /// assert_eq!(record.accession(), "seq0");
    /// assert_eq!(record.sequence(), b"ACGT");
    /// assert!(record.features().is_empty());
    /// ```
    pub fn new(
        accession: impl Into<String>,
        mut sequence: Vec<u8>,
        features: Vec<Feature>,
    ) -> Self {
        sequence.make_ascii_uppercase();

        Self {
            accession: accession.into(),
            sequence,
            features,
        }
    }

    /// Gets the accession.
    pub fn accession(&self) -> &str {
        &self.accession
    }

    /// Gets the sequence.
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Gets the features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Gets the part of the sequence covered by an interval.
    ///
    /// Bounds outside of the sequence are clamped to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Interval;
    /// use annohit::record::SequenceRecord;
    ///
    /// let record = SequenceRecord::new("seq0", b"AACCGGTT".to_vec(), Vec::new());
    ///
    /// assert_eq!(record.slice(&Interval::try_new(2, 6)?), b"CCGG");
    /// assert_eq!(record.slice(&Interval::try_new(6, 100)?), b"TT");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn slice(&self, interval: &Interval) -> &[u8] {
        let len = self.sequence.len();
        let clamp = |position: i64| usize::try_from(position.max(0)).map_or(len, |p| p.min(len));

        &self.sequence[clamp(interval.start())..clamp(interval.end())]
    }
}
