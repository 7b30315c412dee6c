//! A 0-based, half-open interval over the coordinate space of a record.
//!
//! ```text
//! ================ rec0 ===============
//!
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! -------------------------------------
//! |   |   | X | X | X | X | O |   |   |  <= [2, 6)
//! ```
//!
//! Feature locations read from GenBank files are stored in this form. Hits
//! from an alignment table are _not_ converted: a hit `[start, end]` is tested
//! against the raw bounds with a closed comparison (see
//! [`Interval::contains_hit()`]).

/// An error related to an interval.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The start position is greater than the end position.
    StartGreaterThanEnd(i64, i64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::StartGreaterThanEnd(start, end) => write!(
                f,
                "start position ({}) cannot be greater than the end position ({})",
                start, end
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A 0-based, half-open interval.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Interval {
    /// The start position (inclusive).
    start: i64,

    /// The end position (exclusive).
    end: i64,
}

impl Interval {
    /// Attempts to create a new interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Interval;
    ///
    /// let interval = Interval::try_new(100, 200)?;
    /// assert_eq!(interval.start(), 100);
    /// assert_eq!(interval.end(), 200);
    ///
    /// assert!(Interval::try_new(200, 100).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(start: i64, end: i64) -> Result<Self, Error> {
        if start > end {
            return Err(Error::StartGreaterThanEnd(start, end));
        }

        Ok(Self { start, end })
    }

    /// Gets the start position.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Gets the number of positions spanned by the interval.
    pub fn len(&self) -> u64 {
        self.start.abs_diff(self.end)
    }

    /// Returns whether the interval spans zero positions.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns whether the hit `[hit_start, hit_end]` falls within the
    /// interval.
    ///
    /// The comparison is closed on both sides: the hit is contained if and
    /// only if `hit_start >= start` and `hit_end <= end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Interval;
    ///
    /// let interval = Interval::try_new(100, 200)?;
    /// assert!(interval.contains_hit(120, 180));
    /// assert!(interval.contains_hit(100, 200));
    /// assert!(!interval.contains_hit(50, 90));
    /// assert!(!interval.contains_hit(150, 201));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn contains_hit(&self, hit_start: i64, hit_end: i64) -> bool {
        hit_start >= self.start && hit_end <= self.end
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_interval() -> Result<(), Box<dyn std::error::Error>> {
        let interval = Interval::try_new(10, 20)?;
        assert_eq!(interval.len(), 10);
        assert!(!interval.is_empty());
        assert_eq!(interval.to_string(), "[10, 20)");

        let interval = Interval::try_new(-5, -5)?;
        assert!(interval.is_empty());

        Ok(())
    }

    #[test]
    fn test_invalid_interval() {
        let err = Interval::try_new(20, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "start position (20) cannot be greater than the end position (10)"
        );
    }

    #[test]
    fn test_containment_is_closed() -> Result<(), Box<dyn std::error::Error>> {
        let interval = Interval::try_new(100, 200)?;

        assert!(interval.contains_hit(100, 100));
        assert!(interval.contains_hit(200, 200));
        assert!(!interval.contains_hit(99, 150));
        assert!(!interval.contains_hit(150, 201));

        Ok(())
    }
}
