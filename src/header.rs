//! Composite query headers of the form `<accession>:<start>-<end>`.
//!
//! Query sequences that were cut out of a larger record (for example, with
//! `samtools faidx` or `blastdbcmd -range`) carry their origin in their
//! identifier. This module splits such an identifier back into its parts.

use std::num::ParseIntError;
use std::str::FromStr;

/// The delimiter between the accession and the location.
pub const ACCESSION_DELIMITER: char = ':';

/// The delimiter between the start and the end of the location.
pub const RANGE_DELIMITER: char = '-';

/// An error associated with parsing a header.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The header does not contain the accession delimiter.
    MissingSeparator(String),
    /// The header contains more than one accession delimiter.
    TooManySeparators(String),
    /// The location does not contain the range delimiter.
    MissingRangeSeparator(String),
    /// The location contains more than one range delimiter.
    TooManyRangeSeparators(String),
    /// An invalid start position.
    InvalidStart(ParseIntError),
    /// An invalid end position.
    InvalidEnd(ParseIntError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingSeparator(s) => write!(
                f,
                "missing \"{}\" between accession and location: {}",
                ACCESSION_DELIMITER, s
            ),
            ParseError::TooManySeparators(s) => write!(
                f,
                "expected exactly one \"{}\" in header: {}",
                ACCESSION_DELIMITER, s
            ),
            ParseError::MissingRangeSeparator(s) => write!(
                f,
                "missing \"{}\" between start and end: {}",
                RANGE_DELIMITER, s
            ),
            ParseError::TooManyRangeSeparators(s) => write!(
                f,
                "expected exactly one \"{}\" in location: {}",
                RANGE_DELIMITER, s
            ),
            ParseError::InvalidStart(err) => write!(f, "invalid start: {}", err),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {}", err),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed `<accession>:<start>-<end>` header.
///
/// No relationship between the start and the end is enforced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// The accession.
    accession: String,
    /// The start position.
    start: i64,
    /// The end position.
    end: i64,
}

impl Header {
    /// Creates a new header.
    pub fn new(accession: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            accession: accession.into(),
            start,
            end,
        }
    }

    /// Gets the accession.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::header::Header;
    ///
    /// let header = "NC_000913.3:190-255".parse::<Header>()?;
    /// assert_eq!(header.accession(), "NC_000913.3");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn accession(&self) -> &str {
        &self.accession
    }

    /// Gets the start position.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Consumes self and returns the parts of the header.
    pub fn into_parts(self) -> (String, i64, i64) {
        (self.accession, self.start, self.end)
    }
}

impl FromStr for Header {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(ACCESSION_DELIMITER).collect::<Vec<_>>();
        let (accession, location) = match parts.as_slice() {
            [_] => return Err(ParseError::MissingSeparator(s.into())),
            [accession, location] => (*accession, *location),
            _ => return Err(ParseError::TooManySeparators(s.into())),
        };

        let bounds = location.split(RANGE_DELIMITER).collect::<Vec<_>>();
        let (start, end) = match bounds.as_slice() {
            [_] => return Err(ParseError::MissingRangeSeparator(location.into())),
            [start, end] => (*start, *end),
            _ => return Err(ParseError::TooManyRangeSeparators(location.into())),
        };

        // Whitespace around a position is tolerated, as in `acc:1- 9`.
        let start = start.trim().parse().map_err(ParseError::InvalidStart)?;
        let end = end.trim().parse().map_err(ParseError::InvalidEnd)?;

        Ok(Self::new(accession, start, end))
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.accession, ACCESSION_DELIMITER, self.start, RANGE_DELIMITER, self.end
        )
    }
}

/// Splits a header into its accession, start, and end.
///
/// # Examples
///
/// ```
/// let (accession, start, end) = annohit::header::split("NZ_CP009072.1:1-1200")?;
///
/// assert_eq!(accession, "NZ_CP009072.1");
/// assert_eq!(start, 1);
/// assert_eq!(end, 1200);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn split(header: &str) -> Result<(String, i64, i64), ParseError> {
    header.parse::<Header>().map(Header::into_parts)
}
