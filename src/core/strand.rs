//! The strand upon which a feature is located.

use std::str::FromStr;

/// An error related to the parsing of a strand.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseStrandError {
    /// The numeric strand was not `1` or `-1`.
    InvalidNumber(i64),
    /// The textual strand was not `+` or `-`.
    InvalidSymbol(String),
}

impl std::fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStrandError::InvalidNumber(n) => {
                write!(f, "parse strand error: {} is not a valid strand", n)
            }
            ParseStrandError::InvalidSymbol(s) => {
                write!(f, "parse strand error: {} is not a valid strand", s)
            }
        }
    }
}

impl std::error::Error for ParseStrandError {}

/// The strand of a feature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Strand {
    /// The positive strand (`+`, `1`).
    Positive,
    /// The negative strand (`-`, `-1`).
    Negative,
}

impl Strand {
    /// Returns the strand as the signed number used in GenBank tooling.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Strand;
    ///
    /// assert_eq!(Strand::Positive.as_number(), 1);
    /// assert_eq!(Strand::Negative.as_number(), -1);
    /// ```
    pub fn as_number(&self) -> i64 {
        match self {
            Strand::Positive => 1,
            Strand::Negative => -1,
        }
    }
}

impl TryFrom<i64> for Strand {
    type Error = ParseStrandError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Positive),
            -1 => Ok(Self::Negative),
            n => Err(ParseStrandError::InvalidNumber(n)),
        }
    }
}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" | "1" | "+1" => Ok(Self::Positive),
            "-" | "-1" => Ok(Self::Negative),
            c => Err(ParseStrandError::InvalidSymbol(c.into())),
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Positive => write!(f, "+"),
            Strand::Negative => write!(f, "-"),
        }
    }
}
