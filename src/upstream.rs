//! Upstream (promoter) windows in front of a feature.
//!
//! ```text
//!              sense (+1)                       antisense (-1)
//!
//!   [start - length - 1, start + 2)       [stop - 3, stop + length + 1)
//!   ---------------------|>>>>>>>>>       <<<<<<<<<|---------------------
//!                      start                     stop
//! ```
//!
//! With `include_first_codon`, the window reaches into the feature far enough
//! to cover its first codon.

use tracing::debug;

use crate::core::Strand;
use crate::record::Feature;

/// The default length of an upstream window.
pub const DEFAULT_LENGTH: i64 = 200;

/// An error related to computing an upstream window.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The strand was neither `1` nor `-1`.
    InvalidStrand(i64),
    /// The feature has no location.
    MissingLocation,
    /// The feature has no strand.
    MissingStrand,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidStrand(strand) => {
                write!(f, "invalid strand: expected 1 or -1, found {}", strand)
            }
            Error::MissingLocation => write!(f, "feature has no location"),
            Error::MissingStrand => write!(f, "feature has no strand"),
        }
    }
}

impl std::error::Error for Error {}

/// Options for computing an upstream window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// The number of positions in front of the feature.
    pub length: i64,

    /// Whether to extend the window over the first codon of the feature.
    pub include_first_codon: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            include_first_codon: true,
        }
    }
}

/// Computes the upstream window of a feature spanning `start` to `stop` on
/// `strand`.
///
/// # Examples
///
/// ```
/// use annohit::upstream;
///
/// let options = upstream::Options::default();
///
/// assert_eq!(upstream::region(1, 500, 800, &options)?, (299, 502));
/// assert_eq!(upstream::region(-1, 500, 800, &options)?, (797, 1001));
/// assert!(upstream::region(0, 500, 800, &options).is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn region(strand: i64, start: i64, stop: i64, options: &Options) -> Result<(i64, i64), Error> {
    let strand = Strand::try_from(strand).map_err(|_| Error::InvalidStrand(strand))?;

    let (mut start_region, mut stop_region) = match strand {
        Strand::Positive => (start - options.length - 1, start),
        Strand::Negative => (stop, stop + options.length + 1),
    };

    debug!(
        "upstream window on the {} strand: {}..{}",
        strand, start_region, stop_region
    );

    if options.include_first_codon {
        match strand {
            Strand::Positive => stop_region += 2,
            Strand::Negative => start_region -= 3,
        }

        debug!("extended upstream window over the first codon");
    }

    Ok((start_region, stop_region))
}

/// Computes the upstream window of a located feature.
pub fn region_for(feature: &Feature, options: &Options) -> Result<(i64, i64), Error> {
    let location = feature.location().ok_or(Error::MissingLocation)?;
    let strand = feature.strand().ok_or(Error::MissingStrand)?;

    region(strand.as_number(), location.start(), location.end(), options)
}
