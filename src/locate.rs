//! Locating the feature that covers a hit.
//!
//! Features are scanned in the order they are stored in the record. Features
//! whose type is not included are skipped. What happens at the first included
//! feature depends on the [`ScanPolicy`]:
//!
//! - [`ScanPolicy::FirstCandidate`] lets the first included feature decide the
//!   outcome. If it covers the hit, it is returned. Otherwise, the
//!   [empty feature](crate::record::feature::EMPTY) is returned without looking
//!   at any other feature.
//! - [`ScanPolicy::FirstContaining`] keeps scanning and returns the first
//!   included feature that covers the hit.
//!
//! In both cases, the empty feature is returned when the scan is exhausted.
//! Absence is never an error.

use tracing::trace;

use crate::record::feature::EMPTY;
use crate::record::Feature;
use crate::record::SequenceRecord;

/// The feature type included by default.
pub const DEFAULT_FEATURE_TYPE: &str = "CDS";

/// How the scan treats included features that do not cover the hit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScanPolicy {
    /// Stop at the first included feature.
    #[default]
    FirstCandidate,

    /// Stop at the first included feature covering the hit.
    FirstContaining,
}

/// Options for locating a feature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// The feature types to consider.
    pub included_types: Vec<String>,

    /// The scan policy.
    pub policy: ScanPolicy,
}

impl Options {
    /// Returns whether a feature type is included.
    pub fn includes(&self, kind: &str) -> bool {
        self.included_types.iter().any(|included| included == kind)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            included_types: vec![DEFAULT_FEATURE_TYPE.to_string()],
            policy: ScanPolicy::default(),
        }
    }
}

/// Locates the feature covering the hit `[hit_start, hit_end]`.
///
/// # Examples
///
/// ```
/// use annohit::core::Interval;
/// use annohit::locate;
/// use annohit::record::Feature;
/// use annohit::record::SequenceRecord;
///
/// let record = SequenceRecord::new(
///     "seq0",
///     vec![b'A'; 300],
///     vec![Feature::new("CDS", Interval::try_new(100, 200)?, None, Vec::new())],
/// );
///
/// let options = locate::Options::default();
///
/// let feature = locate::locate(&record, 120, 180, &options);
/// assert_eq!(feature, &record.features()[0]);
///
/// let feature = locate::locate(&record, 50, 90, &options);
/// assert!(feature.is_empty());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn locate<'a>(
    record: &'a SequenceRecord,
    hit_start: i64,
    hit_end: i64,
    options: &Options,
) -> &'a Feature {
    for feature in record.features() {
        if !options.includes(feature.kind()) {
            trace!(
                "skipped {} feature {}",
                feature.kind(),
                feature.locus_tag().unwrap_or("without locus tag")
            );
            continue;
        }

        let contained = feature
            .location()
            .map(|location| location.contains_hit(hit_start, hit_end))
            .unwrap_or(false);

        if contained {
            trace!(
                "found feature in {} at {}",
                record.accession(),
                feature
                    .location()
                    .map(|location| location.to_string())
                    .unwrap_or_default()
            );
            return feature;
        }

        if options.policy == ScanPolicy::FirstCandidate {
            break;
        }
    }

    trace!(
        "no feature in {} covering {}..{}",
        record.accession(),
        hit_start,
        hit_end
    );

    &EMPTY
}
