//! Annotated sub-regions of a sequence record.

use crate::core::Interval;
use crate::core::Strand;

/// The qualifier holding the locus tag of a feature.
pub const LOCUS_TAG: &str = "locus_tag";

/// The qualifier marking a feature as a pseudogene.
pub const PSEUDO: &str = "pseudo";

/// The feature returned when no feature matches a lookup.
pub static EMPTY: Feature = Feature::empty();

/// A feature within a sequence record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Feature {
    /// The type tag (e.g., `CDS`, `gene`, `source`).
    kind: String,

    /// The bounds of the feature.
    location: Option<Interval>,

    /// The strand of the feature.
    strand: Option<Strand>,

    /// The qualifiers in their original order.
    qualifiers: Vec<(String, Option<String>)>,
}

impl Feature {
    /// Creates a new feature.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Interval;
    /// use annohit::core::Strand;
    /// use annohit::record::Feature;
    ///
    /// let feature = Feature::new(
    ///     "CDS",
    ///     Interval::try_new(100, 200)?,
    ///     Some(Strand::Positive),
    ///     vec![(String::from("locus_tag"), Some(String::from("b0001")))],
    /// );
    ///
    /// assert_eq!(feature.kind(), "CDS");
    /// assert_eq!(feature.locus_tag(), Some("b0001"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        kind: impl Into<String>,
        location: Interval,
        strand: Option<Strand>,
        qualifiers: Vec<(String, Option<String>)>,
    ) -> Self {
        Self {
            kind: kind.into(),
            location: Some(location),
            strand,
            qualifiers,
        }
    }

    /// Creates the empty feature.
    ///
    /// The empty feature has no type, location, strand, or qualifiers. It is
    /// what lookups return instead of an error when nothing matches.
    pub const fn empty() -> Self {
        Self {
            kind: String::new(),
            location: None,
            strand: None,
            qualifiers: Vec::new(),
        }
    }

    /// Returns whether this is the empty feature (i.e., it has no location).
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
    }

    /// Gets the type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Gets the location.
    pub fn location(&self) -> Option<&Interval> {
        self.location.as_ref()
    }

    /// Gets the strand.
    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    /// Gets the qualifiers.
    pub fn qualifiers(&self) -> &[(String, Option<String>)] {
        &self.qualifiers
    }

    /// Returns whether a qualifier with the given name is present.
    pub fn has_qualifier(&self, name: &str) -> bool {
        self.qualifiers.iter().any(|(key, _)| key == name)
    }

    /// Returns all values of the qualifier with the given name.
    ///
    /// Qualifiers without a value (such as `/pseudo`) are skipped.
    pub fn qualifier_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.qualifiers
            .iter()
            .filter(move |(key, _)| key == name)
            .filter_map(|(_, value)| value.as_deref())
    }

    /// Gets the first locus tag of the feature.
    pub fn locus_tag(&self) -> Option<&str> {
        self.qualifier_values(LOCUS_TAG).next()
    }

    /// Returns whether the feature is marked as a pseudogene.
    pub fn is_pseudo(&self) -> bool {
        self.has_qualifier(PSEUDO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature() -> Result<Feature, Box<dyn std::error::Error>> {
        Ok(Feature::new(
            "CDS",
            Interval::try_new(10, 40)?,
            Some(Strand::Negative),
            vec![
                (String::from("locus_tag"), Some(String::from("ECO_0001"))),
                (String::from("pseudo"), None),
                (String::from("note"), Some(String::from("first"))),
                (String::from("note"), Some(String::from("second"))),
            ],
        ))
    }

    #[test]
    fn test_qualifiers() -> Result<(), Box<dyn std::error::Error>> {
        let feature = feature()?;

        assert_eq!(feature.locus_tag(), Some("ECO_0001"));
        assert!(feature.is_pseudo());
        assert_eq!(
            feature.qualifier_values("note").collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert_eq!(feature.qualifier_values("product").count(), 0);

        Ok(())
    }

    #[test]
    fn test_empty_feature() -> Result<(), Box<dyn std::error::Error>> {
        assert!(EMPTY.is_empty());
        assert_eq!(EMPTY.kind(), "");
        assert_eq!(EMPTY.location(), None);
        assert_eq!(EMPTY.strand(), None);
        assert_eq!(EMPTY.locus_tag(), None);
        assert!(!EMPTY.is_pseudo());

        assert!(!feature()?.is_empty());
        assert_eq!(Feature::default(), EMPTY);

        Ok(())
    }
}
