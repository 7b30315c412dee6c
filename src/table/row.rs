//! A single hit within a hit table.

use crate::core::Strand;
use crate::record::Feature;
use crate::record::SequenceRecord;

/// A hit between a query and a subject.
///
/// The coordinates are taken verbatim from the table. The derived fields are
/// unset until the row is annotated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HitRow {
    /// The query accession (or composite query header).
    qaccver: String,

    /// The subject accession.
    saccver: String,

    /// The query start position.
    qstart: Option<i64>,

    /// The query end position.
    qend: Option<i64>,

    /// The subject start position.
    sstart: i64,

    /// The subject end position.
    send: i64,

    /// The values of the pass-through columns.
    passthrough: Vec<String>,

    /// The locus tag of the subject feature.
    stag: Option<String>,

    /// The locus tag of the query feature.
    qtag: Option<String>,

    /// Whether the subject feature is a pseudogene.
    psudo: Option<bool>,

    /// The strand of the subject feature.
    sframe: Option<Strand>,

    /// The sequence of the subject feature.
    sseq: Option<String>,
}

impl HitRow {
    /// Creates a new, unannotated row.
    pub fn new(
        qaccver: impl Into<String>,
        saccver: impl Into<String>,
        sstart: i64,
        send: i64,
    ) -> Self {
        Self {
            qaccver: qaccver.into(),
            saccver: saccver.into(),
            sstart,
            send,
            ..Default::default()
        }
    }

    /// Sets the query bounds.
    pub fn with_query_bounds(mut self, qstart: Option<i64>, qend: Option<i64>) -> Self {
        self.qstart = qstart;
        self.qend = qend;
        self
    }

    /// Sets the values of the pass-through columns.
    pub fn with_passthrough(mut self, passthrough: Vec<String>) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Gets the query accession (or composite query header).
    pub fn qaccver(&self) -> &str {
        &self.qaccver
    }

    /// Gets the subject accession.
    pub fn saccver(&self) -> &str {
        &self.saccver
    }

    /// Gets the query start position.
    pub fn qstart(&self) -> Option<i64> {
        self.qstart
    }

    /// Gets the query end position.
    pub fn qend(&self) -> Option<i64> {
        self.qend
    }

    /// Gets the subject start position.
    pub fn sstart(&self) -> i64 {
        self.sstart
    }

    /// Gets the subject end position.
    pub fn send(&self) -> i64 {
        self.send
    }

    /// Gets the values of the pass-through columns.
    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Gets the locus tag of the subject feature.
    pub fn stag(&self) -> Option<&str> {
        self.stag.as_deref()
    }

    /// Gets the locus tag of the query feature.
    pub fn qtag(&self) -> Option<&str> {
        self.qtag.as_deref()
    }

    /// Gets whether the subject feature is a pseudogene.
    pub fn psudo(&self) -> Option<bool> {
        self.psudo
    }

    /// Gets the strand of the subject feature.
    pub fn sframe(&self) -> Option<Strand> {
        self.sframe
    }

    /// Gets the sequence of the subject feature.
    pub fn sseq(&self) -> Option<&str> {
        self.sseq.as_deref()
    }

    /// Writes the located query feature into the row.
    ///
    /// The empty feature unsets the query tag and bounds.
    pub fn annotate_query(mut self, feature: &Feature) -> Self {
        let location = feature.location();

        self.qtag = feature.locus_tag().map(String::from);
        self.qstart = location.map(|location| location.start());
        self.qend = location.map(|location| location.end());
        self
    }

    /// Writes the located subject feature of `record` into the row.
    ///
    /// Returns [`None`] for the empty feature: such a row is dropped from
    /// the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::core::Interval;
    /// use annohit::core::Strand;
    /// use annohit::record::feature::EMPTY;
    /// use annohit::record::Feature;
    /// use annohit::record::SequenceRecord;
    /// use annohit::table::HitRow;
    ///
    /// let interval = Interval::try_new(2, 6)?;
    /// let feature = Feature::new("CDS", interval, Some(Strand::Negative), Vec::new());
    /// let record = SequenceRecord::new("seq0", b"AACCGGTT".to_vec(), vec![feature.clone()]);
    ///
    /// let row = HitRow::new("q", "seq0", 3, 5).annotate_subject(&feature, &record).unwrap();
    /// assert_eq!(row.sstart(), 2);
    /// assert_eq!(row.send(), 6);
    /// assert_eq!(row.sframe(), Some(Strand::Negative));
    /// assert_eq!(row.sseq(), Some("CCGG"));
    ///
    /// assert!(HitRow::new("q", "seq0", 3, 5).annotate_subject(&EMPTY, &record).is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn annotate_subject(mut self, feature: &Feature, record: &SequenceRecord) -> Option<Self> {
        let location = feature.location()?;

        self.sstart = location.start();
        self.send = location.end();
        self.sframe = feature.strand();
        self.sseq = Some(String::from_utf8_lossy(record.slice(location)).into_owned());
        self.stag = feature.locus_tag().map(String::from);

        if feature.is_pseudo() {
            self.psudo = Some(true);
        }

        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Interval;
    use crate::record::feature::EMPTY;

    fn feature() -> Result<Feature, Box<dyn std::error::Error>> {
        Ok(Feature::new(
            "CDS",
            Interval::try_new(0, 6)?,
            Some(Strand::Positive),
            vec![
                (String::from("locus_tag"), Some(String::from("T_1"))),
                (String::from("locus_tag"), Some(String::from("T_2"))),
                (String::from("pseudo"), None),
            ],
        ))
    }

    #[test]
    fn test_annotate_query() -> Result<(), Box<dyn std::error::Error>> {
        let row = HitRow::new("seq0:1-5", "seq1", 10, 20)
            .with_query_bounds(Some(1), Some(5))
            .annotate_query(&feature()?);

        assert_eq!(row.qtag(), Some("T_1"));
        assert_eq!(row.qstart(), Some(0));
        assert_eq!(row.qend(), Some(6));

        let row = row.annotate_query(&EMPTY);
        assert_eq!(row.qtag(), None);
        assert_eq!(row.qstart(), None);
        assert_eq!(row.qend(), None);

        Ok(())
    }

    #[test]
    fn test_annotate_subject() -> Result<(), Box<dyn std::error::Error>> {
        let record = SequenceRecord::new("seq1", b"atgtaa".to_vec(), vec![feature()?]);
        let row = HitRow::new("q", "seq1", 1, 4)
            .with_passthrough(vec![String::from("x")])
            .annotate_subject(&record.features()[0], &record)
            .unwrap();

        assert_eq!(row.stag(), Some("T_1"));
        assert_eq!(row.psudo(), Some(true));
        assert_eq!(row.sframe(), Some(Strand::Positive));
        assert_eq!(row.sseq(), Some("ATGTAA"));
        assert_eq!((row.sstart(), row.send()), (0, 6));
        assert_eq!(row.passthrough(), &[String::from("x")]);

        Ok(())
    }

    #[test]
    fn test_not_pseudo() -> Result<(), Box<dyn std::error::Error>> {
        let feature = Feature::new("CDS", Interval::try_new(0, 3)?, None, Vec::new());
        let record = SequenceRecord::new("seq1", b"ATG".to_vec(), vec![feature.clone()]);

        let row = HitRow::new("q", "seq1", 0, 3)
            .annotate_subject(&feature, &record)
            .unwrap();

        assert_eq!(row.psudo(), None);
        assert_eq!(row.stag(), None);
        assert_eq!(row.sframe(), None);

        Ok(())
    }
}
