//! Reading and writing sequence records in the GenBank flat-file format.
//!
//! The flat-file format itself is handled by [`gb_io`]. This module only
//! translates between its [`Seq`] and a [`SequenceRecord`].
//!
//! Only the parts of a GenBank record used for annotation survive the
//! translation: the sequence, the feature types, the feature bounds and
//! strands, and the qualifiers. Features whose bounds cannot be determined
//! (e.g., features pointing into another record) are dropped. Qualifier
//! values wrapped over several lines are joined with single spaces.
//!
//! Writing is lossy: a feature is written as a single range, so a feature
//! without a strand (e.g., a join mixing both strands) reads back on the
//! forward strand. Text that must read back exactly should be kept as
//! received rather than rewritten.

use std::borrow::Cow;
use std::io;
use std::io::Read;
use std::io::Write;

use gb_io::reader::SeqReader;
use gb_io::seq::Location;
use gb_io::seq::Seq;
use gb_io::seq::Topology;

use crate::core::Interval;
use crate::core::Strand;
use crate::record::Feature;
use crate::record::SequenceRecord;

/// The molecule type written for every record.
const MOLECULE_TYPE: &str = "DNA";

/// The division written for every record.
const DIVISION: &str = "UNK";

/// An error associated with parsing a GenBank record.
#[derive(Debug)]
pub enum ParseError {
    /// The input did not contain a record.
    NoRecords,
    /// The input contained more than one record.
    MultipleRecords(usize),
    /// The input could not be read as GenBank.
    Invalid(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::NoRecords => write!(f, "no GenBank record found"),
            ParseError::MultipleRecords(n) => {
                write!(f, "expected exactly one GenBank record, found {}", n)
            }
            ParseError::Invalid(err) => write!(f, "invalid GenBank record: {}", err),
        }
    }
}

impl std::error::Error for ParseError {}

/// Reads exactly one GenBank record and files it under `accession`.
///
/// # Examples
///
/// ```
/// use annohit::core::Interval;
/// use annohit::record::genbank;
/// use annohit::record::Feature;
/// use annohit::record::SequenceRecord;
///
/// let record = SequenceRecord::new(
///     "seq0",
///     b"ATGAAACCCGGGTTTTAA".to_vec(),
///     vec![Feature::new("CDS", Interval::try_new(0, 18)?, None, Vec::new())],
/// );
///
/// let mut buffer = Vec::new();
/// genbank::write(&record, &mut buffer)?;
///
/// let parsed = genbank::parse("seq0", &buffer[..])?;
/// assert_eq!(parsed.sequence(), record.sequence());
/// assert_eq!(parsed.features()[0].location(), record.features()[0].location());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse<R>(accession: &str, reader: R) -> Result<SequenceRecord, ParseError>
where
    R: Read,
{
    let mut seqs = SeqReader::new(reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ParseError::Invalid(e.to_string()))?;

    match seqs.len() {
        0 => Err(ParseError::NoRecords),
        1 => Ok(from_seq(accession, seqs.remove(0))),
        n => Err(ParseError::MultipleRecords(n)),
    }
}

/// Writes a record as GenBank.
pub fn write<W>(record: &SequenceRecord, writer: W) -> io::Result<()>
where
    W: Write,
{
    gb_io::writer::write(writer, &to_seq(record))
}

/// Translates a [`Seq`] into a [`SequenceRecord`].
pub fn from_seq(accession: &str, seq: Seq) -> SequenceRecord {
    let features = seq
        .features
        .iter()
        .filter_map(|feature| {
            let (start, end) = feature.location.find_bounds().ok()?;
            let location = Interval::try_new(start, end).ok()?;
            let qualifiers = feature
                .qualifiers
                .iter()
                .map(|(key, value)| (key.to_string(), value.as_deref().map(unwrap_value)))
                .collect();

            Some(Feature::new(
                feature.kind.to_string(),
                location,
                strand_of(&feature.location),
                qualifiers,
            ))
        })
        .collect();

    SequenceRecord::new(accession, seq.seq, features)
}

/// Translates a [`SequenceRecord`] into a [`Seq`].
pub fn to_seq(record: &SequenceRecord) -> Seq {
    let mut seq = Seq::empty();

    seq.name = Some(record.accession().to_string());
    seq.accession = Some(record.accession().to_string());
    seq.version = Some(record.accession().to_string());
    seq.molecule_type = Some(MOLECULE_TYPE.to_string());
    seq.division = DIVISION.to_string();
    seq.topology = Topology::Linear;
    seq.seq = record.sequence().to_vec();
    seq.len = Some(seq.seq.len());
    seq.features = record
        .features()
        .iter()
        .filter_map(|feature| {
            let location = feature.location()?;
            let range = Location::simple_range(location.start(), location.end());
            let location = match feature.strand() {
                Some(Strand::Negative) => Location::Complement(Box::new(range)),
                _ => range,
            };

            Some(gb_io::seq::Feature {
                kind: Cow::Owned(feature.kind().to_string()),
                location,
                qualifiers: feature
                    .qualifiers()
                    .iter()
                    .map(|(key, value)| (Cow::Owned(key.clone()), value.clone()))
                    .collect(),
            })
        })
        .collect();

    seq
}

/// Joins the lines of a wrapped qualifier value with single spaces.
fn unwrap_value(value: &str) -> String {
    value.replace('\n', " ")
}

/// Determines the strand of a location.
///
/// Locations mixing both strands have no strand.
fn strand_of(location: &Location) -> Option<Strand> {
    let mut strands = Vec::new();
    collect_strands(location, false, &mut strands);

    if strands.is_empty() {
        None
    } else if strands.iter().all(|reverse| *reverse) {
        Some(Strand::Negative)
    } else if strands.iter().all(|reverse| !*reverse) {
        Some(Strand::Positive)
    } else {
        None
    }
}

/// Collects whether each part of a location lies on the reverse strand.
fn collect_strands(location: &Location, reverse: bool, strands: &mut Vec<bool>) {
    match location {
        Location::Range(_, _) | Location::Between(_, _) => strands.push(reverse),
        Location::Complement(inner) => collect_strands(inner, !reverse, strands),
        Location::Join(parts)
        | Location::Order(parts)
        | Location::Bond(parts)
        | Location::OneOf(parts) => {
            for part in parts {
                collect_strands(part, reverse, strands);
            }
        }
        Location::External(_, inner) => {
            if let Some(inner) = inner {
                collect_strands(inner, reverse, strands);
            }
        }
        Location::Gap(_) => {}
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn record() -> Result<SequenceRecord, Box<dyn std::error::Error>> {
        Ok(SequenceRecord::new(
            "NC_999999.1",
            b"atgaaacccgggttttaaatgcccgggaaatag".to_vec(),
            vec![
                Feature::new(
                    "source",
                    Interval::try_new(0, 33)?,
                    Some(Strand::Positive),
                    vec![(String::from("organism"), Some(String::from("synthetic")))],
                ),
                Feature::new(
                    "CDS",
                    Interval::try_new(0, 18)?,
                    Some(Strand::Positive),
                    vec![(String::from("locus_tag"), Some(String::from("SYN_0001")))],
                ),
                Feature::new(
                    "CDS",
                    Interval::try_new(18, 33)?,
                    Some(Strand::Negative),
                    vec![
                        (String::from("locus_tag"), Some(String::from("SYN_0002"))),
                        (String::from("pseudo"), None),
                    ],
                ),
            ],
        ))
    }

    /// The accession of [`NCBI_RECORD`].
    pub const NCBI_ACCESSION: &str = "NC_999998.1";

    /// A record laid out the way efetch returns it, with a wrapped qualifier
    /// and a join spanning both strands.
    pub const NCBI_RECORD: &str =
        r#"LOCUS       NC_999998                 60 bp    DNA     linear   CON 01-JAN-2024
DEFINITION  Synthetic construct.
ACCESSION   NC_999998
VERSION     NC_999998.1
KEYWORDS    .
SOURCE      synthetic construct
  ORGANISM  synthetic construct
            other sequences.
FEATURES             Location/Qualifiers
     source          1..60
                     /organism="synthetic construct"
                     /mol_type="genomic DNA"
     CDS             1..30
                     /locus_tag="SYN_0101"
                     /note="Derived by automated computational analysis using
                     gene prediction method: Protein Homology."
     CDS             join(31..40,complement(45..60))
                     /locus_tag="SYN_0102"
ORIGIN
        1 atgaaaccca aaccccgggt tttaaatgcc cgggaaatag atgcccggga aataggcccg
//
"#;

    #[test]
    fn test_parse_ncbi_record() -> Result<(), Box<dyn std::error::Error>> {
        let record = parse(NCBI_ACCESSION, NCBI_RECORD.as_bytes())?;

        assert_eq!(record.accession(), NCBI_ACCESSION);
        assert_eq!(record.sequence().len(), 60);
        assert!(record.sequence().starts_with(b"ATGAAACCCA"));
        assert_eq!(record.features().len(), 3);

        let cds = &record.features()[1];
        assert_eq!(cds.location(), Some(&Interval::try_new(0, 30)?));
        assert_eq!(cds.strand(), Some(Strand::Positive));
        assert_eq!(
            cds.qualifier_values("note").next(),
            Some(concat!(
                "Derived by automated computational analysis using ",
                "gene prediction method: Protein Homology."
            ))
        );

        let mixed = &record.features()[2];
        assert_eq!(mixed.location(), Some(&Interval::try_new(30, 60)?));
        assert_eq!(mixed.strand(), None);
        assert_eq!(mixed.locus_tag(), Some("SYN_0102"));

        Ok(())
    }

    #[test]
    fn test_write_then_parse() -> Result<(), Box<dyn std::error::Error>> {
        let record = record()?;

        let mut buffer = Vec::new();
        write(&record, &mut buffer)?;
        let parsed = parse("NC_999999.1", &buffer[..])?;

        assert_eq!(parsed, record);
        assert_eq!(parsed.features()[2].strand(), Some(Strand::Negative));
        assert!(parsed.features()[2].is_pseudo());

        Ok(())
    }

    #[test]
    fn test_written_text_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let record = record()?;

        let mut first = Vec::new();
        write(&record, &mut first)?;
        let mut second = Vec::new();
        write(&parse("NC_999999.1", &first[..])?, &mut second)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("seq0", &b""[..]).is_err());
    }

    #[test]
    fn test_strand_of_locations() {
        let forward = Location::simple_range(0, 10);
        let reverse = Location::Complement(Box::new(Location::simple_range(0, 10)));
        let mixed = Location::Join(vec![
            Location::simple_range(0, 10),
            Location::Complement(Box::new(Location::simple_range(20, 30))),
        ]);
        let reverse_join = Location::Complement(Box::new(Location::Join(vec![
            Location::simple_range(0, 10),
            Location::simple_range(20, 30),
        ])));

        assert_eq!(strand_of(&forward), Some(Strand::Positive));
        assert_eq!(strand_of(&reverse), Some(Strand::Negative));
        assert_eq!(strand_of(&mixed), None);
        assert_eq!(strand_of(&reverse_join), Some(Strand::Negative));
    }
}
