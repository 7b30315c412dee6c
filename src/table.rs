//! Alignment hit tables.
//!
//! A table is read as a [`RawTable`] of text cells, normalized against the
//! known [schemas](schema) into a [`Table`] of [`HitRow`]s, annotated, and
//! written back out.
//!
//! ```
//! use annohit::table;
//!
//! let data = b"q1:1-9\tNC_000913.3\t100.0\t9\t0\t0\t1\t9\t337\t345\t1e-5\t18.3\n";
//! let raw = table::Reader::new(&data[..], false).read()?;
//! let table = table::normalize(raw, None)?;
//!
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.rows()[0].saccver(), "NC_000913.3");
//! assert_eq!(table.rows()[0].sstart(), 337);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod reader;
pub mod row;
pub mod schema;
pub mod writer;

pub use reader::Reader;
pub use row::HitRow;
pub use schema::Schema;
pub use writer::Writer;

use schema::Inferred;

/// The query accession column.
pub const QACCVER: &str = "qaccver";

/// The subject accession column.
pub const SACCVER: &str = "saccver";

/// The query start column.
pub const QSTART: &str = "qstart";

/// The query end column.
pub const QEND: &str = "qend";

/// The subject start column.
pub const SSTART: &str = "sstart";

/// The subject end column.
pub const SEND: &str = "send";

/// The columns held by the fields of a [`HitRow`], in output order.
pub const CORE_COLUMNS: &[&str] = &[QACCVER, SACCVER, QSTART, QEND, SSTART, SEND];

/// The columns derived during annotation, in output order.
pub const DERIVED_COLUMNS: &[&str] = &["stag", "qtag", "psudo", "sframe", "sseq"];

/// An error related to normalizing a table.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The columns could not be determined.
    Schema(schema::Error),
    /// A required column is missing.
    MissingColumn(&'static str),
    /// A row has a different number of cells than the table has columns.
    RowLength {
        /// The 0-based row.
        row: usize,
        /// The number of columns.
        expected: usize,
        /// The number of cells.
        found: usize,
    },
    /// A coordinate is not an integer.
    InvalidCoordinate {
        /// The column.
        column: &'static str,
        /// The 0-based row.
        row: usize,
        /// The offending value.
        value: String,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Schema(err) => write!(f, "schema error: {}", err),
            Error::MissingColumn(column) => write!(f, "missing required column: {}", column),
            Error::RowLength {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, found, expected
            ),
            Error::InvalidCoordinate { column, row, value } => write!(
                f,
                "invalid coordinate in column {} of row {}: \"{}\"",
                column, row, value
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A table of text cells, as read from a file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawTable {
    /// The header row, if the file has one.
    header: Option<Vec<String>>,

    /// The data rows.
    records: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a new raw table.
    pub fn new(header: Option<Vec<String>>, records: Vec<Vec<String>>) -> Self {
        Self { header, records }
    }

    /// Gets the header row.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Gets the data rows.
    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    /// Gets the number of columns.
    pub fn width(&self) -> usize {
        self.header
            .as_ref()
            .or(self.records.first())
            .map(Vec::len)
            .unwrap_or_default()
    }

    /// Infers the kind of every column.
    pub fn kinds(&self) -> Vec<Inferred> {
        (0..self.width())
            .map(|i| {
                Inferred::of_column(
                    self.records
                        .iter()
                        .filter_map(|record| record.get(i).map(String::as_str)),
                )
            })
            .collect()
    }
}

/// A normalized hit table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    /// The names of the pass-through columns.
    columns: Vec<String>,

    /// The rows.
    rows: Vec<HitRow>,
}

impl Table {
    /// Creates a new table.
    pub fn new(columns: Vec<String>, rows: Vec<HitRow>) -> Self {
        Self { columns, rows }
    }

    /// Gets the names of the pass-through columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Gets the rows.
    pub fn rows(&self) -> &[HitRow] {
        &self.rows
    }

    /// Gets the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes self and returns the pass-through column names and the rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<HitRow>) {
        (self.columns, self.rows)
    }

    /// Gets the full list of output columns.
    pub fn output_columns(&self) -> Vec<&str> {
        CORE_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(String::as_str))
            .chain(DERIVED_COLUMNS.iter().copied())
            .collect()
    }
}

/// Normalizes a raw table into a [`Table`].
///
/// The column names are determined with [`schema::resolve()`]. Identity and
/// score statistics ([`schema::DROPPED`]) are dropped, and input columns
/// sharing a name with a derived column are reset. The remaining columns pass
/// through unchanged.
pub fn normalize(raw: RawTable, explicit: Option<&[String]>) -> Result<Table, Error> {
    if raw.width() == 0 {
        return Ok(Table::default());
    }

    let names = schema::resolve(&raw.kinds(), explicit).map_err(Error::Schema)?;
    let position = |name: &str| names.iter().position(|n| n == name);
    let required = |name: &'static str| position(name).ok_or(Error::MissingColumn(name));

    let qaccver = required(QACCVER)?;
    let saccver = required(SACCVER)?;
    let sstart = required(SSTART)?;
    let send = required(SEND)?;
    let qstart = position(QSTART);
    let qend = position(QEND);

    let passthrough = names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            !CORE_COLUMNS.contains(&name.as_str())
                && !DERIVED_COLUMNS.contains(&name.as_str())
                && !schema::DROPPED.contains(&name.as_str())
        })
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    let width = names.len();
    let rows = raw
        .records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            if record.len() != width {
                return Err(Error::RowLength {
                    row: i,
                    expected: width,
                    found: record.len(),
                });
            }

            let coordinate = |column: &'static str, index: usize| {
                record[index]
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidCoordinate {
                        column,
                        row: i,
                        value: record[index].clone(),
                    })
            };

            let row = HitRow::new(
                record[qaccver].clone(),
                record[saccver].clone(),
                coordinate(SSTART, sstart)?,
                coordinate(SEND, send)?,
            )
            .with_query_bounds(
                qstart.map(|index| coordinate(QSTART, index)).transpose()?,
                qend.map(|index| coordinate(QEND, index)).transpose()?,
            )
            .with_passthrough(passthrough.iter().map(|&index| record[index].clone()).collect());

            Ok(row)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let columns = passthrough.iter().map(|&index| names[index].clone()).collect();

    Ok(Table::new(columns, rows))
}
