//! A hit table writer.

use std::io::Write;
use std::io::{self};

use crate::table::HitRow;
use crate::table::Table;

/// The column delimiter.
const DELIMITER: u8 = b'\t';

/// An error related to a [`Writer`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A row could not be written.
    Csv(csv::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Csv(err) => write!(f, "table error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A tab-separated hit table writer.
///
/// Unset cells are written empty, `psudo` is written as `true` when set, and
/// `sframe` is written as the strand number (`1` or `-1`).
#[derive(Debug)]
pub struct Writer<T>(csv::Writer<T>)
where
    T: Write;

impl<T> Writer<T>
where
    T: Write,
{
    /// Creates a hit table writer.
    pub fn new(inner: T) -> Self {
        Self(
            csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .quote_style(csv::QuoteStyle::Never)
                .from_writer(inner),
        )
    }

    /// Gets a reference to the inner writer.
    pub fn inner(&self) -> &T {
        self.0.get_ref()
    }

    /// Writes a table, header row first.
    ///
    /// # Examples
    ///
    /// ```
    /// use annohit::table::HitRow;
    /// use annohit::table::Table;
    /// use annohit::table::Writer;
    ///
    /// let table = Table::new(Vec::new(), vec![HitRow::new("q1", "NC_1.1", 10, 20)]);
    ///
    /// let mut buffer = Vec::new();
    /// let mut writer = Writer::new(&mut buffer);
    /// writer.write_table(&table)?;
    /// writer.flush()?;
    /// drop(writer);
    ///
    /// assert_eq!(
    ///     String::from_utf8(buffer)?,
    ///     "qaccver\tsaccver\tqstart\tqend\tsstart\tsend\tstag\tqtag\tpsudo\tsframe\tsseq\n\
    ///      q1\tNC_1.1\t\t\t10\t20\t\t\t\t\t\n"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_table(&mut self, table: &Table) -> Result<(), Error> {
        self.0
            .write_record(table.output_columns())
            .map_err(Error::Csv)?;

        for row in table.rows() {
            self.write_row(row)?;
        }

        Ok(())
    }

    /// Writes a single row.
    pub fn write_row(&mut self, row: &HitRow) -> Result<(), Error> {
        self.0.write_record(cells(row)).map_err(Error::Csv)
    }

    /// Flushes the inner writer.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.0.flush().map_err(Error::Io)
    }
}

/// Renders the cells of a row in output order.
fn cells(row: &HitRow) -> Vec<String> {
    let optional = |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_default();

    let mut cells = vec![
        row.qaccver().to_string(),
        row.saccver().to_string(),
        optional(row.qstart()),
        optional(row.qend()),
        row.sstart().to_string(),
        row.send().to_string(),
    ];

    cells.extend(row.passthrough().iter().cloned());

    cells.push(row.stag().unwrap_or_default().to_string());
    cells.push(row.qtag().unwrap_or_default().to_string());
    cells.push(
        row.psudo()
            .map(|psudo| psudo.to_string())
            .unwrap_or_default(),
    );
    cells.push(optional(row.sframe().map(|strand| strand.as_number())));
    cells.push(row.sseq().unwrap_or_default().to_string());

    cells
}
