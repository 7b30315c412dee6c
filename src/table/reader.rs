//! A hit table reader.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::{self};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::table::RawTable;

/// The extension marking gzip compressed tables.
const GZIP_EXTENSION: &str = "gz";

/// The character introducing a comment line.
const COMMENT: u8 = b'#';

/// The column delimiter.
const DELIMITER: u8 = b'\t';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A malformed table.
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

/// A tab-separated hit table reader.
///
/// Lines starting with `#` are skipped, as are blank lines. Cells are never
/// quoted.
#[derive(Clone, Debug)]
pub struct Reader<T>
where
    T: Read,
{
    /// The inner reader.
    inner: T,

    /// Whether the first row holds column names.
    has_header: bool,
}

impl<T> Reader<T>
where
    T: Read,
{
    /// Creates a hit table reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"qaccver\tsaccver\nq1\tNC_000913.3\n";
    /// let reader = annohit::table::Reader::new(&data[..], true);
    /// ```
    pub fn new(inner: T, has_header: bool) -> Self {
        Self { inner, has_header }
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Reads the whole table.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"# BLASTN 2.15.0+\nqaccver\tsaccver\nq1\tNC_000913.3\n\nq2\tNC_000964.3\n";
    /// let raw = annohit::table::Reader::new(&data[..], true).read()?;
    ///
    /// assert_eq!(raw.header(), Some(&[String::from("qaccver"), String::from("saccver")][..]));
    /// assert_eq!(raw.records().len(), 2);
    /// assert_eq!(raw.records()[1], vec![String::from("q2"), String::from("NC_000964.3")]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read(self) -> Result<RawTable, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .comment(Some(COMMENT))
            .quoting(false)
            .has_headers(self.has_header)
            .from_reader(self.inner);

        let header = if self.has_header {
            let header = reader.headers().map_err(Error::Csv)?;
            Some(header.iter().map(String::from).collect())
        } else {
            None
        };

        let records = reader
            .records()
            .map(|result| {
                result
                    .map(|record| record.iter().map(String::from).collect())
                    .map_err(Error::Csv)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawTable::new(header, records))
    }
}

impl<T> From<T> for Reader<T>
where
    T: Read,
{
    fn from(inner: T) -> Self {
        Self::new(inner, false)
    }
}

impl Reader<Box<dyn Read>> {
    /// Opens a hit table from a path, decompressing it when the path ends in
    /// `.gz`.
    pub fn from_path(path: impl AsRef<Path>, has_header: bool) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(Error::Io)?;

        let inner: Box<dyn Read> = match path.extension().and_then(|ext| ext.to_str()) {
            Some(GZIP_EXTENSION) => Box::new(MultiGzDecoder::new(BufReader::new(file))),
            _ => Box::new(BufReader::new(file)),
        };

        Ok(Self::new(inner, has_header))
    }
}
