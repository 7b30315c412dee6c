//! A store of sequence records keyed by accession.
//!
//! The [`Disk`] store keeps one GenBank file per accession at
//! `<root>/<accession>.gbff`. An entry holds the GenBank text exactly as it
//! was received, and every read parses that text, so a record read from the
//! store is the same record that was parsed when the entry was put.
//!
//! Entries are written once and never updated, invalidated, or removed.
//! Writes go to a temporary file within the root that is then renamed into
//! place, so readers never observe a partially written entry and concurrent
//! writers of the same accession are harmless.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::record::genbank;
use crate::record::SequenceRecord;

/// The default root directory of the cache.
pub const DEFAULT_ROOT: &str = ".cache/entrez";

/// The extension of a cache entry.
pub const EXTENSION: &str = "gbff";

/// Accessions that cannot be used as a file name.
static UNSAFE_ACCESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^$|^\.{1,2}$|[/\\\x00]").unwrap());

/// An error related to a [`Store`].
#[derive(Debug)]
pub enum Error {
    /// The accession cannot be turned into a cache path.
    InvalidAccession(String),
    /// An I/O error.
    Io(PathBuf, io::Error),
    /// A cache entry could not be parsed.
    Parse(PathBuf, genbank::ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidAccession(accession) => {
                write!(f, "invalid accession: \"{}\"", accession)
            }
            Error::Io(path, err) => write!(f, "i/o error at {}: {}", path.display(), err),
            Error::Parse(path, err) => {
                write!(f, "corrupt cache entry {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A store of sequence records.
///
/// Stores are shared by reference between workers, so implementations must
/// be safe to use from several threads at once.
pub trait Store: Send + Sync {
    /// Gets the record for an accession, if the store has it.
    fn get(&self, accession: &str) -> Result<Option<SequenceRecord>>;

    /// Puts the GenBank text of an accession into the store.
    ///
    /// The text is stored as given. A later [`Store::get()`] parses it.
    fn put(&self, accession: &str, text: &str) -> Result<()>;
}

/// A store backed by a directory of GenBank files.
#[derive(Clone, Debug)]
pub struct Disk {
    /// The root directory.
    root: PathBuf,
}

impl Disk {
    /// Creates a new store rooted at `root`.
    ///
    /// The directory is created on the first [`Store::put()`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Gets the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Gets the path of the entry for an accession.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    ///
    /// use annohit::cache::Disk;
    ///
    /// let store = Disk::new(".cache/entrez");
    ///
    /// assert_eq!(
    ///     store.path("NC_000913.3")?,
    ///     PathBuf::from(".cache/entrez/NC_000913.3.gbff")
    /// );
    /// assert!(store.path("../etc/passwd").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn path(&self, accession: &str) -> Result<PathBuf> {
        if UNSAFE_ACCESSION.is_match(accession) {
            return Err(Error::InvalidAccession(accession.to_string()));
        }

        Ok(self.root.join(format!("{}.{}", accession, EXTENSION)))
    }
}

impl Default for Disk {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl Store for Disk {
    fn get(&self, accession: &str) -> Result<Option<SequenceRecord>> {
        let path = self.path(accession)?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::Io(path, err)),
        };

        debug!("loading {} from {}", accession, path.display());

        genbank::parse(accession, BufReader::new(file))
            .map(Some)
            .map_err(|err| Error::Parse(path, err))
    }

    fn put(&self, accession: &str, text: &str) -> Result<()> {
        let path = self.path(accession)?;

        std::fs::create_dir_all(&self.root).map_err(|err| Error::Io(self.root.clone(), err))?;

        let mut temp =
            NamedTempFile::new_in(&self.root).map_err(|err| Error::Io(self.root.clone(), err))?;

        temp.write_all(text.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|err| Error::Io(path.clone(), err))?;

        temp.persist(&path)
            .map_err(|err| Error::Io(path.clone(), err.error))?;

        debug!("stored {} in {}", accession, path.display());

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::record::genbank::tests::NCBI_ACCESSION;
    use crate::record::genbank::tests::NCBI_RECORD;

    /// A store kept entirely in memory.
    ///
    /// Like [`Disk`], it keeps the text it was given and parses it on every
    /// read.
    #[derive(Debug, Default)]
    pub struct Memory(Mutex<HashMap<String, String>>);

    impl Store for Memory {
        fn get(&self, accession: &str) -> Result<Option<SequenceRecord>> {
            let text = self.0.lock().unwrap().get(accession).cloned();

            text.map(|text| {
                genbank::parse(accession, text.as_bytes())
                    .map_err(|err| Error::Parse(PathBuf::from(accession), err))
            })
            .transpose()
        }

        fn put(&self, accession: &str, text: &str) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .insert(accession.to_string(), text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_path_is_a_function_of_the_accession(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = Disk::new("/tmp/cache");

        assert_eq!(store.path("A1.1")?, PathBuf::from("/tmp/cache/A1.1.gbff"));
        assert_eq!(store.path("A1.1")?, store.path("A1.1")?);
        assert_ne!(store.path("A1.1")?, store.path("A1.2")?);

        Ok(())
    }

    #[test]
    fn test_unsafe_accessions() {
        let store = Disk::default();

        for accession in ["", ".", "..", "a/b", "a\\b"] {
            let err = store.path(accession).unwrap_err();
            assert!(matches!(err, Error::InvalidAccession(_)));
        }
    }

    #[test]
    fn test_missing_entry() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = Disk::new(dir.path());

        assert_eq!(store.get(NCBI_ACCESSION)?, None);

        Ok(())
    }

    #[test]
    fn test_put_then_get() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = Disk::new(dir.path().join("nested").join("cache"));

        store.put(NCBI_ACCESSION, NCBI_RECORD)?;
        let path = store.path(NCBI_ACCESSION)?;
        assert_eq!(std::fs::read_to_string(&path)?, NCBI_RECORD);

        let expected = genbank::parse(NCBI_ACCESSION, NCBI_RECORD.as_bytes())?;
        assert_eq!(store.get(NCBI_ACCESSION)?, Some(expected.clone()));
        assert_eq!(store.get(NCBI_ACCESSION)?, Some(expected));

        // Only the entry itself remains in the root.
        let entries = std::fs::read_dir(store.root())?.count();
        assert_eq!(entries, 1);

        Ok(())
    }

    #[test]
    fn test_concurrent_writers() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = Disk::new(dir.path());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| store.put(NCBI_ACCESSION, NCBI_RECORD).unwrap());
            }
        });

        let expected = genbank::parse(NCBI_ACCESSION, NCBI_RECORD.as_bytes())?;
        assert_eq!(store.get(NCBI_ACCESSION)?, Some(expected));

        Ok(())
    }

    #[test]
    fn test_reads_during_writes() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = Disk::new(dir.path());
        let expected = genbank::parse(NCBI_ACCESSION, NCBI_RECORD.as_bytes())?;

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..50 {
                    store.put(NCBI_ACCESSION, NCBI_RECORD).unwrap();
                }
            });

            scope.spawn(|| {
                for _ in 0..200 {
                    match store.get(NCBI_ACCESSION) {
                        Ok(None) => {}
                        Ok(Some(record)) => assert_eq!(record, expected),
                        Err(err) => panic!("read a partial entry: {err}"),
                    }
                }
            });
        });

        Ok(())
    }

    #[test]
    fn test_corrupt_entry() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = Disk::new(dir.path());
        std::fs::write(store.path(NCBI_ACCESSION)?, "not a genbank file\n")?;

        let err = store.get(NCBI_ACCESSION).unwrap_err();
        assert!(matches!(err, Error::Parse(_, _)));

        Ok(())
    }
}
