//! Resolving accessions to sequence records.
//!
//! A [`Resolver`] consults its [`Store`] first and falls back to its
//! [`Fetch`]er on a miss. Fetched text is parsed and, when caching is
//! enabled, written back to the store exactly as received. The record
//! returned on a miss is the parse of that same text, so it is identical to
//! the record later read from the store. With `local_only`, a miss is an
//! error and the network is never touched.

use tracing::debug;
use tracing::info;

use crate::cache;
use crate::cache::Store;
use crate::fetch;
use crate::fetch::Fetch;
use crate::record::genbank;
use crate::record::SequenceRecord;

/// An error related to resolving an accession.
#[derive(Debug)]
pub enum Error {
    /// The accession is not cached and remote fetching is disabled.
    NotFound(String),
    /// The accession could not be fetched.
    Fetch(String, fetch::Error),
    /// The cache could not be read or written.
    Cache(cache::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(accession) => {
                write!(f, "{} not found in the local cache", accession)
            }
            Error::Fetch(accession, err) => write!(f, "fetching {}: {}", accession, err),
            Error::Cache(err) => write!(f, "cache error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// Options for resolving accessions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    /// Whether fetched records are written to the store.
    pub cache: bool,

    /// Whether resolution is restricted to the store.
    pub local_only: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache: true,
            local_only: false,
        }
    }
}

/// Resolves accessions to sequence records.
#[allow(missing_debug_implementations)]
pub struct Resolver {
    /// The store consulted first.
    store: Box<dyn Store>,

    /// The fetcher consulted on a miss.
    fetcher: Box<dyn Fetch>,

    /// The options.
    options: Options,
}

impl Resolver {
    /// Creates a new resolver.
    pub fn new(
        store: impl Store + 'static,
        fetcher: impl Fetch + 'static,
        options: Options,
    ) -> Self {
        Self {
            store: Box::new(store),
            fetcher: Box::new(fetcher),
            options,
        }
    }

    /// Gets the options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolves an accession.
    pub fn resolve(&self, accession: &str) -> Result<SequenceRecord, Error> {
        if let Some(record) = self.store.get(accession).map_err(Error::Cache)? {
            debug!("resolved {} from the cache", accession);
            return Ok(record);
        }

        if self.options.local_only {
            return Err(Error::NotFound(accession.to_string()));
        }

        let text = self
            .fetcher
            .fetch(accession)
            .map_err(|err| Error::Fetch(accession.to_string(), err))?;
        let record = genbank::parse(accession, text.as_bytes())
            .map_err(|err| Error::Fetch(accession.to_string(), fetch::Error::Unparsable(err)))?;

        if self.options.cache {
            self.store.put(accession, &text).map_err(Error::Cache)?;
            info!("cached {}", accession);
        }

        Ok(record)
    }

    /// Resolves every accession once, returning how many were resolved.
    ///
    /// This is used to warm the cache ahead of an annotation run.
    pub fn prefetch<'a>(
        &self,
        accessions: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize, Error> {
        let mut seen = std::collections::HashSet::new();

        for accession in accessions {
            if seen.insert(accession) {
                self.resolve(accession)?;
            }
        }

        Ok(seen.len())
    }
}

#[cfg(test)]
pub mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;
    use crate::cache::tests::Memory;
    use crate::record::genbank::tests::record;
    use crate::record::genbank::tests::NCBI_ACCESSION;
    use crate::record::genbank::tests::NCBI_RECORD;

    /// A fetcher serving GenBank text from memory and counting requests.
    #[derive(Clone, Debug, Default)]
    pub struct Fake {
        /// The GenBank text by accession.
        pub texts: Arc<HashMap<String, String>>,
        /// The number of requests made.
        pub requests: Arc<AtomicUsize>,
    }

    impl Fake {
        /// Creates a fetcher serving GenBank text by accession.
        pub fn new<'a>(texts: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
            let texts = texts
                .into_iter()
                .map(|(accession, text)| (accession.to_string(), text.to_string()))
                .collect();

            Self {
                texts: Arc::new(texts),
                requests: Default::default(),
            }
        }

        /// Creates a fetcher serving the given records as written by
        /// [`genbank::write()`].
        pub fn serving(records: &[SequenceRecord]) -> Self {
            let texts = records
                .iter()
                .map(|record| {
                    let mut buffer = Vec::new();
                    genbank::write(record, &mut buffer).unwrap();
                    (
                        record.accession().to_string(),
                        String::from_utf8(buffer).unwrap(),
                    )
                })
                .collect::<Vec<_>>();

            Self::new(
                texts
                    .iter()
                    .map(|(accession, text)| (accession.as_str(), text.as_str())),
            )
        }

        /// Gets the number of requests made so far.
        pub fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl Fetch for Fake {
        fn fetch(&self, accession: &str) -> Result<String, fetch::Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.texts
                .get(accession)
                .cloned()
                .ok_or(fetch::Error::Status(reqwest::StatusCode::BAD_REQUEST))
        }
    }

    #[test]
    fn test_cache_idempotence() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let fetcher = Fake::serving(&[record()?]);
        let resolver = Resolver::new(
            cache::Disk::new(dir.path()),
            fetcher.clone(),
            Options::default(),
        );

        let first = resolver.resolve("NC_999999.1")?;
        let second = resolver.resolve("NC_999999.1")?;

        assert_eq!(fetcher.requests(), 1);
        assert_eq!(first, second);
        assert_eq!(first, record()?);

        Ok(())
    }

    #[test]
    fn test_cached_record_matches_fetched_record() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = cache::Disk::new(dir.path());
        let fetcher = Fake::new([(NCBI_ACCESSION, NCBI_RECORD)]);
        let resolver = Resolver::new(store.clone(), fetcher.clone(), Options::default());

        let fetched = resolver.resolve(NCBI_ACCESSION)?;
        let cached = resolver.resolve(NCBI_ACCESSION)?;

        assert_eq!(fetcher.requests(), 1);
        assert_eq!(fetched, cached);
        assert_eq!(std::fs::read_to_string(store.path(NCBI_ACCESSION)?)?, NCBI_RECORD);

        // A wrapped qualifier and a join spanning both strands survive the
        // round trip through the store.
        assert_eq!(cached.features()[2].strand(), None);
        assert!(cached.features()[1]
            .qualifier_values("note")
            .all(|note| !note.contains('\n')));

        // A fresh resolver over the same directory reads the same record.
        let offline = Resolver::new(
            store,
            Fake::default(),
            Options {
                cache: true,
                local_only: true,
            },
        );
        assert_eq!(offline.resolve(NCBI_ACCESSION)?, fetched);

        Ok(())
    }

    #[test]
    fn test_without_caching() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = Fake::serving(&[record()?]);
        let resolver = Resolver::new(
            Memory::default(),
            fetcher.clone(),
            Options {
                cache: false,
                local_only: false,
            },
        );

        resolver.resolve("NC_999999.1")?;
        resolver.resolve("NC_999999.1")?;

        assert_eq!(fetcher.requests(), 2);

        Ok(())
    }

    #[test]
    fn test_local_only() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = Fake::serving(&[record()?]);
        let store = Memory::default();
        store.put(NCBI_ACCESSION, NCBI_RECORD)?;

        let resolver = Resolver::new(
            store,
            fetcher.clone(),
            Options {
                cache: true,
                local_only: true,
            },
        );

        assert_eq!(
            resolver.resolve(NCBI_ACCESSION)?,
            genbank::parse(NCBI_ACCESSION, NCBI_RECORD.as_bytes())?
        );

        let err = resolver.resolve("NC_000000.1").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "NC_000000.1 not found in the local cache");
        assert_eq!(fetcher.requests(), 0);

        Ok(())
    }

    #[test]
    fn test_fetch_failure() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = Resolver::new(Memory::default(), Fake::default(), Options::default());

        let err = resolver.resolve("NC_999999.1").unwrap_err();
        assert!(matches!(err, Error::Fetch(_, fetch::Error::Status(_))));

        Ok(())
    }

    #[test]
    fn test_unparsable_response() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = Fake::new([("NC_999999.1", "")]);
        let store = Memory::default();
        let resolver = Resolver::new(store, fetcher, Options::default());

        let err = resolver.resolve("NC_999999.1").unwrap_err();
        assert!(matches!(err, Error::Fetch(_, fetch::Error::Unparsable(_))));

        Ok(())
    }

    #[test]
    fn test_prefetch_deduplicates() -> Result<(), Box<dyn std::error::Error>> {
        let fetcher = Fake::serving(&[record()?]);
        let resolver = Resolver::new(Memory::default(), fetcher.clone(), Options::default());

        let resolved = resolver.prefetch(["NC_999999.1", "NC_999999.1"])?;

        assert_eq!(resolved, 1);
        assert_eq!(fetcher.requests(), 1);

        Ok(())
    }
}
