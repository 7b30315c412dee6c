//! Annotating hit tables in parallel.
//!
//! An [`Engine`] normalizes a raw hit table, splits it into contiguous
//! [chunks](partition), and annotates every chunk on a dedicated worker pool.
//! For each row, the subject accession is resolved and the feature covering
//! the hit is located. Rows whose subject hit is covered by no feature are
//! dropped. Optionally, the query is annotated the same way from the
//! `accession:start-end` header in its `qaccver` column.
//!
//! Chunks are reassembled in partition order, so the output does not depend
//! on the number of workers.

pub mod partition;
pub mod report;

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;
use tracing::warn;

pub use report::Failure;
pub use report::Report;

use crate::header;
use crate::header::Header;
use crate::locate;
use crate::record::SequenceRecord;
use crate::resolve;
use crate::resolve::Resolver;
use crate::table;
use crate::table::HitRow;
use crate::table::RawTable;
use crate::table::Table;

/// An error related to annotating a single chunk.
#[derive(Debug)]
pub enum ChunkError {
    /// A query header could not be parsed.
    Header(header::ParseError),
    /// An accession could not be resolved.
    Resolve(resolve::Error),
    /// The run was cancelled before the chunk finished.
    Cancelled,
}

impl std::fmt::Display for ChunkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkError::Header(err) => write!(f, "query header error: {err}"),
            ChunkError::Resolve(err) => write!(f, "resolve error: {err}"),
            ChunkError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for ChunkError {}

/// An error related to an annotation run.
#[derive(Debug)]
pub enum Error {
    /// The table could not be normalized.
    Table(table::Error),
    /// The worker pool could not be built.
    ThreadPool(rayon::ThreadPoolBuildError),
    /// A chunk failed.
    Chunk(usize, ChunkError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Table(err) => write!(f, "table error: {err}"),
            Error::ThreadPool(err) => write!(f, "worker pool error: {err}"),
            Error::Chunk(chunk, err) => write!(f, "chunk {chunk} failed: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// What happens to the remaining chunks once a chunk fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Cancel the remaining chunks.
    #[default]
    Abort,

    /// Let the remaining chunks finish.
    Continue,
}

/// A token for stopping an annotation run.
///
/// Workers check the token before every row. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Cancels the run.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for an annotation run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Options {
    /// The requested number of workers.
    ///
    /// The number used is capped by the available cores. [`None`] uses every
    /// core.
    pub workers: Option<usize>,

    /// Whether the query columns are annotated from the query header.
    pub update_query: bool,

    /// The options for locating features.
    pub locate: locate::Options,

    /// Column names used when the table matches no known schema.
    pub columns: Option<Vec<String>>,

    /// What happens once a chunk fails.
    pub failure_policy: FailurePolicy,
}

/// Annotates hit tables.
#[allow(missing_debug_implementations)]
pub struct Engine {
    /// The resolver shared by every worker.
    resolver: Resolver,

    /// The options.
    options: Options,
}

impl Engine {
    /// Creates a new engine.
    pub fn new(resolver: Resolver, options: Options) -> Self {
        Self { resolver, options }
    }

    /// Gets the resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Gets the options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Gets the number of workers used for a run.
    pub fn workers(&self) -> usize {
        let cores = num_cpus::get();

        self.options
            .workers
            .map(|requested| requested.min(cores))
            .unwrap_or(cores)
            .max(1)
    }

    /// Annotates a raw table.
    pub fn annotate(&self, raw: RawTable) -> Result<Report, Error> {
        self.annotate_with(raw, &Cancellation::default())
    }

    /// Annotates a raw table under a caller-held cancellation token.
    ///
    /// With [`FailurePolicy::Abort`], the token is tripped by the first
    /// failing chunk.
    pub fn annotate_with(
        &self,
        raw: RawTable,
        cancellation: &Cancellation,
    ) -> Result<Report, Error> {
        let table = table::normalize(raw, self.options.columns.as_deref()).map_err(Error::Table)?;
        self.annotate_table(table, cancellation)
    }

    /// Annotates a normalized table.
    pub fn annotate_table(
        &self,
        table: Table,
        cancellation: &Cancellation,
    ) -> Result<Report, Error> {
        let workers = self.workers();
        let (columns, rows) = table.into_parts();
        let total = rows.len();
        let chunks = partition::split(rows, workers);

        debug!("annotating {} rows in {} chunks", total, chunks.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(Error::ThreadPool)?;

        let results = pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| {
                    let result = self.annotate_chunk(chunk.items, cancellation);

                    match &result {
                        Ok(rows) => debug!(
                            "chunk {} (rows {}..{}) kept {} rows",
                            chunk.index,
                            chunk.rows.start,
                            chunk.rows.end,
                            rows.len()
                        ),
                        Err(ChunkError::Cancelled) => {
                            debug!("chunk {} was cancelled", chunk.index)
                        }
                        Err(err) => {
                            warn!("chunk {} failed: {}", chunk.index, err);

                            if self.options.failure_policy == FailurePolicy::Abort {
                                cancellation.cancel();
                            }
                        }
                    }

                    (chunk.index, chunk.rows, result)
                })
                .collect::<Vec<_>>()
        });

        let mut annotated = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (chunk, range, result) in results {
            match result {
                Ok(rows) => annotated.extend(rows),
                Err(error) => failures.push(Failure {
                    chunk,
                    rows: range,
                    error,
                }),
            }
        }

        Ok(Report::new(Table::new(columns, annotated), failures))
    }

    /// Annotates the rows of a single chunk, in order.
    fn annotate_chunk(
        &self,
        rows: Vec<HitRow>,
        cancellation: &Cancellation,
    ) -> Result<Vec<HitRow>, ChunkError> {
        let mut records = HashMap::new();
        let mut annotated = Vec::with_capacity(rows.len());

        for row in rows {
            if cancellation.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }

            if let Some(row) = self.annotate_row(row, &mut records)? {
                annotated.push(row);
            }
        }

        Ok(annotated)
    }

    /// Annotates a single row.
    ///
    /// Returns [`None`] when the row is dropped.
    fn annotate_row(
        &self,
        row: HitRow,
        records: &mut HashMap<String, SequenceRecord>,
    ) -> Result<Option<HitRow>, ChunkError> {
        let row = if self.options.update_query {
            let header = row.qaccver().parse::<Header>().map_err(ChunkError::Header)?;
            let record = self.record(records, header.accession())?;
            let feature =
                locate::locate(record, header.start(), header.end(), &self.options.locate);
            row.annotate_query(feature)
        } else {
            row
        };

        let record = self.record(records, row.saccver())?;
        let feature = locate::locate(record, row.sstart(), row.send(), &self.options.locate);

        Ok(row.annotate_subject(feature, record))
    }

    /// Gets a record, resolving it on first use within a chunk.
    fn record<'a>(
        &self,
        records: &'a mut HashMap<String, SequenceRecord>,
        accession: &str,
    ) -> Result<&'a SequenceRecord, ChunkError> {
        if !records.contains_key(accession) {
            let record = self.resolver.resolve(accession).map_err(ChunkError::Resolve)?;
            records.insert(accession.to_string(), record);
        }

        Ok(&records[accession])
    }
}
