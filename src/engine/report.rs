//! The outcome of an annotation run.

use std::ops::Range;

use crate::engine::ChunkError;
use crate::engine::Error;
use crate::table::Table;

/// A chunk that failed to annotate.
#[derive(Debug)]
pub struct Failure {
    /// The position of the chunk in the partition.
    pub chunk: usize,

    /// The 0-based rows of the input table held by the chunk.
    pub rows: Range<usize>,

    /// The error.
    pub error: ChunkError,
}

/// The outcome of an annotation run.
///
/// The table holds the rows of every chunk that succeeded, in chunk order.
/// Rows of failed chunks are absent and accounted for in the failures.
#[derive(Debug)]
pub struct Report {
    /// The annotated table.
    table: Table,

    /// The failed chunks, in chunk order.
    failures: Vec<Failure>,
}

impl Report {
    /// Creates a new report.
    pub fn new(table: Table, failures: Vec<Failure>) -> Self {
        Self { table, failures }
    }

    /// Gets the annotated table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Gets the failed chunks.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Returns whether every chunk succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consumes self and returns the table and the failures.
    pub fn into_parts(self) -> (Table, Vec<Failure>) {
        (self.table, self.failures)
    }

    /// Consumes self and returns the table if every chunk succeeded.
    ///
    /// Otherwise, the first failure that is not a cancellation is returned.
    /// A run with cancellations only returns the first of those.
    pub fn into_table(self) -> Result<Table, Error> {
        if self.failures.is_empty() {
            return Ok(self.table);
        }

        let index = self
            .failures
            .iter()
            .position(|failure| !matches!(failure.error, ChunkError::Cancelled))
            .unwrap_or_default();

        let failure = self.failures.into_iter().nth(index);

        match failure {
            Some(failure) => Err(Error::Chunk(failure.chunk, failure.error)),
            None => Ok(self.table),
        }
    }
}
