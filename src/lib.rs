//! `annohit` is a crate for annotating alignment hit tables with the genomic
//! features of the sequences they hit.
//!
//! Given a BLAST-style tabular output, every hit's subject accession is
//! resolved to a GenBank record, the coding feature covering the hit is
//! located, and the feature's locus tag, strand, bounds, and sequence are
//! written back into the row. Hits covered by no feature are dropped.
//!
//! ## Resolving records
//!
//! Records are resolved through a [`resolve::Resolver`], which consults a
//! [`cache::Store`] first and falls back to a [`fetch::Fetch`]er on a miss.
//! The [`cache::Disk`] store keeps one GenBank file per accession, and the
//! [`fetch::Entrez`] fetcher downloads records from NCBI's E-utilities.
//!
//! ## Annotating tables
//!
//! A hit table is read with a [`table::Reader`], normalized against the known
//! [schemas](table::schema), and annotated by an [`engine::Engine`] that splits
//! the table into contiguous chunks and processes them in parallel. The
//! resulting [`engine::Report`] holds the annotated table along with any chunks
//! that failed.
//!
//! Below is a representative example of annotating a table entirely from the
//! local cache.
//!
//! ```no_run
//! use annohit::cache;
//! use annohit::engine;
//! use annohit::fetch;
//! use annohit::resolve;
//! use annohit::table;
//!
//! let resolver = resolve::Resolver::new(
//!     cache::Disk::default(),
//!     fetch::Entrez::try_new()?,
//!     resolve::Options {
//!         local_only: true,
//!         ..Default::default()
//!     },
//! );
//!
//! let engine = engine::Engine::new(resolver, engine::Options::default());
//!
//! let raw = table::Reader::from_path("hits.tsv", false)?.read()?;
//! let annotated = engine.annotate(raw)?.into_table()?;
//!
//! let mut writer = table::Writer::new(std::io::stdout());
//! writer.write_table(&annotated)?;
//! writer.flush()?;
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Smaller pieces
//!
//! The [`header`] module parses `accession:start-end` query headers, the
//! [`locate`] module finds the feature covering a hit, and the [`upstream`]
//! module computes the region upstream of a feature.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod core;
pub mod engine;
pub mod fetch;
pub mod header;
pub mod locate;
pub mod record;
pub mod resolve;
pub mod table;
pub mod upstream;

pub use header::Header;
pub use record::SequenceRecord;
