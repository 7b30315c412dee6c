//! Core functionality used across the crate.

pub mod interval;
pub mod strand;

pub use interval::Interval;
pub use strand::Strand;
