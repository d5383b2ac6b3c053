//! Analysis modules.
//!
//! Grouping and summary statistics over loaded time entries.

pub mod aggregator;

pub use aggregator::*;
