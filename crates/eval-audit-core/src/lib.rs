//! Evaluation Audit Core
//!
//! Normalization and aggregation pipeline for tabular AI evaluation
//! reports: one row per system-under-test per test case goes in, a
//! structured case/result model with badges and per-system summary
//! statistics comes out.
//!
//! The pipeline is a pure, synchronous, single-pass transform:
//!
//! 1. [`loader`] reads the table (csv or xlsx) and fills absent fields
//!    with fixed defaults.
//! 2. [`aggregate`] groups rows into one [`EvaluationCase`] per case id
//!    with a uniform [`SystemResult`] slot per known system.
//! 3. [`badge`] classifies each (score, fatal) pair.
//! 4. [`summary`] reduces the case collection to per-system statistics.
//!
//! Loading is all-or-nothing: partially aggregated audit data would be
//! misleading, so any malformed score or id aborts the whole load.
//! [`cache::LoadCache`] memoizes complete transforms by content hash.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod aggregate;
pub mod badge;
pub mod cache;
pub mod discover;
pub mod error;
pub mod loader;
pub mod summary;

pub use aggregate::{EvaluationCase, LoadDiagnostics, LoadOutcome, SystemResult};
pub use badge::Badge;
pub use cache::LoadCache;
pub use discover::latest_report;
pub use error::{Error, Result};
pub use loader::{Row, TableFormat};
pub use summary::{SystemSummary, summarize};

/// Load a report file and aggregate it into the sorted case collection.
///
/// This is the single operation the core exposes to its caller; everything
/// else is a building block of it.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, `Error::Load` if the
/// container cannot be parsed, `Error::Schema` if a required column is
/// absent, and `Error::Value` if a score or case id fails to parse. No
/// partial data is ever returned.
pub fn load_and_aggregate(path: &std::path::Path) -> Result<LoadOutcome> {
    let bytes = std::fs::read(path)?;
    load_and_aggregate_bytes(&bytes, TableFormat::from_path(path))
}

/// Aggregate in-memory report content.
///
/// # Errors
///
/// Same as [`load_and_aggregate`], minus the IO.
pub fn load_and_aggregate_bytes(bytes: &[u8], format: TableFormat) -> Result<LoadOutcome> {
    let rows = loader::load_rows_from_bytes(bytes, format)?;
    aggregate::aggregate(&rows)
}
