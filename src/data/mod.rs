//! Remote data sources.

pub mod bea;

pub use bea::BeaClient;

use crate::domain::SeriesTable;
use crate::error::DataError;

/// Anything that can produce a pivoted table for a table name.
///
/// [`BeaClient`] is the production implementation; tests substitute an
/// in-memory source.
pub trait SeriesSource {
    fn fetch(&self, table_name: &str) -> Result<SeriesTable, DataError>;
}
