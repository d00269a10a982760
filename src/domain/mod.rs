//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - fetched and derived tables (`SeriesTable`, `CombinedTable`)
//! - the user's filter (`DateRange`) and picker limits (`DateBounds`)
//! - the renderer-agnostic chart description (`ChartSpec`)

pub mod chart;
pub mod types;

pub use chart::*;
pub use types::*;
