//! Output helpers.
//!
//! - chart exports (JSON/SVG) (`export`)

pub mod export;

pub use export::*;
