//! `nipa-pq` library crate.
//!
//! The binary (`nipa`) is a thin wrapper around this library so that:
//!
//! - fetch, pivot and chart building are testable without spawning processes
//! - the same chart model feeds the web page, the terminal UI and exports

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod render;
pub mod server;
pub mod tui;
pub mod ui;
