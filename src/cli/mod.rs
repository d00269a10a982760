//! Command-line parsing for the NIPA price/quantity explorer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/chart code. Flags only override what `Config::from_env` loaded.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "nipa",
    version,
    about = "Price vs. quantity of goods and services from BEA NIPA tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the interactive chart page on a local address (default).
    Serve(ServeArgs),
    /// Launch the interactive terminal UI.
    Tui(TableArgs),
    /// Fetch once and write the chart as JSON or SVG.
    Export(ExportArgs),
}

/// Which NIPA tables to plot.
#[derive(Debug, Args, Clone, Default)]
pub struct TableArgs {
    /// Quantity table (default: $NIPA_QUANTITY_TABLE or T20303).
    #[arg(long)]
    pub quantity_table: Option<String>,

    /// Price table (default: $NIPA_PRICE_TABLE or T20304).
    #[arg(long)]
    pub price_table: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub tables: TableArgs,

    /// Listen address (default: $NIPA_LISTEN_ADDR or 127.0.0.1:8050).
    #[arg(long)]
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Svg,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub tables: TableArgs,

    /// First date to include (YYYY-MM-DD). Filtering needs both bounds.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_arguments() {
        let cli = Cli::parse_from([
            "nipa",
            "export",
            "--start",
            "2010-01-01",
            "--end",
            "2012-12-31",
            "--format",
            "svg",
            "-o",
            "chart.svg",
            "--price-table",
            "T10104",
        ]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2010, 1, 1));
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2012, 12, 31));
        assert_eq!(args.format, ExportFormat::Svg);
        assert_eq!(args.output, Some(PathBuf::from("chart.svg")));
        assert_eq!(args.tables.price_table.as_deref(), Some("T10104"));
        assert_eq!(args.tables.quantity_table, None);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Cli::try_parse_from(["nipa", "export", "--start", "2010/01/01"]).is_err());
    }
}
