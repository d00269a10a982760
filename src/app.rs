//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - bootstraps the date bounds with one fetch of both tables
//! - hands off to the chosen front end (server, TUI or one-shot export)

use clap::Parser;

use crate::chart::ChartBuilder;
use crate::cli::{Command, ExportArgs, ServeArgs, TableArgs};
use crate::config::{Config, parse_listen_addr};
use crate::data::BeaClient;
use crate::domain::DateRange;
use crate::error::AppError;
use crate::server::ServerState;

pub mod pipeline;

/// Entry point for the `nipa` binary.
pub fn run() -> Result<(), AppError> {
    // `nipa` and `nipa --listen ...` behave like `nipa serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Tui(args) => handle_tui(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let mut config = config_from_args(&args.tables)?;
    if let Some(listen) = &args.listen {
        config.listen_addr = parse_listen_addr(listen)?;
    }
    crate::logging::init_tracing(config.log_format);

    // The blocking client must not be dropped inside the async runtime, so the
    // bootstrap fetch finishes before the server starts.
    let bounds = {
        let client = BeaClient::new(&config.bea);
        let (_, bounds) = pipeline::bootstrap(&client, &config.tables)?;
        bounds
    };

    let state = ServerState {
        title: ChartBuilder::new(&config.tables).title().to_string(),
        bounds,
        handlers: crate::ui::date_range_handlers(&config),
    };
    crate::server::serve(&config, state)
}

fn handle_tui(args: TableArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    crate::tui::run(config)
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.tables)?;
    crate::logging::init_tracing(config.log_format);

    let handlers = crate::ui::date_range_handlers(&config);
    let spec = handlers.dispatch(
        crate::ui::DATE_RANGE_CHANGED,
        DateRange::new(args.start, args.end),
    )?;
    crate::io::write_chart(&spec, args.format, args.output.as_deref())
}

/// Environment config with CLI table overrides applied.
pub fn config_from_args(args: &TableArgs) -> Result<Config, AppError> {
    let mut config = Config::from_env()?;
    apply_table_args(&mut config, args);
    Ok(config)
}

fn apply_table_args(config: &mut Config, args: &TableArgs) {
    if let Some(q) = &args.quantity_table {
        config.tables.quantity = q.clone();
    }
    if let Some(p) = &args.price_table {
        config.tables.price = p.clone();
    }
}

/// Rewrite argv so `nipa` defaults to `nipa serve`.
///
/// Rules:
/// - `nipa`                       -> `nipa serve`
/// - `nipa --listen ADDR ...`     -> `nipa serve --listen ADDR ...`
/// - `nipa --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "serve" | "tui" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "serve flags".
    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_serves() {
        assert_eq!(rewrite_args(args(&["nipa"])), args(&["nipa", "serve"]));
        assert_eq!(
            rewrite_args(args(&["nipa", "--listen", "0.0.0.0:80"])),
            args(&["nipa", "serve", "--listen", "0.0.0.0:80"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["nipa", "tui"])), args(&["nipa", "tui"]));
        assert_eq!(rewrite_args(args(&["nipa", "--help"])), args(&["nipa", "--help"]));
    }

    #[test]
    fn table_flags_override_config() {
        let mut config = Config::from_lookup(|key| (key == "BEA_USER_ID").then(|| "x".to_string())).unwrap();
        apply_table_args(
            &mut config,
            &TableArgs {
                quantity_table: Some("T10103".to_string()),
                price_table: None,
            },
        );
        assert_eq!(config.tables.quantity, "T10103");
        assert_eq!(config.tables.price, "T20304");
    }
}
