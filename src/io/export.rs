//! Write a built chart to a file or stdout.
//!
//! JSON is the `ChartSpec` itself (same shape as `GET /api/chart`), so it can
//! be consumed by scripts or another plotting front end.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::cli::ExportFormat;
use crate::domain::ChartSpec;
use crate::error::AppError;
use crate::render::svg::render_svg;

/// Serialize `spec` in `format`.
pub fn render_export(spec: &ChartSpec, format: ExportFormat) -> Result<String, AppError> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(spec)
            .map_err(|e| AppError::data(format!("Failed to serialize chart JSON: {e}"))),
        ExportFormat::Svg => render_svg(spec),
    }
}

/// Write the rendered chart to `path`, or to stdout when `path` is `None`.
pub fn write_chart(spec: &ChartSpec, format: ExportFormat, path: Option<&Path>) -> Result<(), AppError> {
    let content = render_export(spec, format)?;

    match path {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| {
                AppError::usage(format!("Failed to create export file '{}': {e}", path.display()))
            })?;
            file.write_all(content.as_bytes())
                .map_err(|e| AppError::data(format!("Failed to write export file: {e}")))?;
            tracing::info!(path = %path.display(), "wrote chart");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{content}")
                .map_err(|e| AppError::data(format!("Failed to write chart to stdout: {e}")))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::testing::sample_table;
    use crate::chart::ChartBuilder;
    use crate::config::TableNames;
    use crate::domain::DateRange;

    fn spec() -> ChartSpec {
        ChartBuilder::new(&TableNames::default())
            .build(&sample_table(5, 100.0), &sample_table(5, 80.0), &DateRange::unbounded())
            .unwrap()
    }

    #[test]
    fn json_export_reloads_as_same_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let original = spec();

        write_chart(&original, ExportFormat::Json, Some(&path)).unwrap();

        let reloaded: ChartSpec =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn svg_export_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        write_chart(&spec(), ExportFormat::Svg, Some(&path)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Goods"));
    }

    #[test]
    fn unwritable_path_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.json");
        let err = write_chart(&spec(), ExportFormat::Json, Some(&path)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }
}
