//! Shared fetch→build cycle used by every front end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch quantity table -> fetch price table -> combine -> filter -> chart
//!
//! The server, the TUI and `export` then only differ in presentation.

use crate::chart::{ChartBuilder, combine};
use crate::config::TableNames;
use crate::data::SeriesSource;
use crate::domain::{ChartSpec, CombinedTable, DateBounds, DateRange, SeriesTable};
use crate::error::DataError;

/// The two tables loaded by one cycle.
#[derive(Debug, Clone)]
pub struct LoadedTables {
    pub tables: TableNames,
    pub quantity: SeriesTable,
    pub price: SeriesTable,
}

impl LoadedTables {
    /// Fetch both tables; fails without partial results if either fetch fails.
    pub fn fetch(source: &dyn SeriesSource, tables: &TableNames) -> Result<Self, DataError> {
        let quantity = source.fetch(&tables.quantity)?;
        let price = source.fetch(&tables.price)?;
        Ok(Self {
            tables: tables.clone(),
            quantity,
            price,
        })
    }

    pub fn combined(&self) -> Result<CombinedTable, DataError> {
        combine(&self.quantity, &self.price)
    }

    pub fn chart(&self, range: &DateRange) -> Result<ChartSpec, DataError> {
        ChartBuilder::new(&self.tables).build(&self.quantity, &self.price, range)
    }

    /// Date-picker limits; `None` when the combined table has no rows.
    pub fn bounds(&self) -> Result<Option<DateBounds>, DataError> {
        Ok(self
            .combined()?
            .date_span()
            .map(|(min, max)| DateBounds::new(min, max)))
    }
}

/// Startup fetch used to bound the date pickers.
pub fn bootstrap(
    source: &dyn SeriesSource,
    tables: &TableNames,
) -> Result<(LoadedTables, DateBounds), DataError> {
    let loaded = LoadedTables::fetch(source, tables)?;
    for (table, name) in [(&loaded.quantity, &tables.quantity), (&loaded.price, &tables.price)] {
        if table.is_empty() {
            return Err(DataError::Schema {
                table: name.clone(),
                message: "no observations returned".to_string(),
            });
        }
    }
    let bounds = loaded.bounds()?.ok_or_else(|| DataError::Schema {
        table: tables.quantity.clone(),
        message: "no observations returned".to_string(),
    })?;
    tracing::info!(
        min = %bounds.min,
        max = %bounds.max,
        "bootstrapped date bounds"
    );
    Ok((loaded, bounds))
}

/// One full render cycle: fresh fetch of both tables, then a rebuild.
pub fn run_cycle(
    source: &dyn SeriesSource,
    tables: &TableNames,
    range: &DateRange,
) -> Result<ChartSpec, DataError> {
    tracing::info!(range = %range, "rebuilding chart");
    let loaded = LoadedTables::fetch(source, tables)?;
    loaded.chart(range)
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::testing::StubSource;
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bootstrap_derives_picker_bounds() {
        let source = StubSource::with_defaults(12);
        let (loaded, bounds) = bootstrap(&source, &TableNames::default()).unwrap();

        assert_eq!(loaded.quantity.len(), 12);
        assert_eq!(bounds.min, d(2008, 1, 1));
        assert_eq!(bounds.max, d(2010, 10, 1));
        assert_eq!(bounds.default_start, d(2010, 1, 1));
        assert_eq!(bounds.default_end, d(2010, 10, 1));
    }

    #[test]
    fn bootstrap_rejects_empty_tables() {
        let source = StubSource::with_defaults(0);
        let err = bootstrap(&source, &TableNames::default()).unwrap_err();
        assert_eq!(
            err,
            DataError::Schema {
                table: "T20303".to_string(),
                message: "no observations returned".to_string(),
            }
        );
    }

    #[test]
    fn bootstrap_rejects_empty_price_response() {
        let mut source = StubSource::with_defaults(8);
        let empty = crate::data::bea::parse_response("T20304", r#"{"BEAAPI":{"Results":{"Data":[]}}}"#)
            .unwrap();
        source.tables.insert("T20304".to_string(), empty);

        let err = bootstrap(&source, &TableNames::default()).unwrap_err();
        assert!(
            matches!(err, DataError::Schema { ref table, .. } if table == "T20304"),
            "{err:?}"
        );
    }

    #[test]
    fn each_cycle_refetches_both_tables() {
        let source = StubSource::with_defaults(8);
        let tables = TableNames::default();

        run_cycle(&source, &tables, &DateRange::unbounded()).unwrap();
        run_cycle(&source, &tables, &DateRange::unbounded()).unwrap();
        assert_eq!(source.fetches.get(), 4);
    }

    #[test]
    fn cycle_applies_range() {
        let source = StubSource::with_defaults(8);
        let spec = run_cycle(
            &source,
            &TableNames::default(),
            &DateRange::between(d(2008, 4, 1), d(2008, 12, 31)),
        )
        .unwrap();
        assert_eq!(spec.goods.points.len(), 3);
        assert_eq!(spec.goods.points[0].label, "2008-04-01");
    }

    #[test]
    fn failed_fetch_fails_the_cycle() {
        let mut source = StubSource::with_defaults(8);
        source.tables.remove("T20304");
        let err = run_cycle(&source, &TableNames::default(), &DateRange::unbounded()).unwrap_err();
        assert!(matches!(err, DataError::Fetch { ref table, .. } if table == "T20304"));
    }
}
