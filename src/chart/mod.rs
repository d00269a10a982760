//! Chart building: quantity/price tables → two-panel [`ChartSpec`].
//!
//! Steps, in order:
//! 1. combine the `Goods`/`Services` columns of both tables (`combine`)
//! 2. restrict to the selected date range (`CombinedTable::filter`)
//! 3. lay the filtered rows out as a goods panel and a services panel

use chrono::NaiveDate;

use crate::config::TableNames;
use crate::domain::{
    ChartPoint, ChartSpec, CombinedRow, CombinedTable, DateRange, GOODS, LabelPosition, Panel,
    SERVICES, SeriesTable, Theme,
};
use crate::error::DataError;

/// Every n-th point (0-based) carries its date as an annotation.
pub const LABEL_EVERY: usize = 4;

pub const CHART_WIDTH: u32 = 1600;
pub const CHART_HEIGHT: u32 = 800;

const QUANTITY_ROLE: &str = "quantity";
const PRICE_ROLE: &str = "price";

/// Derive the four price/quantity columns.
///
/// The combined index is the quantity table's; price cells are aligned by
/// quarter, so a price table covering a different range yields empty cells
/// rather than shifted values.
pub fn combine(quantity: &SeriesTable, price: &SeriesTable) -> Result<CombinedTable, DataError> {
    let q_goods = require_column(quantity, GOODS, QUANTITY_ROLE)?;
    let q_services = require_column(quantity, SERVICES, QUANTITY_ROLE)?;
    require_column(price, GOODS, PRICE_ROLE)?;
    require_column(price, SERVICES, PRICE_ROLE)?;

    let rows = quantity
        .periods()
        .iter()
        .enumerate()
        .map(|(i, &period)| CombinedRow {
            date: period.start_date(),
            quantity_goods: q_goods[i],
            quantity_services: q_services[i],
            price_goods: price.value(period, GOODS),
            price_services: price.value(period, SERVICES),
        })
        .collect();

    Ok(CombinedTable::from_rows(rows))
}

fn require_column<'a>(
    table: &'a SeriesTable,
    column: &str,
    role: &str,
) -> Result<&'a [Option<f64>], DataError> {
    table.column(column).ok_or_else(|| DataError::MissingColumn {
        column: column.to_string(),
        role: role.to_string(),
    })
}

/// Annotation for the point at `position` in the filtered sequence.
pub fn point_label(position: usize, date: NaiveDate) -> String {
    if position % LABEL_EVERY == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        String::new()
    }
}

/// Builds chart specs with a fixed title, size and theme.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    title: String,
    theme: Theme,
}

impl ChartBuilder {
    pub fn new(tables: &TableNames) -> Self {
        Self {
            title: format!("NIPA TABLES {}-{}", tables.quantity, tables.price),
            theme: Theme::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Combine, filter and lay out both panels.
    pub fn build(
        &self,
        quantity: &SeriesTable,
        price: &SeriesTable,
        range: &DateRange,
    ) -> Result<ChartSpec, DataError> {
        let combined = combine(quantity, price)?;
        Ok(self.build_from_combined(&combined.filter(range)))
    }

    /// Lay out an already filtered table.
    pub fn build_from_combined(&self, table: &CombinedTable) -> ChartSpec {
        let goods = Panel {
            name: "goods".to_string(),
            title: "Goods".to_string(),
            x_title: "Quantity".to_string(),
            y_title: "Price (2012=100)".to_string(),
            label_position: LabelPosition::TopCenter,
            points: panel_points(table, |r| (r.quantity_goods, r.price_goods)),
        };
        let services = Panel {
            name: "services".to_string(),
            title: "Services".to_string(),
            x_title: "Quantity".to_string(),
            y_title: "Price".to_string(),
            label_position: LabelPosition::TopLeft,
            points: panel_points(table, |r| (r.quantity_services, r.price_services)),
        };

        ChartSpec {
            title: self.title.clone(),
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            theme: self.theme.clone(),
            goods,
            services,
        }
    }
}

fn panel_points(
    table: &CombinedTable,
    select: impl Fn(&CombinedRow) -> (Option<f64>, Option<f64>),
) -> Vec<ChartPoint> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (quantity, price) = select(row);
            ChartPoint {
                date: row.date,
                quantity,
                price,
                label: point_label(i, row.date),
            }
        })
        .collect()
}
