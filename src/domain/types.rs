//! Shared table types.
//!
//! These types are intentionally kept small and owned so a full fetch→build
//! cycle can be recomputed from scratch on every filter change:
//!
//! - `Quarter`: a typed `YYYYQn` period label
//! - `SeriesTable`: one fetched table pivoted to period × category
//! - `CombinedTable`: the four derived price/quantity columns
//! - `DateRange` / `DateBounds`: the user's filter and the picker limits

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category label of the goods column in NIPA tables.
pub const GOODS: &str = "Goods";
/// Category label of the services column in NIPA tables.
pub const SERVICES: &str = "Services";

/// A calendar quarter, e.g. `2010Q1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    year: i32,
    quarter: u8,
    start: NaiveDate,
}

impl Quarter {
    /// Returns `None` for a quarter outside `1..=4` or a year chrono cannot represent.
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        let month = 3 * u32::from(quarter - 1) + 1;
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self {
            year,
            quarter,
            start,
        })
    }

    /// First calendar day of the quarter.
    pub fn start_date(self) -> NaiveDate {
        self.start
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || format!("Invalid quarterly period '{trimmed}'. Expected YYYYQn.");

        let (year, quarter) = trimmed
            .split_once(['Q', 'q'])
            .ok_or_else(invalid)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u8 = quarter.parse().map_err(|_| invalid())?;
        Quarter::new(year, quarter).ok_or_else(invalid)
    }
}

/// One normalized API record: the numeric value of `category` in `period`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub period: Quarter,
    pub category: String,
    pub value: f64,
}

/// A fetched table pivoted to rows = quarters, columns = category labels.
///
/// Invariants:
/// - `periods` is strictly increasing
/// - every column has exactly `periods.len()` cells
/// - a `None` cell means the response had no value for that (period, category)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesTable {
    periods: Vec<Quarter>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl SeriesTable {
    /// Pivot observations into a table.
    ///
    /// Duplicate (period, category) pairs are averaged.
    pub fn pivot(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut periods = BTreeSet::new();
        let mut acc: BTreeMap<String, BTreeMap<Quarter, (f64, usize)>> = BTreeMap::new();

        for obs in observations {
            periods.insert(obs.period);
            let cell = acc
                .entry(obs.category)
                .or_default()
                .entry(obs.period)
                .or_insert((0.0, 0));
            cell.0 += obs.value;
            cell.1 += 1;
        }

        let periods: Vec<Quarter> = periods.into_iter().collect();
        let columns = acc
            .into_iter()
            .map(|(category, cells)| {
                let column = periods
                    .iter()
                    .map(|p| cells.get(p).map(|&(sum, n)| sum / n as f64))
                    .collect();
                (category, column)
            })
            .collect();

        Self { periods, columns }
    }

    pub fn periods(&self) -> &[Quarter] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Category labels in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Cells of one column, aligned with [`periods`](Self::periods).
    pub fn column(&self, category: &str) -> Option<&[Option<f64>]> {
        self.columns.get(category).map(Vec::as_slice)
    }

    /// Value of a single (period, category) cell.
    pub fn value(&self, period: Quarter, category: &str) -> Option<f64> {
        let idx = self.periods.binary_search(&period).ok()?;
        self.columns.get(category)?.get(idx).copied().flatten()
    }
}

/// One row of the derived price/quantity table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    /// First calendar day of the row's quarter.
    pub date: NaiveDate,
    pub quantity_goods: Option<f64>,
    pub quantity_services: Option<f64>,
    pub price_goods: Option<f64>,
    pub price_services: Option<f64>,
}

/// Quantity and price of goods and services, indexed by quarter start date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombinedTable {
    rows: Vec<CombinedRow>,
}

impl CombinedTable {
    /// Rows must already be in ascending date order.
    pub fn from_rows(rows: Vec<CombinedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CombinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    /// Restrict to rows inside `range`.
    ///
    /// Only a fully bounded range filters; a reversed or out-of-data range
    /// yields an empty table.
    pub fn filter(&self, range: &DateRange) -> CombinedTable {
        match (range.start, range.end) {
            (Some(start), Some(end)) => CombinedTable {
                rows: self
                    .rows
                    .iter()
                    .filter(|r| start <= r.date && r.date <= end)
                    .copied()
                    .collect(),
            },
            _ => self.clone(),
        }
    }

    /// Smallest and largest index date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// User-selected date filter; `None` means "no bound".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        write!(f, "{}..{}", fmt_bound(self.start), fmt_bound(self.end))
    }
}

/// Date-picker limits derived from the bootstrap fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl DateBounds {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        Self {
            min,
            max,
            default_start: preferred_start().clamp(min, max),
            default_end: max,
        }
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }

    pub fn default_range(&self) -> DateRange {
        DateRange::between(self.default_start, self.default_end)
    }
}

/// Initial start date of the picker before clamping: 2010-01-01.
fn preferred_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}
