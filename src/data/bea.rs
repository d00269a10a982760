//! BEA API integration for quarterly NIPA tables.
//!
//! A table comes back as a flat list of records under `BEAAPI.Results.Data`,
//! one per (period, line) pair. We keep the three fields we need and pivot
//! them into a [`SeriesTable`].

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::BeaConfig;
use crate::data::SeriesSource;
use crate::domain::{Observation, Quarter, SeriesTable};
use crate::error::DataError;

const METHOD: &str = "GetData";
const DATASET: &str = "NIPA";
const FREQUENCY_QUARTERLY: &str = "Q";
const YEAR_ALL: &str = "ALL";
const RESULT_FORMAT: &str = "JSON";

pub struct BeaClient {
    client: Client,
    config: BeaConfig,
}

impl BeaClient {
    pub fn new(config: &BeaConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    /// Fetch one NIPA table as quarterly data for all years.
    ///
    /// The table name is not validated locally; an unknown table fails
    /// remotely and surfaces as a schema error carrying BEA's description.
    pub fn fetch_table(&self, table_name: &str) -> Result<SeriesTable, DataError> {
        let fetch_err = |message: String| DataError::Fetch {
            table: table_name.to_string(),
            message,
        };

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("UserID", self.config.user_id.as_str()),
                ("Method", METHOD),
                ("Datasetname", DATASET),
                ("TableName", table_name),
                ("Frequency", FREQUENCY_QUARTERLY),
                ("Year", YEAR_ALL),
                ("ResultFormat", RESULT_FORMAT),
            ])
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_err(format!("HTTP status {}", resp.status())));
        }

        let body = resp
            .text()
            .map_err(|e| fetch_err(format!("failed to read body: {e}")))?;

        let table = parse_response(table_name, &body)?;
        tracing::debug!(
            table = table_name,
            periods = table.len(),
            "fetched BEA table"
        );
        Ok(table)
    }
}

impl SeriesSource for BeaClient {
    fn fetch(&self, table_name: &str) -> Result<SeriesTable, DataError> {
        self.fetch_table(table_name)
    }
}

/// One record of `BEAAPI.Results.Data`; other fields are ignored.
#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(rename = "TimePeriod")]
    time_period: String,
    #[serde(rename = "LineDescription")]
    line_description: String,
    #[serde(rename = "DataValue")]
    data_value: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "APIErrorDescription", default)]
    description: Option<String>,
    #[serde(rename = "APIErrorCode", default)]
    code: Option<Value>,
}

/// Parse a BEA response body into a pivoted table.
pub fn parse_response(table_name: &str, body: &str) -> Result<SeriesTable, DataError> {
    let schema_err = |message: String| DataError::Schema {
        table: table_name.to_string(),
        message,
    };

    let root: Value =
        serde_json::from_str(body).map_err(|e| schema_err(format!("invalid JSON: {e}")))?;
    let api = root
        .get("BEAAPI")
        .ok_or_else(|| schema_err("missing `BEAAPI`".to_string()))?;

    // BEA reports request errors inside an otherwise well-formed envelope.
    let error = api
        .get("Error")
        .or_else(|| api.get("Results").and_then(|r| r.get("Error")));
    if let Some(error) = error {
        return Err(schema_err(describe_api_error(error)));
    }

    let data = api
        .get("Results")
        .and_then(|r| r.get("Data"))
        .ok_or_else(|| schema_err("missing `BEAAPI.Results.Data`".to_string()))?;
    let records: Vec<RawObservation> = serde_json::from_value(data.clone())
        .map_err(|e| schema_err(format!("malformed `Data` records: {e}")))?;

    let mut observations = Vec::with_capacity(records.len());
    for record in records {
        let period: Quarter = record.time_period.parse().map_err(schema_err)?;
        let value = parse_data_value(&record.data_value).ok_or_else(|| DataError::Parse {
            table: table_name.to_string(),
            period: record.time_period.clone(),
            category: record.line_description.clone(),
            value: record.data_value.clone(),
        })?;
        observations.push(Observation {
            period,
            category: record.line_description,
            value,
        });
    }

    Ok(SeriesTable::pivot(observations))
}

fn describe_api_error(error: &Value) -> String {
    match serde_json::from_value::<ApiError>(error.clone()) {
        Ok(ApiError {
            description: Some(desc),
            code: Some(code),
        }) => format!("BEA error {code}: {desc}"),
        Ok(ApiError {
            description: Some(desc),
            ..
        }) => format!("BEA error: {desc}"),
        _ => format!("BEA error: {error}"),
    }
}

/// Parse a `DataValue` field.
///
/// BEA writes thousands separators into large values (`"1,234.5"`).
fn parse_data_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
