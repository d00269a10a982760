//! Error types.
//!
//! - [`DataError`]: failures of one fetch→build cycle (network, response
//!   shape, value parsing, missing category columns)
//! - [`AppError`]: a user-facing message plus the process exit code

use thiserror::Error;

/// Exit code for usage/configuration problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for data/runtime failures.
pub const EXIT_DATA: u8 = 4;

/// Errors that terminate the current render cycle.
///
/// None of these are retried. A failed cycle never yields a partial table or
/// a partial chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// Network or transport failure, including non-success HTTP statuses.
    #[error("BEA request for table {table} failed: {message}")]
    Fetch { table: String, message: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected BEA response for table {table}: {message}")]
    Schema { table: String, message: String },

    /// A `DataValue` field was not numeric.
    #[error("Non-numeric DataValue '{value}' in table {table} ({period}, {category})")]
    Parse {
        table: String,
        period: String,
        category: String,
        value: String,
    },

    /// An expected category column is absent from a fetched table.
    #[error("Column '{column}' missing from {role} table")]
    MissingColumn { column: String, role: String },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::data(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
