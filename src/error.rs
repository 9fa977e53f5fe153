//! Error types for the spend monitor.

use thiserror::Error;

/// REST-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote API answered with a non-2xx status. `message` is the raw body.
    #[error("API request failed with status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    #[error("Access token unavailable: {0}")]
    Auth(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }
}

/// Raised when a `${path}` placeholder cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Fail to find property {path} in parameters")]
pub struct MissingParameterError {
    pub path: String,
}

/// Tabular store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Workbook is corrupt: {0}")]
    Corrupt(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by pipeline operations and the CLI
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid report template: {0}")]
    Template(String),

    #[error("Could not determine whether table {table_id} exists: {source}")]
    TableLookup {
        table_id: String,
        #[source]
        source: ApiError,
    },

    #[error("{failed} report(s) could not be created ({created} created)")]
    ReportsFailed { failed: usize, created: usize },

    #[error("Partner not found: {0}")]
    PartnerNotFound(String),

    #[error("Partner {partner_id} has no report yet (report_id is '{report_id}')")]
    ReportMissing {
        partner_id: String,
        report_id: String,
    },
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
