//! Configuration System
//!
//! Deployment settings for the monitor: which cloud project and dataset hold the external
//! tables, where the workbook lives, which API endpoints to call and how to authenticate.
//! Loaded in layers (defaults, global file, workspace files, environment) by [`ConfigLoader`].

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub gcp: GcpConfig,

    #[serde(default)]
    pub workbook: WorkbookConfig,

    #[serde(default)]
    pub reporting: ReportingConfig,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub external_tables: ExternalTablesConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cloud project, dataset and the ids of the two external tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub dataset_id: String,
    #[serde(default = "default_partner_table_id")]
    pub partner_table_id: String,
    #[serde(default = "default_advertiser_table_id")]
    pub advertiser_table_id: String,
}

fn default_partner_table_id() -> String {
    "partner_config".to_string()
}

fn default_advertiser_table_id() -> String {
    "advertiser_config".to_string()
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset_id: String::new(),
            partner_table_id: default_partner_table_id(),
            advertiser_table_id: default_advertiser_table_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookConfig {
    /// Local workbook file; relative paths are resolved against the workspace root
    #[serde(default = "default_workbook_path")]
    pub path: PathBuf,

    /// URI the warehouse reads the workbook from
    #[serde(default)]
    pub source_uri: String,
}

fn default_workbook_path() -> PathBuf {
    PathBuf::from("spend-monitor.workbook.json")
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            path: default_workbook_path(),
            source_uri: String::new(),
        }
    }
}

impl WorkbookConfig {
    pub fn resolve_path(&self, workspace_root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            workspace_root.join(&self.path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_reporting_url")]
    pub base_url: String,

    /// JSON report definition replacing the built-in template. `${partnerId}` and
    /// `${partnerName}` are filled in string values only; object keys are used as written.
    #[serde(default)]
    pub template_file: Option<PathBuf>,
}

fn default_reporting_url() -> String {
    crate::services::reporting::DEFAULT_BASE_URL.to_string()
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            base_url: default_reporting_url(),
            template_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    #[serde(default = "default_warehouse_url")]
    pub base_url: String,
}

fn default_warehouse_url() -> String {
    crate::services::warehouse::DEFAULT_BASE_URL.to_string()
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            base_url: default_warehouse_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalTablesConfig {
    #[serde(default = "default_skip_leading_rows")]
    pub skip_leading_rows: u32,
    #[serde(default = "default_source_format")]
    pub source_format: String,
}

fn default_skip_leading_rows() -> u32 {
    1
}

fn default_source_format() -> String {
    "GOOGLE_SHEETS".to_string()
}

impl Default for ExternalTablesConfig {
    fn default() -> Self {
        Self {
            skip_leading_rows: default_skip_leading_rows(),
            source_format: default_source_format(),
        }
    }
}

/// Where access tokens come from. `token_command` wins over `token_env` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default)]
    pub token_command: Option<Vec<String>>,
}

fn default_token_env() -> String {
    "SPEND_MONITOR_ACCESS_TOKEN".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            token_command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Missing(String),
    InvalidUrl(String, String),
    Invalid(String, String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Missing(key) => write!(f, "'{}' must be set", key),
            ValidationError::InvalidUrl(key, url) => {
                write!(f, "'{}': '{}' is not an http(s) URL", key, url)
            }
            ValidationError::Invalid(key, msg) => write!(f, "'{}': {}", key, msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

impl MonitorConfig {
    /// Validate the entire configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let required = [
            ("gcp.project_id", &self.gcp.project_id),
            ("gcp.dataset_id", &self.gcp.dataset_id),
            ("gcp.partner_table_id", &self.gcp.partner_table_id),
            ("gcp.advertiser_table_id", &self.gcp.advertiser_table_id),
            ("workbook.source_uri", &self.workbook.source_uri),
            ("external_tables.source_format", &self.external_tables.source_format),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                errors.push(ValidationError::Missing(key.to_string()));
            }
        }

        if self.gcp.partner_table_id == self.gcp.advertiser_table_id {
            errors.push(ValidationError::Invalid(
                "gcp.advertiser_table_id".to_string(),
                "must differ from gcp.partner_table_id".to_string(),
            ));
        }

        for (key, url) in [
            ("reporting.base_url", &self.reporting.base_url),
            ("warehouse.base_url", &self.warehouse.base_url),
        ] {
            if !is_http_url(url) {
                errors.push(ValidationError::InvalidUrl(key.to_string(), url.clone()));
            }
        }

        if self.workbook.path.as_os_str().is_empty() {
            errors.push(ValidationError::Missing("workbook.path".to_string()));
        }

        if self.auth.token_env.is_empty() && self.auth.token_command.is_none() {
            errors.push(ValidationError::Missing("auth.token_env".to_string()));
        }
        if let Some(command) = &self.auth.token_command {
            if command.is_empty() {
                errors.push(ValidationError::Invalid(
                    "auth.token_command".to_string(),
                    "must name a program".to_string(),
                ));
            }
        }

        for (key, secs) in [
            ("http.connect_timeout_secs", self.http.connect_timeout_secs),
            ("http.request_timeout_secs", self.http.request_timeout_secs),
        ] {
            if secs == 0 {
                errors.push(ValidationError::Invalid(
                    key.to_string(),
                    "must be greater than zero".to_string(),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
