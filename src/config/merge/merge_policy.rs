//! Merge rules: defaults, override order, conflict handling.

use crate::services::{reporting, warehouse};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key: defaults, then the global file, then
/// workspace files, then environment variables.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("gcp.partner_table_id", "partner_config")?
        .set_default("gcp.advertiser_table_id", "advertiser_config")?
        .set_default("workbook.path", "spend-monitor.workbook.json")?
        .set_default("reporting.base_url", reporting::DEFAULT_BASE_URL)?
        .set_default("warehouse.base_url", warehouse::DEFAULT_BASE_URL)?
        .set_default("external_tables.skip_leading_rows", 1)?
        .set_default("external_tables.source_format", "GOOGLE_SHEETS")?
        .set_default("auth.token_env", "SPEND_MONITOR_ACCESS_TOKEN")?
        .set_default("http.connect_timeout_secs", 10)?
        .set_default("http.request_timeout_secs", 60)
}
