//! Environment source: SPEND_MONITOR__SECTION__KEY variables.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "SPEND_MONITOR";

/// Add environment overrides, e.g. `SPEND_MONITOR__GCP__PROJECT_ID` for `gcp.project_id`.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    )
}
