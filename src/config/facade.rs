//! Public entry points for loading [`MonitorConfig`](super::MonitorConfig).

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::MonitorConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `config/config.toml`,
    /// `config/{SPEND_MONITOR_ENV}.toml`, `SPEND_MONITOR__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<MonitorConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: MonitorConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            project_id = %config.gcp.project_id,
            dataset_id = %config.gcp.dataset_id,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from one explicit file instead of the global and workspace files.
    /// Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Path of the global config file, if a config home can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
