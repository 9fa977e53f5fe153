//! Workspace files: `config/config.toml`, then `config/{SPEND_MONITOR_ENV}.toml`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_VAR: &str = "SPEND_MONITOR_ENV";
const DEFAULT_ENV: &str = "development";

/// Workspace config files in increasing precedence. Only files that exist are returned.
pub fn candidate_files(workspace_root: &Path) -> Vec<PathBuf> {
    let env_name = std::env::var(ENV_VAR)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string());
    let config_dir = workspace_root.join("config");

    [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ]
    .into_iter()
    .filter(|path| path.is_file())
    .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(candidate_files(workspace_root)
        .into_iter()
        .fold(builder, |builder, path| {
            debug!(path = %path.display(), "Adding workspace config file");
            builder.add_source(File::from(path.as_path()).required(false))
        }))
}
