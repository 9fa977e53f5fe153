//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, PipelineError};

/// Map pipeline errors to a message for stderr. API failures carry a hint about what to check.
pub fn map_error(e: &PipelineError) -> String {
    match e {
        PipelineError::Api(ApiError::Auth(msg)) => format!(
            "Authentication failed: {}\nSet the token variable named by auth.token_env or configure auth.token_command.",
            msg
        ),
        PipelineError::Api(ApiError::Status { code, message }) => {
            format!("API request failed with status {}:\n{}", code, message)
        }
        PipelineError::Store(crate::error::StoreError::TableNotFound(name)) => format!(
            "Table '{}' does not exist. Run 'spend-monitor init' first.",
            name
        ),
        other => other.to_string(),
    }
}
