//! Access token sources. The identity provider is external; these only fetch what it issues.

use crate::error::ApiError;
use std::process::Command;

/// Supplies a bearer token for each request.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Result<String, ApiError>;
}

fn non_empty(token: String, origin: &str) -> Result<String, ApiError> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(ApiError::Auth(format!("{} returned an empty token", origin)));
    }
    Ok(token)
}

/// Fixed token.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<String, ApiError> {
        non_empty(self.token.clone(), "static token")
    }
}

/// Token read from an environment variable on every call.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenSource for EnvToken {
    fn access_token(&self) -> Result<String, ApiError> {
        let token = std::env::var(&self.var)
            .map_err(|_| ApiError::Auth(format!("environment variable {} is not set", self.var)))?;
        non_empty(token, &self.var)
    }
}

/// Token printed on stdout by an external command, e.g. `gcloud auth print-access-token`.
pub struct CommandToken {
    program: String,
    args: Vec<String>,
}

impl CommandToken {
    /// Build from a command line split into program and arguments.
    pub fn new(command: &[String]) -> Result<Self, ApiError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ApiError::Auth("token command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl TokenSource for CommandToken {
    fn access_token(&self) -> Result<String, ApiError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| ApiError::Auth(format!("failed to run {}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(ApiError::Auth(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        non_empty(
            String::from_utf8_lossy(&output.stdout).into_owned(),
            &self.program,
        )
    }
}
