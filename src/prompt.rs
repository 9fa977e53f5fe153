//! User prompts: confirmation before destructive operations and human-readable alerts.

use crate::error::PipelineError;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use std::collections::VecDeque;
use std::sync::Mutex;

pub trait UserPrompt: Send + Sync {
    /// Ask a yes/no question. `Ok(false)` means the user declined.
    fn confirm(&self, title: &str, message: &str) -> Result<bool, PipelineError>;

    /// Show a notification that needs no answer.
    fn alert(&self, title: &str, message: &str);
}

/// Terminal prompt backed by `dialoguer`. With `assume_yes` every confirmation is accepted.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl UserPrompt for TerminalPrompt {
    fn confirm(&self, title: &str, message: &str) -> Result<bool, PipelineError> {
        if self.assume_yes {
            tracing::info!(title, "Confirmation assumed (--yes)");
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(format!("{}: {}", title, message))
            .default(false)
            .interact()
            .map_err(|e| PipelineError::Prompt(format!("Failed to get user input: {}", e)))
    }

    fn alert(&self, title: &str, message: &str) {
        eprintln!("{} {}", format!("{}:", title).bold(), message);
    }
}

/// Prompt with pre-recorded answers, for tests and unattended runs. Records what was shown.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    confirmations: Mutex<Vec<String>>,
    alerts: Mutex<Vec<(String, String)>>,
}

impl ScriptedPrompt {
    /// Answers are consumed in order; once exhausted every confirmation is declined.
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn confirm(&self, _title: &str, message: &str) -> Result<bool, PipelineError> {
        self.confirmations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
        Ok(self
            .answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(false))
    }

    fn alert(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((title.to_string(), message.to_string()));
    }
}
