pub mod files;
pub mod intent;
pub mod state;

use anyhow::{Context as _, Result};
use brief_application::{IntentServices, IntentSession};
use brief_core::intent::{IntentContent, IntentFormData};
use brief_infrastructure::ConfigService;
use clap::Args;
use std::path::PathBuf;

/// Resolved workspace and services for one CLI invocation.
pub struct Context {
    pub services: IntentServices,
}

impl Context {
    pub async fn load(workspace: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let workspace = match workspace {
            Some(path) => path,
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let config_service = match config {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let config = config_service
            .get_config()
            .await
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

        tracing::debug!(workspace = %workspace.display(), "Using workspace");
        Ok(Self {
            services: IntentServices::local(workspace, config),
        })
    }

    pub async fn open(&self, name: &str) -> Result<IntentSession> {
        IntentSession::for_intent(self.services.clone(), name)
            .await
            .with_context(|| format!("Cannot open intent '{}'", name))
    }
}

/// Content fields accepted by create/generate/regenerate.
///
/// Omitted fields keep the intent's current value.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    #[arg(long)]
    pub problem: Option<String>,
    #[arg(long)]
    pub expected_output: Option<String>,
    /// A current-behavior step (repeatable)
    #[arg(long = "current")]
    pub current_behavior: Vec<String>,
    /// A desired-behavior step (repeatable)
    #[arg(long = "desired")]
    pub desired_behavior: Vec<String>,
    #[arg(long)]
    pub considerations: Option<String>,
}

impl FormArgs {
    pub fn into_form(self, name: &str, base: &IntentContent) -> IntentFormData {
        IntentFormData {
            name: name.to_string(),
            problem: self.problem.unwrap_or_else(|| base.problem.clone()),
            expected_output: self
                .expected_output
                .unwrap_or_else(|| base.expected_output.clone()),
            current_behavior: if self.current_behavior.is_empty() {
                base.current_behavior.clone()
            } else {
                self.current_behavior
            },
            desired_behavior: if self.desired_behavior.is_empty() {
                base.desired_behavior.clone()
            } else {
                self.desired_behavior
            },
            considerations: self
                .considerations
                .unwrap_or_else(|| base.considerations.clone()),
        }
    }
}

pub fn print_warnings(session: &IntentSession) {
    for warning in session.warnings() {
        eprintln!("warning: {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_args_keep_unset_fields() {
        let base = IntentContent {
            problem: "old problem".into(),
            expected_output: "old output".into(),
            current_behavior: vec!["step".into()],
            ..Default::default()
        };
        let args = FormArgs {
            problem: Some("new problem".into()),
            desired_behavior: vec!["better".into()],
            ..Default::default()
        };

        let form = args.into_form("fix-bug", &base);
        assert_eq!(form.name, "fix-bug");
        assert_eq!(form.problem, "new problem");
        assert_eq!(form.expected_output, "old output");
        assert_eq!(form.current_behavior, vec!["step"]);
        assert_eq!(form.desired_behavior, vec!["better"]);
    }
}
