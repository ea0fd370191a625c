//! `.hitlctl.yaml`: project settings for review runs.
//!
//! Looked up from the current directory upwards, then at
//! `~/.hitlctl/config.yaml`. Every field is optional:
//!
//! ```yaml
//! reviewer: legal_team_member
//! audit: true
//! audit_log: logs/review_audit.jsonl
//! max_iterations: 50
//! oversight: moderate
//! editor: vim
//! subagents: [legal-analyzer, report-creator]
//! ```

use crate::audit::{AuditTrail, DEFAULT_AUDIT_FILE};
use crate::hitl::runner::{DEFAULT_MAX_ITERATIONS, DEFAULT_REVIEWER};
use crate::policy::parser::OversightSpec;
use crate::policy::types::ApprovalPolicy;
use crate::review::terminal::{PromptOptions, DEFAULT_SUBAGENTS};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".hitlctl.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitlConfig {
    /// Name recorded in the audit log for interactive decisions
    pub reviewer: String,

    /// Record every decision
    pub audit: bool,

    pub audit_log: PathBuf,

    /// Review rounds before a run is abandoned
    pub max_iterations: usize,

    /// Level name, per-area flags or explicit mapping. Moderate when unset.
    pub oversight: Option<OversightSpec>,

    /// Overrides `$EDITOR` for file content edits
    pub editor: Option<String>,

    pub subagents: Vec<String>,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self {
            reviewer: DEFAULT_REVIEWER.to_string(),
            audit: true,
            audit_log: PathBuf::from(DEFAULT_AUDIT_FILE),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            oversight: None,
            editor: None,
            subagents: DEFAULT_SUBAGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HitlConfig {
    /// Parse a config from YAML. An empty document gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Find and load the config that applies to `start`. Defaults when there
    /// is none. Also returns the path that was loaded.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>)> {
        let found = find_config_walking_up(start)
            .or_else(|| user_config_path().filter(|p| p.exists()));

        match found {
            Some(path) => {
                tracing::debug!("Using config {}", path.display());
                Ok((Self::load(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// The approval policy these settings describe.
    pub fn policy(&self) -> Result<ApprovalPolicy> {
        match self.oversight.clone() {
            Some(spec) => spec.into_policy().context("Invalid oversight settings"),
            None => Ok(ApprovalPolicy::moderate_oversight()),
        }
    }

    pub fn prompt_options(&self) -> PromptOptions {
        let mut options = PromptOptions::default();
        if let Some(ref editor) = self.editor {
            options.editor = editor.clone();
        }
        if !self.subagents.is_empty() {
            options.subagents = self.subagents.clone();
        }
        options
    }

    /// The audit trail to write to, or `None` when auditing is off.
    pub fn audit_trail(&self) -> Result<Option<AuditTrail>> {
        if !self.audit {
            return Ok(None);
        }
        AuditTrail::new(&self.audit_log).map(Some)
    }
}

/// Find `.hitlctl.yaml` walking up the directory tree.
pub fn find_config_walking_up(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// `~/.hitlctl/config.yaml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hitlctl").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::types::{ActionKind, ApprovalRequirement};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HitlConfig::from_yaml("").unwrap();
        assert_eq!(config.reviewer, "human");
        assert!(config.audit);
        assert_eq!(config.audit_log, PathBuf::from("review_audit.jsonl"));
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.policy().unwrap(), ApprovalPolicy::moderate_oversight());
        assert_eq!(config.subagents.len(), 4);
    }

    #[test]
    fn test_parse_full_config() {
        let config = HitlConfig::from_yaml(
            r#"
reviewer: legal_team_member
audit: false
max_iterations: 5
oversight:
  planning: false
  delegation: false
  document_access: false
  file_operations: true
editor: vim
subagents: [legal-analyzer]
"#,
        )
        .unwrap();

        assert_eq!(config.reviewer, "legal_team_member");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.policy().unwrap(), ApprovalPolicy::minimal_oversight());
        assert!(config.audit_trail().unwrap().is_none());

        let options = config.prompt_options();
        assert_eq!(options.editor, "vim");
        assert_eq!(options.subagents, vec!["legal-analyzer".to_string()]);
    }

    #[test]
    fn test_unknown_field_is_error() {
        assert!(HitlConfig::from_yaml("reviewr: typo").is_err());
    }

    #[test]
    fn test_bad_oversight_level() {
        let config = HitlConfig::from_yaml("oversight: paranoid").unwrap();
        let err = config.policy().unwrap_err();
        assert!(format!("{:#}", err).contains("paranoid"));
    }

    #[test]
    fn test_explicit_oversight_mapping() {
        let config = HitlConfig::from_yaml(
            r#"
oversight:
  write_todos: false
  task: false
  get_document: false
  get_document_pages: false
  write_file: true
  edit_file: {allowed_decisions: [approve]}
"#,
        )
        .unwrap();
        let policy = config.policy().unwrap();
        assert_eq!(
            policy.requirement(ActionKind::EditFile),
            &ApprovalRequirement::restricted([crate::policy::DecisionKind::Approve])
        );
    }

    #[test]
    fn test_walks_up_to_find_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "reviewer: alice\n").unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_walking_up(&nested).unwrap();
        assert_eq!(found, tmp.path().join(CONFIG_FILE));

        let (config, path) = HitlConfig::discover(&nested).unwrap();
        assert_eq!(config.reviewer, "alice");
        assert_eq!(path, Some(found));
    }
}
