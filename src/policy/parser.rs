//! YAML parser for oversight settings.
//!
//! The `oversight` section of a config file can take three shapes:
//!
//! ```yaml
//! # 1. a built-in level
//! oversight: moderate
//!
//! # 2. per-area switches (same as ApprovalPolicy::custom)
//! oversight:
//!   planning: true
//!   delegation: false
//!   document_access: false
//!   file_operations: true
//!
//! # 3. an explicit requirement for every action-kind
//! oversight:
//!   write_todos: true
//!   task: true
//!   get_document: false
//!   get_document_pages: false
//!   write_file: true
//!   edit_file: { allowed_decisions: [approve, reject] }
//! ```

use crate::policy::levels::OversightLevel;
use crate::policy::types::{ActionKind, ApprovalPolicy, ApprovalRequirement};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Oversight settings as written in a config file, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OversightSpec {
    Level(String),
    Areas(AreaFlags),
    Explicit(BTreeMap<String, ApprovalRequirement>),
}

/// Per-area switches. Defaults mirror `ApprovalPolicy::custom`'s usual
/// call: review planning, delegation and file output, skip document reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaFlags {
    #[serde(default = "enabled")]
    pub planning: bool,
    #[serde(default = "enabled")]
    pub delegation: bool,
    #[serde(default)]
    pub document_access: bool,
    #[serde(default = "enabled")]
    pub file_operations: bool,
}

fn enabled() -> bool {
    true
}

impl OversightSpec {
    /// Validate and turn the settings into a policy.
    pub fn into_policy(self) -> Result<ApprovalPolicy> {
        match self {
            OversightSpec::Level(name) => OversightLevel::from_str_loose(&name)
                .map(|level| level.policy())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown oversight level '{}' (expected high, moderate or minimal)",
                        name
                    )
                }),
            OversightSpec::Areas(flags) => Ok(ApprovalPolicy::custom(
                flags.planning,
                flags.delegation,
                flags.document_access,
                flags.file_operations,
            )),
            OversightSpec::Explicit(raw) => explicit_policy(raw),
        }
    }
}

fn explicit_policy(raw: BTreeMap<String, ApprovalRequirement>) -> Result<ApprovalPolicy> {
    let mut requirements = BTreeMap::new();
    for (name, requirement) in raw {
        let kind = ActionKind::from_name(&name)
            .ok_or_else(|| anyhow::anyhow!("Unknown action '{}' in oversight mapping", name))?;
        if requirement.is_unsatisfiable() {
            bail!("allowed_decisions for '{}' must not be empty", name);
        }
        requirements.insert(kind, requirement);
    }

    let missing: Vec<&str> = ActionKind::ALL
        .iter()
        .filter(|k| !requirements.contains_key(*k))
        .map(|k| k.as_str())
        .collect();
    if !missing.is_empty() {
        bail!(
            "Oversight mapping must cover every action, missing: {}",
            missing.join(", ")
        );
    }

    ApprovalPolicy::from_requirements(requirements)
        .context("Oversight mapping does not cover every action")
}

/// Parse an oversight section from a YAML string.
pub fn parse_policy_str(yaml: &str) -> Result<ApprovalPolicy> {
    let spec: OversightSpec =
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in oversight settings")?;
    spec.into_policy()
}
