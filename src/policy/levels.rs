//! Built-in oversight levels.
//!
//! - `high`: every action pauses for review. For first deployments and high-stakes work.
//! - `moderate`: planning, delegation and outputs are reviewed; document reads are not.
//!   `edit_file` may only be approved or rejected, never edited by the reviewer.
//! - `minimal`: only file outputs are reviewed.

use crate::policy::types::{ActionKind, ApprovalPolicy, ApprovalRequirement, DecisionKind};
use std::fmt;

impl ApprovalPolicy {
    /// Maximum oversight: review everything.
    pub fn high_oversight() -> Self {
        Self::custom(true, true, true, true)
    }

    /// Review planning, delegation and file outputs; skip document reads.
    pub fn moderate_oversight() -> Self {
        // edit_file is restricted to approve/reject here only. Keep it that way
        // until product signs off on making it consistent with the other levels.
        Self::from_pairs([
            (ActionKind::WriteTodos, ApprovalRequirement::FullReview),
            (ActionKind::Task, ApprovalRequirement::FullReview),
            (ActionKind::GetDocument, ApprovalRequirement::NoReview),
            (ActionKind::GetDocumentPages, ApprovalRequirement::NoReview),
            (ActionKind::WriteFile, ApprovalRequirement::FullReview),
            (
                ActionKind::EditFile,
                ApprovalRequirement::restricted([DecisionKind::Approve, DecisionKind::Reject]),
            ),
        ])
    }

    /// Review final outputs only.
    pub fn minimal_oversight() -> Self {
        Self::custom(false, false, false, true)
    }

    /// Pick oversight per area. Each flag covers its action-kinds as a pair
    /// where there are two (document reads, file operations).
    pub fn custom(planning: bool, delegation: bool, document_access: bool, file_operations: bool) -> Self {
        Self::from_pairs([
            (ActionKind::WriteTodos, planning.into()),
            (ActionKind::Task, delegation.into()),
            (ActionKind::GetDocument, document_access.into()),
            (ActionKind::GetDocumentPages, document_access.into()),
            (ActionKind::WriteFile, file_operations.into()),
            (ActionKind::EditFile, file_operations.into()),
        ])
    }
}

/// Named oversight levels, selectable from the CLI and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OversightLevel {
    High,
    Moderate,
    Minimal,
}

impl OversightLevel {
    /// Parse a level name. Accepts a few aliases so config files read naturally.
    pub fn from_str_loose(s: &str) -> Option<OversightLevel> {
        match s.to_lowercase().trim() {
            "high" | "high_oversight" | "full" | "strict" | "all" => Some(OversightLevel::High),
            "moderate" | "moderate_oversight" | "medium" | "default" => Some(OversightLevel::Moderate),
            "minimal" | "minimal_oversight" | "low" | "trusted" | "outputs" => Some(OversightLevel::Minimal),
            _ => None,
        }
    }

    pub fn policy(&self) -> ApprovalPolicy {
        match self {
            OversightLevel::High => ApprovalPolicy::high_oversight(),
            OversightLevel::Moderate => ApprovalPolicy::moderate_oversight(),
            OversightLevel::Minimal => ApprovalPolicy::minimal_oversight(),
        }
    }
}

impl fmt::Display for OversightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OversightLevel::High => write!(f, "high"),
            OversightLevel::Moderate => write!(f, "moderate"),
            OversightLevel::Minimal => write!(f, "minimal"),
        }
    }
}

/// List the built-in levels with a one-line description each.
pub fn available_levels() -> Vec<(&'static str, &'static str)> {
    vec![
        ("high", "Review every action: initial deployment, high-stakes analyses"),
        (
            "moderate",
            "Review planning, delegation and outputs: routine work with a trusted agent",
        ),
        ("minimal", "Review final file outputs only: mature deployments"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderate_edit_file_is_restricted() {
        let policy = ApprovalPolicy::moderate_oversight();
        let req = policy.requirement(ActionKind::EditFile);
        assert_eq!(
            req,
            &ApprovalRequirement::restricted([DecisionKind::Approve, DecisionKind::Reject])
        );
        assert!(!req.allows(DecisionKind::Edit));
    }

    #[test]
    fn test_moderate_skips_document_reads() {
        let policy = ApprovalPolicy::moderate_oversight();
        assert!(!policy.requires_review(ActionKind::GetDocument));
        assert!(!policy.requires_review(ActionKind::GetDocumentPages));
        assert!(policy.requires_review(ActionKind::WriteTodos));
        assert!(policy.requires_review(ActionKind::Task));
        assert!(policy.requires_review(ActionKind::WriteFile));
    }

    #[test]
    fn test_level_aliases() {
        assert_eq!(OversightLevel::from_str_loose("HIGH"), Some(OversightLevel::High));
        assert_eq!(OversightLevel::from_str_loose("trusted"), Some(OversightLevel::Minimal));
        assert_eq!(OversightLevel::from_str_loose("medium"), Some(OversightLevel::Moderate));
        assert_eq!(OversightLevel::from_str_loose("paranoid"), None);
    }

    #[test]
    fn test_level_policy_matches_constructor() {
        assert_eq!(OversightLevel::High.policy(), ApprovalPolicy::high_oversight());
        assert_eq!(OversightLevel::Minimal.policy(), ApprovalPolicy::minimal_oversight());
    }
}
