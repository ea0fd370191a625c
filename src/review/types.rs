//! Types exchanged between the agent, the reviewer and the audit trail.

use crate::policy::types::{ActionKind, ApprovalRequirement, DecisionKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One action the agent wants to take, waiting for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Tool name (e.g. "write_todos", "task", "write_file")
    pub name: String,
    /// Tool arguments as the agent produced them
    #[serde(default)]
    pub args: Value,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The known action-kind, if this is one of the tools policies cover.
    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::from_name(&self.name)
    }

    /// Read a string argument.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}

/// The reviewer's verdict on one action request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Execute as proposed
    Approve,
    /// Execute this modified action instead
    Edit { edited_action: ActionRequest },
    /// Skip the action
    Reject,
}

impl ReviewDecision {
    pub fn edit(edited_action: ActionRequest) -> Self {
        ReviewDecision::Edit { edited_action }
    }

    pub fn kind(&self) -> DecisionKind {
        match self {
            ReviewDecision::Approve => DecisionKind::Approve,
            ReviewDecision::Edit { .. } => DecisionKind::Edit,
            ReviewDecision::Reject => DecisionKind::Reject,
        }
    }

    /// Arguments of the edited action, if this is an edit.
    pub fn edited_args(&self) -> Option<&Value> {
        match self {
            ReviewDecision::Edit { edited_action } => Some(&edited_action.args),
            _ => None,
        }
    }
}

/// Per-action review settings the agent attaches to a pause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub action_name: String,
    #[serde(default = "all_decisions")]
    pub allowed_decisions: Vec<DecisionKind>,
}

fn all_decisions() -> Vec<DecisionKind> {
    DecisionKind::ALL.to_vec()
}

impl ReviewConfig {
    pub fn new(action_name: impl Into<String>, allowed_decisions: Vec<DecisionKind>) -> Self {
        Self {
            action_name: action_name.into(),
            allowed_decisions,
        }
    }

    /// The requirement this config expresses. `None` when the config allows
    /// no decision at all.
    pub fn requirement(&self) -> Option<ApprovalRequirement> {
        if self.allowed_decisions.is_empty() {
            return None;
        }
        Some(ApprovalRequirement::restricted(self.allowed_decisions.iter().copied()))
    }
}

/// Extra information shown to the reviewer and recorded in the audit log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewContext {
    /// Where in the run this review happens (e.g. "iteration 2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Documents the agent has read so far in this run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents_accessed: Vec<String>,
}

impl ReviewContext {
    /// Context for the n-th pause of a run.
    pub fn for_iteration(iteration: usize, thread_id: impl Into<String>) -> Self {
        Self {
            stage: Some(format!("iteration {}", iteration)),
            thread_id: Some(thread_id.into()),
            documents_accessed: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decision_wire_format() {
        assert_eq!(
            serde_json::to_value(ReviewDecision::Approve).unwrap(),
            json!({"type": "approve"})
        );
        assert_eq!(
            serde_json::to_value(ReviewDecision::Reject).unwrap(),
            json!({"type": "reject"})
        );

        let edit = ReviewDecision::edit(ActionRequest::new("task", json!({"name": "x", "task": "y"})));
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({
                "type": "edit",
                "edited_action": {"name": "task", "args": {"name": "x", "task": "y"}}
            })
        );
    }

    #[test]
    fn test_review_config_defaults_to_all_decisions() {
        let config: ReviewConfig = serde_json::from_value(json!({"action_name": "task"})).unwrap();
        assert_eq!(config.allowed_decisions.len(), 3);
        assert_eq!(config.requirement(), Some(ApprovalRequirement::FullReview));
    }

    #[test]
    fn test_review_config_restricted() {
        let config = ReviewConfig::new("edit_file", vec![DecisionKind::Approve, DecisionKind::Reject]);
        let req = config.requirement().unwrap();
        assert!(req.allows(DecisionKind::Approve));
        assert!(!req.allows(DecisionKind::Edit));
    }

    #[test]
    fn test_review_config_with_no_decisions() {
        let config = ReviewConfig::new("get_document", vec![]);
        assert_eq!(config.requirement(), None);
    }

    #[test]
    fn test_context_for_iteration() {
        let ctx = ReviewContext::for_iteration(3, "thread-1");
        assert_eq!(ctx.stage.as_deref(), Some("iteration 3"));
        assert_eq!(ctx.thread_id.as_deref(), Some("thread-1"));
    }
}
