//! Core types for approval policies.
//!
//! A policy maps every action-kind the agent can propose to an approval
//! requirement: skip review entirely, allow any decision, or allow only a
//! restricted set of decisions.

use crate::review::types::ReviewConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The action-kinds an agent can propose that a policy knows about.
/// Anything else the agent emits is still reviewable, it just has no
/// dedicated edit flow and no policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Creating or updating the agent's plan (todo list)
    WriteTodos,
    /// Delegating a sub-task to a subagent
    Task,
    /// Fetching a whole document
    GetDocument,
    /// Fetching specific pages of a document
    GetDocumentPages,
    /// Creating a file
    WriteFile,
    /// Modifying an existing file
    EditFile,
}

impl ActionKind {
    /// Every kind, in the order policies list them.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::WriteTodos,
        ActionKind::Task,
        ActionKind::GetDocument,
        ActionKind::GetDocumentPages,
        ActionKind::WriteFile,
        ActionKind::EditFile,
    ];

    /// The tool name the agent uses for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::WriteTodos => "write_todos",
            ActionKind::Task => "task",
            ActionKind::GetDocument => "get_document",
            ActionKind::GetDocumentPages => "get_document_pages",
            ActionKind::WriteFile => "write_file",
            ActionKind::EditFile => "edit_file",
        }
    }

    /// Resolve an agent tool name. Exact match only; tool names are
    /// machine-generated, not typed by humans.
    pub fn from_name(name: &str) -> Option<ActionKind> {
        ActionKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision a reviewer can take on a proposed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Approve,
    Edit,
    Reject,
}

impl DecisionKind {
    pub const ALL: [DecisionKind; 3] = [DecisionKind::Approve, DecisionKind::Edit, DecisionKind::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Approve => "approve",
            DecisionKind::Edit => "edit",
            DecisionKind::Reject => "reject",
        }
    }

    /// Parse a decision from user-typed text (CLI filters, config files).
    pub fn from_str_loose(s: &str) -> Option<DecisionKind> {
        match s.to_lowercase().trim() {
            "approve" | "approved" | "accept" | "yes" => Some(DecisionKind::Approve),
            "edit" | "edited" | "modify" => Some(DecisionKind::Edit),
            "reject" | "rejected" | "deny" | "denied" | "no" => Some(DecisionKind::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much human oversight an action-kind gets.
///
/// Serialized the way policy files write it: `false` / `true`, or
/// `{allowed_decisions: [approve, reject]}` for a restricted set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRequirement", into = "RawRequirement")]
pub enum ApprovalRequirement {
    /// Auto-pass, never surfaced to a human.
    NoReview,
    /// Reviewer may approve, edit or reject.
    FullReview,
    /// Reviewer may only pick from this subset.
    RestrictedReview(BTreeSet<DecisionKind>),
}

impl ApprovalRequirement {
    /// Build a restricted requirement from a list of decisions. Listing every
    /// decision is the same as an unrestricted review.
    pub fn restricted(allowed: impl IntoIterator<Item = DecisionKind>) -> Self {
        let set: BTreeSet<DecisionKind> = allowed.into_iter().collect();
        if set.len() == DecisionKind::ALL.len() {
            ApprovalRequirement::FullReview
        } else {
            ApprovalRequirement::RestrictedReview(set)
        }
    }

    /// A restricted review with nothing to choose from. Such a requirement
    /// cannot be satisfied by any reviewer.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, ApprovalRequirement::RestrictedReview(set) if set.is_empty())
    }

    /// Whether a human ever sees this action.
    pub fn needs_review(&self) -> bool {
        !matches!(self, ApprovalRequirement::NoReview)
    }

    /// The decisions a reviewer may choose from, in menu order.
    pub fn allowed_decisions(&self) -> Vec<DecisionKind> {
        match self {
            ApprovalRequirement::NoReview => Vec::new(),
            ApprovalRequirement::FullReview => DecisionKind::ALL.to_vec(),
            ApprovalRequirement::RestrictedReview(set) => set.iter().copied().collect(),
        }
    }

    pub fn allows(&self, decision: DecisionKind) -> bool {
        match self {
            ApprovalRequirement::NoReview => false,
            ApprovalRequirement::FullReview => true,
            ApprovalRequirement::RestrictedReview(set) => set.contains(&decision),
        }
    }
}

impl From<bool> for ApprovalRequirement {
    fn from(review: bool) -> Self {
        if review {
            ApprovalRequirement::FullReview
        } else {
            ApprovalRequirement::NoReview
        }
    }
}

/// On-disk shape of a requirement. Lets policy files say `true` instead of
/// spelling out every decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRequirement {
    Flag(bool),
    Restricted { allowed_decisions: Vec<DecisionKind> },
}

impl From<RawRequirement> for ApprovalRequirement {
    fn from(raw: RawRequirement) -> Self {
        match raw {
            RawRequirement::Flag(b) => b.into(),
            RawRequirement::Restricted { allowed_decisions } => {
                ApprovalRequirement::restricted(allowed_decisions)
            }
        }
    }
}

impl From<ApprovalRequirement> for RawRequirement {
    fn from(req: ApprovalRequirement) -> Self {
        match req {
            ApprovalRequirement::NoReview => RawRequirement::Flag(false),
            ApprovalRequirement::FullReview => RawRequirement::Flag(true),
            ApprovalRequirement::RestrictedReview(set) => RawRequirement::Restricted {
                allowed_decisions: set.into_iter().collect(),
            },
        }
    }
}

impl fmt::Display for ApprovalRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalRequirement::NoReview => write!(f, "no review"),
            ApprovalRequirement::FullReview => write!(f, "review (approve/edit/reject)"),
            ApprovalRequirement::RestrictedReview(set) => {
                let names: Vec<&str> = set.iter().map(|d| d.as_str()).collect();
                write!(f, "review ({})", names.join("/"))
            }
        }
    }
}

/// A complete approval policy: one requirement per known action-kind.
///
/// Always covers all six kinds. Construct it through the canned levels in
/// `levels.rs` or `ApprovalPolicy::custom`; there is no way to mutate one
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApprovalPolicy {
    requirements: BTreeMap<ActionKind, ApprovalRequirement>,
}

impl ApprovalPolicy {
    /// Build a policy from a full mapping. Returns `None` unless every
    /// action-kind is present.
    pub fn from_requirements(requirements: BTreeMap<ActionKind, ApprovalRequirement>) -> Option<Self> {
        if ActionKind::ALL.iter().all(|k| requirements.contains_key(k)) {
            Some(Self { requirements })
        } else {
            None
        }
    }

    pub(crate) fn from_pairs(pairs: [(ActionKind, ApprovalRequirement); 6]) -> Self {
        Self {
            requirements: pairs.into_iter().collect(),
        }
    }

    /// Requirement for a known action-kind.
    pub fn requirement(&self, kind: ActionKind) -> &ApprovalRequirement {
        // Every constructor covers all kinds.
        &self.requirements[&kind]
    }

    pub fn requires_review(&self, kind: ActionKind) -> bool {
        self.requirement(kind).needs_review()
    }

    /// Iterate over (kind, requirement) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionKind, &ApprovalRequirement)> {
        self.requirements.iter().map(|(k, r)| (*k, r))
    }

    /// The action-kinds this policy covers.
    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.requirements.keys().copied()
    }

    /// Number of action-kinds that pause for a human.
    pub fn reviewed_count(&self) -> usize {
        self.requirements.values().filter(|r| r.needs_review()).count()
    }

    /// Review configs for every action-kind that pauses. This is what an
    /// agent is told to interrupt on.
    pub fn review_configs(&self) -> Vec<ReviewConfig> {
        self.iter()
            .filter(|(_, req)| req.needs_review())
            .map(|(kind, req)| ReviewConfig::new(kind.as_str(), req.allowed_decisions()))
            .collect()
    }
}
