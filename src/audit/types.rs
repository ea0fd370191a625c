//! Types for the review audit log.
//!
//! Every decision a reviewer makes gets one entry, approved, edited or
//! rejected. The log is the source of truth; statistics are recomputed from it.

use crate::policy::types::DecisionKind;
use crate::review::types::ReviewContext;
use chrono::{DateTime, NaiveDateTime, Utc};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single entry in the audit log.
/// One entry per review decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the decision was made. Older logs without an offset read as UTC.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Conversation the action belongs to
    pub thread_id: String,

    /// Who decided (e.g. "human", "legal_team_member", "auto_approve_system")
    pub reviewer: String,

    /// Tool the agent wanted to call
    pub action_tool: String,

    /// Arguments as the agent proposed them
    pub action_args: Value,

    /// What the reviewer decided
    pub decision_type: DecisionKind,

    /// For edits: the arguments that replaced the proposal
    pub edited_args: Option<Value>,

    /// Stage and thread the decision was made in
    pub context: Option<ReviewContext>,
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Aggregate counts over an audit log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub by_decision: BTreeMap<String, usize>,
    pub by_tool: BTreeMap<String, usize>,
    pub by_reviewer: BTreeMap<String, usize>,
}

impl ReviewStats {
    /// Stats for a log that exists. Decision buckets are always present,
    /// even at zero.
    pub fn seeded() -> Self {
        Self {
            by_decision: DecisionKind::ALL
                .iter()
                .map(|d| (d.as_str().to_string(), 0))
                .collect(),
            ..Default::default()
        }
    }

    /// True for a log that has never been written.
    pub fn is_empty(&self) -> bool {
        self.total_reviews == 0
            && self.by_decision.is_empty()
            && self.by_tool.is_empty()
            && self.by_reviewer.is_empty()
    }

    /// Fold one entry into the counts.
    pub fn record(&mut self, entry: &AuditEntry) {
        self.total_reviews += 1;
        *self
            .by_decision
            .entry(entry.decision_type.as_str().to_string())
            .or_insert(0) += 1;
        *self.by_tool.entry(entry.action_tool.clone()).or_insert(0) += 1;
        *self.by_reviewer.entry(entry.reviewer.clone()).or_insert(0) += 1;
    }

    pub fn count(&self, decision: DecisionKind) -> usize {
        self.by_decision.get(decision.as_str()).copied().unwrap_or(0)
    }

    /// Format as a human-readable one-liner for terminal output.
    pub fn one_line(&self) -> String {
        format!(
            "{} reviews | {} approved | {} edited | {} rejected",
            self.total_reviews,
            self.count(DecisionKind::Approve),
            self.count(DecisionKind::Edit),
            self.count(DecisionKind::Reject)
        )
    }
}

/// Filter criteria for querying the audit log.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub thread_id: Option<String>,
    pub decision: Option<DecisionKind>,
    pub tool: Option<GlobMatcher>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Restrict to tools matching a glob such as `get_document*`.
    pub fn with_tool_pattern(mut self, pattern: &str) -> Result<Self, globset::Error> {
        self.tool = Some(Glob::new(pattern)?.compile_matcher());
        Ok(self)
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref thread) = self.thread_id {
            if entry.thread_id != *thread {
                return false;
            }
        }
        if let Some(decision) = self.decision {
            if entry.decision_type != decision {
                return false;
            }
        }
        if let Some(ref tool) = self.tool {
            if !tool.is_match(&entry.action_tool) {
                return false;
            }
        }
        true
    }
}
