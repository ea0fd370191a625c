//! The agent contract the review loop drives.
//!
//! The agent is opaque: it decides what to do, keeps its own per-thread state,
//! and either finishes or pauses with a batch of actions that need review.

use crate::review::types::{ActionRequest, ReviewConfig, ReviewDecision};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat message exchanged with the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call configuration. The thread id scopes the agent's state; a resume
/// must reuse the id of the run it continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub thread_id: String,
}

impl RunConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}

/// What the agent is waiting on when it pauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingReview {
    pub action_requests: Vec<ActionRequest>,
    #[serde(default)]
    pub review_configs: Vec<ReviewConfig>,
}

/// One pause signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    pub value: PendingReview,
}

/// Result of an invoke or resume call.
///
/// Finished runs carry messages and no interrupt. Paused runs carry at least
/// one interrupt; only the first is acted on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interrupt: Vec<Interrupt>,
}

impl AgentResult {
    pub fn finished(messages: Vec<Message>) -> Self {
        Self {
            messages,
            interrupt: Vec::new(),
        }
    }

    pub fn paused(pending: PendingReview) -> Self {
        Self {
            messages: Vec::new(),
            interrupt: vec![Interrupt { value: pending }],
        }
    }

    /// The batch awaiting review, if the agent paused.
    pub fn pending(&self) -> Option<&PendingReview> {
        self.interrupt.first().map(|i| &i.value)
    }

    pub fn is_paused(&self) -> bool {
        !self.interrupt.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// An agent that can be started and resumed after review.
#[async_trait]
pub trait Agent {
    /// Start (or restart) a run on a thread.
    async fn invoke(&self, messages: Vec<Message>, config: &RunConfig) -> Result<AgentResult>;

    /// Continue a paused run with one decision per pending action, in the
    /// order the actions were listed.
    async fn resume(&self, decisions: Vec<ReviewDecision>, config: &RunConfig) -> Result<AgentResult>;
}
