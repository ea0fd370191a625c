//! Errors that end a review loop.
//!
//! Bad reviewer input never shows up here; it is handled inside the review
//! prompt. Running out of iterations is not an error either, see
//! `RunOutcome::Exhausted`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HitlError {
    /// The agent paused on an action it sent no review config for. The agent's
    /// interrupt settings and the policy have drifted apart.
    #[error("no review config for pending action '{action}'")]
    MissingReviewConfig { action: String },

    /// The review config for a pending action allows no decision at all.
    #[error("review config for '{action}' allows no decisions")]
    NoAllowedDecisions { action: String },

    /// The agent failed to start or resume.
    #[error("agent call failed on thread {thread_id}")]
    Agent {
        thread_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The review channel broke (e.g. terminal closed mid-write).
    #[error("review of '{action}' failed")]
    Review {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// The decision could not be written to the audit log.
    #[error("failed to record audit entry")]
    Audit(#[source] anyhow::Error),
}
