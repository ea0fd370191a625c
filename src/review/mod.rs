pub mod edit;
pub mod terminal;
pub mod types;

use crate::policy::types::ApprovalRequirement;
use anyhow::Result;
use async_trait::async_trait;

pub use terminal::{AutoApprove, AutoReject, InteractiveReview, PromptOptions, TerminalPrompt};
pub use types::*;

/// Source of review decisions.
/// Implementations can be terminal-based, auto-approve, auto-reject, etc.
///
/// Every call yields exactly one decision. Bad human input is handled inside
/// the implementation; an `Err` means the review channel itself broke.
#[async_trait]
pub trait ReviewDecisionSource {
    async fn review(
        &self,
        action: &ActionRequest,
        requirement: &ApprovalRequirement,
        context: Option<&ReviewContext>,
    ) -> Result<ReviewDecision>;
}
