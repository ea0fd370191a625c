//! The review loop.
//!
//! Invoke the agent, and while it comes back paused: ask the reviewer about
//! each pending action in order, record each decision, resume the agent on
//! the same thread with the ordered decisions. Stops when the agent finishes
//! or after `max_iterations` pauses.

use crate::audit::{AuditTrail, ReviewStats};
use crate::hitl::agent::{Agent, AgentResult, Message, PendingReview, RunConfig};
use crate::hitl::error::HitlError;
use crate::policy::types::ApprovalPolicy;
use crate::review::types::{ReviewConfig, ReviewContext, ReviewDecision};
use crate::review::ReviewDecisionSource;
use std::collections::HashMap;
use std::sync::Arc;

/// Reviewer name recorded when none is configured.
pub const DEFAULT_REVIEWER: &str = "human";

/// Iteration ceiling used when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The agent finished; the result carries no interrupt.
    Completed { result: AgentResult, iterations: usize },
    /// The iteration ceiling was hit; the result is still paused.
    Exhausted { result: AgentResult, iterations: usize },
}

impl RunOutcome {
    pub fn result(&self) -> &AgentResult {
        match self {
            RunOutcome::Completed { result, .. } | RunOutcome::Exhausted { result, .. } => result,
        }
    }

    /// Number of pauses that were reviewed.
    pub fn iterations(&self) -> usize {
        match self {
            RunOutcome::Completed { iterations, .. } | RunOutcome::Exhausted { iterations, .. } => *iterations,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RunOutcome::Exhausted { .. })
    }
}

/// An agent wired up with a policy, a reviewer and an optional audit trail.
pub struct HitlSession<A> {
    agent: A,
    policy: ApprovalPolicy,
    reviewer: Arc<dyn ReviewDecisionSource + Send + Sync>,
    reviewer_name: String,
    audit: Option<AuditTrail>,
}

impl<A: Agent + Send + Sync> HitlSession<A> {
    /// New session with high oversight, reviewer "human" and no audit trail.
    pub fn new(agent: A, reviewer: Arc<dyn ReviewDecisionSource + Send + Sync>) -> Self {
        Self {
            agent,
            policy: ApprovalPolicy::high_oversight(),
            reviewer,
            reviewer_name: DEFAULT_REVIEWER.to_string(),
            audit: None,
        }
    }

    pub fn with_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_reviewer_name(mut self, name: impl Into<String>) -> Self {
        self.reviewer_name = name.into();
        self
    }

    pub fn with_audit(mut self, trail: AuditTrail) -> Self {
        self.audit = Some(trail);
        self
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    pub fn reviewer_name(&self) -> &str {
        &self.reviewer_name
    }

    pub fn audit(&self) -> Option<&AuditTrail> {
        self.audit.as_ref()
    }

    /// Review configs the agent should interrupt on under this session's policy.
    pub fn interrupt_configs(&self) -> Vec<ReviewConfig> {
        self.policy.review_configs()
    }

    /// Stats over the audit trail, if one is configured.
    pub fn stats(&self) -> anyhow::Result<Option<ReviewStats>> {
        self.audit.as_ref().map(|a| a.stats()).transpose()
    }

    /// Run one request to completion (or to the iteration ceiling).
    pub async fn run(
        &self,
        user_message: &str,
        thread_id: &str,
        max_iterations: usize,
    ) -> Result<RunOutcome, HitlError> {
        let config = RunConfig::new(thread_id);
        let agent_error = |source| HitlError::Agent {
            thread_id: thread_id.to_string(),
            source,
        };

        let mut result = self
            .agent
            .invoke(vec![Message::user(user_message)], &config)
            .await
            .map_err(agent_error)?;
        let mut iteration = 0;

        loop {
            if !result.is_paused() {
                tracing::info!("Thread {} completed after {} review round(s)", thread_id, iteration);
                return Ok(RunOutcome::Completed {
                    result,
                    iterations: iteration,
                });
            }

            if iteration >= max_iterations {
                let still_pending = result.pending().map_or(0, |p| p.action_requests.len());
                tracing::warn!(
                    "Reached maximum iterations ({}) on thread {} with {} action(s) still pending",
                    max_iterations,
                    thread_id,
                    still_pending
                );
                return Ok(RunOutcome::Exhausted {
                    result,
                    iterations: iteration,
                });
            }

            iteration += 1;
            let decisions = match result.pending() {
                Some(pending) => {
                    tracing::info!(
                        "Interrupt {}/{} on thread {}: {} action(s) pending",
                        iteration,
                        max_iterations,
                        thread_id,
                        pending.action_requests.len()
                    );
                    self.collect_decisions(pending, iteration, thread_id).await?
                }
                None => Vec::new(),
            };

            result = self
                .agent
                .resume(decisions, &config)
                .await
                .map_err(agent_error)?;
        }
    }

    /// One decision per pending action, in the order the agent listed them.
    async fn collect_decisions(
        &self,
        pending: &PendingReview,
        iteration: usize,
        thread_id: &str,
    ) -> Result<Vec<ReviewDecision>, HitlError> {
        let configs: HashMap<&str, &ReviewConfig> = pending
            .review_configs
            .iter()
            .map(|c| (c.action_name.as_str(), c))
            .collect();

        // Check the whole batch before asking anyone anything.
        let mut requirements = Vec::with_capacity(pending.action_requests.len());
        for action in &pending.action_requests {
            let config = configs
                .get(action.name.as_str())
                .ok_or_else(|| HitlError::MissingReviewConfig {
                    action: action.name.clone(),
                })?;
            let requirement = config
                .requirement()
                .ok_or_else(|| HitlError::NoAllowedDecisions {
                    action: action.name.clone(),
                })?;
            requirements.push(requirement);
        }

        let mut decisions = Vec::with_capacity(pending.action_requests.len());
        for (action, requirement) in pending.action_requests.iter().zip(&requirements) {
            let context = ReviewContext::for_iteration(iteration, thread_id);

            let decision = self
                .reviewer
                .review(action, requirement, Some(&context))
                .await
                .map_err(|source| HitlError::Review {
                    action: action.name.clone(),
                    source,
                })?;

            tracing::debug!(
                "Thread {}: {} -> {} ({})",
                thread_id,
                action.name,
                decision.kind(),
                self.reviewer_name
            );

            if let Some(ref audit) = self.audit {
                audit
                    .log(action, &decision, &self.reviewer_name, thread_id, Some(&context))
                    .map_err(HitlError::Audit)?;
            }

            decisions.push(decision);
        }

        Ok(decisions)
    }
}
