//! A deterministic agent that replays a scenario file.
//!
//! Stands in for a real planner in demos and tests. Each step either proposes
//! a batch of actions or ends the run with a message. Actions the agent was
//! told to interrupt on pause the run; everything else is executed straight
//! away.

use crate::hitl::agent::{Agent, AgentResult, Message, PendingReview, RunConfig};
use crate::policy::types::ApprovalPolicy;
use crate::review::types::{ActionRequest, ReviewConfig, ReviewDecision};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;

/// A scripted run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    /// Propose these actions (in order) as one batch.
    Actions { actions: Vec<ActionRequest> },
    /// Finish with this assistant message.
    Message { message: String },
}

impl Scenario {
    /// Load a scenario from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse scenario: {}", path.display()))
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse scenario: {}", path.display()))
        }
    }

    /// Total number of actions the scenario proposes.
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .map(|s| match s {
                ScenarioStep::Actions { actions } => actions.len(),
                ScenarioStep::Message { .. } => 0,
            })
            .sum()
    }
}

/// Per-thread progress through the script.
#[derive(Debug, Default)]
struct ThreadState {
    cursor: usize,
    pending: Vec<ActionRequest>,
    executed: Vec<ActionRequest>,
    rejected: Vec<ActionRequest>,
    transcript: Vec<Message>,
}

pub struct ScriptedAgent {
    scenario: Scenario,
    interrupt_on: Vec<ReviewConfig>,
    threads: Mutex<HashMap<String, ThreadState>>,
}

impl ScriptedAgent {
    /// Agent that interrupts on whatever `policy` says needs review.
    pub fn new(scenario: Scenario, policy: &ApprovalPolicy) -> Self {
        Self::with_interrupt_configs(scenario, policy.review_configs())
    }

    /// Agent with explicit interrupt settings.
    pub fn with_interrupt_configs(scenario: Scenario, interrupt_on: Vec<ReviewConfig>) -> Self {
        Self {
            scenario,
            interrupt_on,
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// Actions executed so far on a thread, with edits applied.
    pub async fn executed(&self, thread_id: &str) -> Vec<ActionRequest> {
        let threads = self.threads.lock().await;
        threads
            .get(thread_id)
            .map(|s| s.executed.clone())
            .unwrap_or_default()
    }

    /// Actions the reviewer rejected on a thread.
    pub async fn rejected(&self, thread_id: &str) -> Vec<ActionRequest> {
        let threads = self.threads.lock().await;
        threads
            .get(thread_id)
            .map(|s| s.rejected.clone())
            .unwrap_or_default()
    }

    fn interrupts_on(&self, name: &str) -> bool {
        self.interrupt_on.iter().any(|c| c.action_name == name)
    }

    /// Run steps until something needs review or the script ends.
    fn advance(&self, state: &mut ThreadState) -> AgentResult {
        while let Some(step) = self.scenario.steps.get(state.cursor) {
            state.cursor += 1;
            match step {
                ScenarioStep::Message { message } => {
                    state.transcript.push(Message::assistant(message.clone()));
                    return self.finish(state);
                }
                ScenarioStep::Actions { actions } => {
                    let (review, auto): (Vec<_>, Vec<_>) =
                        actions.iter().cloned().partition(|a| self.interrupts_on(&a.name));

                    for action in auto {
                        tracing::debug!("Executing {} without review", action.name);
                        state.executed.push(action);
                    }

                    if !review.is_empty() {
                        let review_configs = self
                            .interrupt_on
                            .iter()
                            .filter(|c| review.iter().any(|a| a.name == c.action_name))
                            .cloned()
                            .collect();
                        state.pending = review.clone();
                        return AgentResult::paused(PendingReview {
                            action_requests: review,
                            review_configs,
                        });
                    }
                }
            }
        }
        self.finish(state)
    }

    fn finish(&self, state: &mut ThreadState) -> AgentResult {
        state
            .transcript
            .push(Message::assistant(summary(&state.executed, &state.rejected)));
        AgentResult::finished(state.transcript.clone())
    }
}

fn summary(executed: &[ActionRequest], rejected: &[ActionRequest]) -> String {
    let names = |actions: &[ActionRequest]| {
        actions
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut text = format!("Executed {} action(s)", executed.len());
    if !executed.is_empty() {
        text.push_str(&format!(": {}", names(executed)));
    }
    text.push_str(&format!(". Rejected {}", rejected.len()));
    if !rejected.is_empty() {
        text.push_str(&format!(": {}", names(rejected)));
    }
    text.push('.');
    text
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn invoke(&self, messages: Vec<Message>, config: &RunConfig) -> Result<AgentResult> {
        let mut threads = self.threads.lock().await;
        let state = threads.entry(config.thread_id.clone()).or_default();
        *state = ThreadState {
            transcript: messages,
            ..Default::default()
        };
        Ok(self.advance(state))
    }

    async fn resume(&self, decisions: Vec<ReviewDecision>, config: &RunConfig) -> Result<AgentResult> {
        let mut threads = self.threads.lock().await;
        let Some(state) = threads.get_mut(&config.thread_id) else {
            bail!("No run in progress on thread {}", config.thread_id);
        };

        if state.pending.is_empty() {
            bail!("Thread {} is not waiting for review", config.thread_id);
        }
        if decisions.len() != state.pending.len() {
            bail!(
                "Expected {} decision(s) on thread {}, got {}",
                state.pending.len(),
                config.thread_id,
                decisions.len()
            );
        }

        let pending = std::mem::take(&mut state.pending);
        for (action, decision) in pending.into_iter().zip(decisions) {
            match decision {
                ReviewDecision::Approve => state.executed.push(action),
                ReviewDecision::Edit { edited_action } => state.executed.push(edited_action),
                ReviewDecision::Reject => state.rejected.push(action),
            }
        }

        Ok(self.advance(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario() -> Scenario {
        serde_yaml::from_str(
            r##"
steps:
  - actions:
      - name: write_todos
        args: {todos: [{task: Review contracts}]}
      - name: get_document
        args: {doc_id: doc_001}
  - actions:
      - name: write_file
        args: {file_path: report.md, content: "# Report"}
  - message: All done
"##,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_scenario_steps() {
        let s = scenario();
        assert_eq!(s.steps.len(), 3);
        assert_eq!(s.action_count(), 3);
        assert!(matches!(s.steps[2], ScenarioStep::Message { .. }));
    }

    #[tokio::test]
    async fn test_skips_review_for_unreviewed_actions() {
        let agent = ScriptedAgent::new(scenario(), &ApprovalPolicy::moderate_oversight());
        let config = RunConfig::new("t");

        let result = agent.invoke(vec![Message::user("go")], &config).await.unwrap();
        let pending = result.pending().unwrap();
        // get_document runs unreviewed under moderate oversight.
        assert_eq!(pending.action_requests.len(), 1);
        assert_eq!(pending.action_requests[0].name, "write_todos");
        assert_eq!(pending.review_configs.len(), 1);
        assert_eq!(agent.executed("t").await[0].name, "get_document");
    }

    #[tokio::test]
    async fn test_resume_applies_decisions() {
        let agent = ScriptedAgent::new(scenario(), &ApprovalPolicy::high_oversight());
        let config = RunConfig::new("t");

        let result = agent.invoke(vec![Message::user("go")], &config).await.unwrap();
        assert_eq!(result.pending().unwrap().action_requests.len(), 2);

        let edited = ActionRequest::new("write_todos", json!({"todos": []}));
        let result = agent
            .resume(vec![ReviewDecision::edit(edited.clone()), ReviewDecision::Reject], &config)
            .await
            .unwrap();
        assert_eq!(result.pending().unwrap().action_requests[0].name, "write_file");

        let result = agent.resume(vec![ReviewDecision::Approve], &config).await.unwrap();
        assert!(!result.is_paused());
        let last = result.last_message().unwrap();
        assert!(last.content.contains("Executed 2 action(s)"));
        assert!(last.content.contains("Rejected 1: get_document"));
        assert_eq!(agent.executed("t").await[0], edited);
        assert_eq!(agent.rejected("t").await.len(), 1);
    }

    #[tokio::test]
    async fn test_resume_rejects_wrong_decision_count() {
        let agent = ScriptedAgent::new(scenario(), &ApprovalPolicy::high_oversight());
        let config = RunConfig::new("t");
        agent.invoke(vec![Message::user("go")], &config).await.unwrap();

        let err = agent.resume(vec![ReviewDecision::Approve], &config).await.unwrap_err();
        assert!(err.to_string().contains("Expected 2 decision(s)"));
    }

    #[tokio::test]
    async fn test_resume_without_pause_is_error() {
        let agent = ScriptedAgent::new(scenario(), &ApprovalPolicy::high_oversight());
        let err = agent
            .resume(vec![], &RunConfig::new("nowhere"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No run in progress"));
    }

    #[tokio::test]
    async fn test_threads_are_independent() {
        let agent = ScriptedAgent::new(scenario(), &ApprovalPolicy::minimal_oversight());
        let a = RunConfig::new("a");
        let b = RunConfig::new("b");

        agent.invoke(vec![Message::user("go")], &a).await.unwrap();
        let result = agent.invoke(vec![Message::user("go")], &b).await.unwrap();
        assert_eq!(result.pending().unwrap().action_requests[0].name, "write_file");
        assert_eq!(agent.executed("a").await.len(), 2);
        assert_eq!(agent.executed("b").await.len(), 2);
    }
}
