pub mod agent;
pub mod error;
pub mod runner;
pub mod scripted;

pub use agent::{Agent, AgentResult, Interrupt, Message, PendingReview, RunConfig};
pub use error::HitlError;
pub use runner::{HitlSession, RunOutcome, DEFAULT_MAX_ITERATIONS, DEFAULT_REVIEWER};
pub use scripted::{Scenario, ScenarioStep, ScriptedAgent};
