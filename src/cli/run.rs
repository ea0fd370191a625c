//! `hitlctl run`: drive a scripted agent through the review loop.
//!
//! 1. Load config and resolve the approval policy
//! 2. Pick the reviewer (terminal, auto-approve, auto-reject)
//! 3. Open the audit trail unless disabled
//! 4. Run the loop until the agent finishes or the iteration ceiling is hit
//! 5. Print the agent's last message and the review summary

use crate::cli::load_config;
use crate::hitl::{HitlSession, RunOutcome, Scenario, ScriptedAgent};
use crate::policy::OversightLevel;
use crate::review::{AutoApprove, AutoReject, InteractiveReview, ReviewDecisionSource};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Options for the `hitlctl run` command. `None` falls back to the config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Scenario file the scripted agent replays
    pub scenario: PathBuf,
    /// Opening user message
    pub message: String,
    /// Thread ID override (default: fresh UUID)
    pub thread_id: Option<String>,
    /// Oversight level override
    pub level: Option<String>,
    /// Reviewer: "terminal", "auto-approve", "auto-reject"
    pub approval_mode: String,
    pub reviewer: Option<String>,
    pub audit_log: Option<PathBuf>,
    pub no_audit: bool,
    pub max_iterations: Option<usize>,
    pub config: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("scenario.yaml"),
            message: "Run the scenario".to_string(),
            thread_id: None,
            level: None,
            approval_mode: "terminal".to_string(),
            reviewer: None,
            audit_log: None,
            no_audit: false,
            max_iterations: None,
            config: None,
        }
    }
}

/// Run the `hitlctl run` command.
pub async fn run_scenario(options: RunOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(ref path) = options.audit_log {
        config.audit_log = path.clone();
    }
    if options.no_audit {
        config.audit = false;
    }

    let policy = match options.level {
        Some(ref name) => match OversightLevel::from_str_loose(name) {
            Some(level) => level.policy(),
            None => bail!("Unknown oversight level '{}' (expected high, moderate or minimal)", name),
        },
        None => config.policy()?,
    };

    let reviewer: Arc<dyn ReviewDecisionSource + Send + Sync> = match options.approval_mode.as_str() {
        "terminal" | "interactive" => Arc::new(InteractiveReview::with_options(config.prompt_options())),
        "auto-approve" | "auto" => Arc::new(AutoApprove::new()),
        "auto-reject" | "reject" => Arc::new(AutoReject::new()),
        other => bail!(
            "Unknown approval mode '{}' (expected terminal, auto-approve or auto-reject)",
            other
        ),
    };
    let reviewer_name = options
        .reviewer
        .clone()
        .unwrap_or_else(|| match options.approval_mode.as_str() {
            "auto-approve" | "auto" => "auto_approve_system".to_string(),
            "auto-reject" | "reject" => "auto_reject_system".to_string(),
            _ => config.reviewer.clone(),
        });

    let scenario = Scenario::load(&options.scenario)?;
    let thread_id = options
        .thread_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let max_iterations = options.max_iterations.unwrap_or(config.max_iterations);

    println!();
    println!("  {} hitlctl v{}", "⚖".to_string().bold(), env!("CARGO_PKG_VERSION"));
    println!("  Thread:    {}", thread_id.cyan());
    println!(
        "  Scenario:  {} ({} steps, {} actions)",
        options.scenario.display().to_string().cyan(),
        scenario.steps.len(),
        scenario.action_count()
    );
    println!(
        "  Oversight: {} of {} actions reviewed",
        policy.reviewed_count(),
        policy.kinds().count()
    );
    println!("  Reviewer:  {} ({})", reviewer_name, options.approval_mode);

    let agent = ScriptedAgent::new(scenario, &policy);
    let mut session = HitlSession::new(agent, reviewer)
        .with_policy(policy)
        .with_reviewer_name(reviewer_name);

    match config.audit_trail()? {
        Some(trail) => {
            println!("  Log:       {}", trail.log_path().display().to_string().dimmed());
            session = session.with_audit(trail);
        }
        None => println!("  Log:       {}", "disabled".dimmed()),
    }
    println!();

    let outcome = session.run(&options.message, &thread_id, max_iterations).await?;

    println!();
    match outcome {
        RunOutcome::Completed { ref result, iterations } => {
            println!(
                "  {} Completed after {} review round(s)",
                "✓".green().bold(),
                iterations
            );
            if let Some(message) = result.last_message() {
                println!("  {}", message.content);
            }
        }
        RunOutcome::Exhausted { ref result, iterations } => {
            let pending = result.pending().map_or(0, |p| p.action_requests.len());
            println!(
                "  {} Stopped after {} review round(s), {} action(s) still pending",
                "⚠".yellow().bold(),
                iterations,
                pending
            );
        }
    }

    if let Some(stats) = session.stats()? {
        println!();
        println!("  {} {}", "─".repeat(40).dimmed(), stats.one_line().dimmed());
    }
    println!();

    Ok(())
}
