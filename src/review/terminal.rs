//! Terminal-based review prompt.
//!
//! Shows what the agent wants to do, which decisions are allowed, and reads
//! the reviewer's choice from a numbered menu. Editing dispatches to the
//! per-tool flows in `edit.rs`.
//!
//! The prompt itself is plain blocking I/O over any `BufRead`/`Write` pair so
//! it can be driven by scripted input in tests. `InteractiveReview` runs it
//! against stdin/stdout on a blocking thread.

use crate::policy::types::{ApprovalRequirement, DecisionKind};
use crate::review::types::{ActionRequest, ReviewContext, ReviewDecision};
use crate::review::ReviewDecisionSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, BufRead, Write};

const BOX_WIDTH: usize = 58;

/// Subagents offered when re-targeting a delegated task.
pub const DEFAULT_SUBAGENTS: [&str; 4] = [
    "legal-analyzer",
    "report-creator",
    "dashboard-creator",
    "general-purpose",
];

/// Knobs for the interactive edit flows.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    /// Command used to edit file content (`$EDITOR`, falls back to nano)
    pub editor: String,
    /// Subagent names listed when changing a task's target
    pub subagents: Vec<String>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            editor: std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string()),
            subagents: DEFAULT_SUBAGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A review prompt bound to an input and an output stream.
pub struct TerminalPrompt<R, W> {
    pub(crate) input: R,
    pub(crate) output: W,
    pub(crate) options: PromptOptions,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_options(input, output, PromptOptions::default())
    }

    pub fn with_options(input: R, output: W, options: PromptOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    /// Present one action and return the reviewer's decision.
    ///
    /// Invalid menu choices re-prompt. End of input counts as a rejection.
    pub fn review(
        &mut self,
        action: &ActionRequest,
        requirement: &ApprovalRequirement,
        context: Option<&ReviewContext>,
    ) -> io::Result<ReviewDecision> {
        if requirement.is_unsatisfiable() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no decision is allowed for '{}'", action.name),
            ));
        }
        self.render_request(action, context)?;

        // NoReview actions should never reach a human; if one does, offer everything.
        let allowed = match requirement {
            ApprovalRequirement::NoReview => DecisionKind::ALL.to_vec(),
            other => other.allowed_decisions(),
        };
        self.render_options(&allowed)?;

        let numbers: Vec<&str> = allowed.iter().map(|d| menu_number(*d)).collect();
        loop {
            let Some(choice) = self.ask(&format!("\nYour decision ({}): ", numbers.join("/")))? else {
                self.error("No input, rejecting action")?;
                return Ok(ReviewDecision::Reject);
            };

            match parse_choice(&choice) {
                Some(DecisionKind::Approve) if allowed.contains(&DecisionKind::Approve) => {
                    self.success("Action approved")?;
                    return Ok(ReviewDecision::Approve);
                }
                Some(DecisionKind::Edit) if allowed.contains(&DecisionKind::Edit) => {
                    return self.edit(action);
                }
                Some(DecisionKind::Reject) if allowed.contains(&DecisionKind::Reject) => {
                    self.error("Action rejected")?;
                    return Ok(ReviewDecision::Reject);
                }
                _ => {
                    self.error(&format!(
                        "Invalid choice. Please enter one of: {}",
                        numbers.join(", ")
                    ))?;
                }
            }
        }
    }

    fn render_request(&mut self, action: &ActionRequest, context: Option<&ReviewContext>) -> io::Result<()> {
        let bar = "═".repeat(BOX_WIDTH);
        queue!(
            self.output,
            Print("\n"),
            SetForegroundColor(Color::Yellow),
            Print(format!("╔{}╗\n", bar)),
            Print(format!("║{:^width$}║\n", "HUMAN REVIEW REQUIRED", width = BOX_WIDTH)),
            Print(format!("╚{}╝\n", bar)),
            ResetColor,
            SetAttribute(Attribute::Bold),
            Print(format!("\n  Tool: {}\n", action.name)),
            SetAttribute(Attribute::Reset),
        )?;

        if let Some(ctx) = context {
            queue!(self.output, Print("\n  Context:\n"))?;
            if let Some(ref stage) = ctx.stage {
                queue!(self.output, Print(format!("    Analysis stage:     {}\n", stage)))?;
            }
            if !ctx.documents_accessed.is_empty() {
                queue!(
                    self.output,
                    Print(format!(
                        "    Documents accessed: {}\n",
                        ctx.documents_accessed.len()
                    ))
                )?;
            }
        }

        queue!(
            self.output,
            Print("\n  Proposed action:\n"),
            SetForegroundColor(Color::DarkGrey),
            Print(indent(&pretty_json(&action.args), 4)),
            Print("\n"),
            ResetColor,
        )?;
        self.output.flush()
    }

    fn render_options(&mut self, allowed: &[DecisionKind]) -> io::Result<()> {
        let names: Vec<&str> = allowed.iter().map(|d| d.as_str()).collect();
        queue!(
            self.output,
            Print(format!("\n  Allowed decisions: {}\n", names.join(", "))),
            Print(format!("  {}\n", "─".repeat(BOX_WIDTH))),
            Print("  Options:\n"),
        )?;
        for decision in allowed {
            let (color, label) = match decision {
                DecisionKind::Approve => (Color::Green, "APPROVE - Execute as proposed"),
                DecisionKind::Edit => (Color::Blue, "EDIT    - Modify before execution"),
                DecisionKind::Reject => (Color::Red, "REJECT  - Skip this action"),
            };
            queue!(
                self.output,
                SetForegroundColor(color),
                Print(format!("    [{}] {}\n", menu_number(*decision), label)),
                ResetColor,
            )?;
        }
        self.output.flush()
    }

    /// Print a prompt and read one line. `None` at end of input.
    pub(crate) fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        queue!(self.output, Print(prompt))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Read everything left on the input.
    pub(crate) fn read_remaining(&mut self) -> io::Result<String> {
        let mut buf = String::new();
        self.input.read_to_string(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn line(&mut self, text: &str) -> io::Result<()> {
        queue!(self.output, Print(text), Print("\n"))?;
        self.output.flush()
    }

    pub(crate) fn section(&mut self, title: &str) -> io::Result<()> {
        queue!(
            self.output,
            Print("\n"),
            SetForegroundColor(Color::Cyan),
            Print(format!("{}\n", "=".repeat(BOX_WIDTH))),
            Print(format!("  {}\n", title)),
            Print(format!("{}\n", "=".repeat(BOX_WIDTH))),
            ResetColor,
        )?;
        self.output.flush()
    }

    pub(crate) fn menu(&mut self, title: &str, entries: &[&str]) -> io::Result<()> {
        queue!(
            self.output,
            Print(format!("\n  {}\n", "─".repeat(BOX_WIDTH))),
            Print(format!("  {}\n", title)),
        )?;
        for (i, entry) in entries.iter().enumerate() {
            queue!(self.output, Print(format!("    [{}] {}\n", i + 1, entry)))?;
        }
        self.output.flush()
    }

    pub(crate) fn success(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.output,
            SetForegroundColor(Color::Green),
            Print(format!("\n  ✓ {}\n", text)),
            ResetColor,
        )?;
        self.output.flush()
    }

    pub(crate) fn error(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.output,
            SetForegroundColor(Color::Red),
            Print(format!("  ✗ {}\n", text)),
            ResetColor,
        )?;
        self.output.flush()
    }
}

/// Menu numbers are fixed per decision so muscle memory survives
/// restricted menus.
fn menu_number(decision: DecisionKind) -> &'static str {
    match decision {
        DecisionKind::Approve => "1",
        DecisionKind::Edit => "2",
        DecisionKind::Reject => "3",
    }
}

fn parse_choice(input: &str) -> Option<DecisionKind> {
    match input.trim().to_lowercase().as_str() {
        "1" | "a" => Some(DecisionKind::Approve),
        "2" | "e" => Some(DecisionKind::Edit),
        "3" | "r" => Some(DecisionKind::Reject),
        other => DecisionKind::from_str_loose(other),
    }
}

pub(crate) fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interactive reviewer on the process's terminal.
/// Blocks until the human answers; there is no timeout.
pub struct InteractiveReview {
    options: PromptOptions,
}

impl InteractiveReview {
    pub fn new() -> Self {
        Self {
            options: PromptOptions::default(),
        }
    }

    pub fn with_options(options: PromptOptions) -> Self {
        Self { options }
    }
}

impl Default for InteractiveReview {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewDecisionSource for InteractiveReview {
    async fn review(
        &self,
        action: &ActionRequest,
        requirement: &ApprovalRequirement,
        context: Option<&ReviewContext>,
    ) -> Result<ReviewDecision> {
        // Terminal I/O is synchronous, keep it off the async workers.
        let action = action.clone();
        let requirement = requirement.clone();
        let context = context.cloned();
        let options = self.options.clone();

        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut prompt = TerminalPrompt::with_options(stdin.lock(), io::stdout(), options);
            prompt
                .review(&action, &requirement, context.as_ref())
                .context("Terminal review failed")
        })
        .await?
    }
}

/// Auto-approve reviewer (for testing and trusted automation).
/// Approves everything without prompting.
pub struct AutoApprove {
    log_actions: bool,
}

impl AutoApprove {
    pub fn new() -> Self {
        Self { log_actions: true }
    }

    /// Approve without printing anything.
    pub fn quiet() -> Self {
        Self { log_actions: false }
    }
}

impl Default for AutoApprove {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewDecisionSource for AutoApprove {
    async fn review(
        &self,
        action: &ActionRequest,
        _requirement: &ApprovalRequirement,
        _context: Option<&ReviewContext>,
    ) -> Result<ReviewDecision> {
        if self.log_actions {
            println!("[AUTO-APPROVED] {}", action.name);
        }
        Ok(ReviewDecision::Approve)
    }
}

/// Auto-reject reviewer (for strict unattended runs).
/// Rejects everything that reaches review.
pub struct AutoReject {
    log_actions: bool,
}

impl AutoReject {
    pub fn new() -> Self {
        Self { log_actions: true }
    }

    pub fn quiet() -> Self {
        Self { log_actions: false }
    }
}

impl Default for AutoReject {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewDecisionSource for AutoReject {
    async fn review(
        &self,
        action: &ActionRequest,
        _requirement: &ApprovalRequirement,
        _context: Option<&ReviewContext>,
    ) -> Result<ReviewDecision> {
        if self.log_actions {
            println!("[AUTO-REJECTED] {}", action.name);
        }
        Ok(ReviewDecision::Reject)
    }
}
