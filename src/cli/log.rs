//! `hitlctl log`: browse recorded review decisions.

use crate::audit::reader::{filter_entries, format_entry, summarize};
use crate::audit::{AuditFilter, AuditTrail};
use crate::cli::load_config;
use crate::policy::DecisionKind;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub audit_log: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub thread: Option<String>,
    /// approve, edit or reject (loose spelling accepted)
    pub decision: Option<String>,
    /// Glob over tool names, e.g. `get_document*`
    pub tool: Option<String>,
    pub limit: Option<usize>,
}

/// Run the `hitlctl log` command.
pub fn run_log(options: LogOptions) -> Result<()> {
    let path = match options.audit_log {
        Some(ref p) => p.clone(),
        None => load_config(options.config.as_deref())?.audit_log,
    };
    let trail = AuditTrail::open(&path);

    let mut filter = AuditFilter {
        thread_id: options.thread.clone(),
        decision: match options.decision {
            Some(ref d) => Some(
                DecisionKind::from_str_loose(d)
                    .with_context(|| format!("Unknown decision '{}' (expected approve, edit or reject)", d))?,
            ),
            None => None,
        },
        limit: options.limit,
        ..Default::default()
    };
    if let Some(ref pattern) = options.tool {
        filter = filter
            .with_tool_pattern(pattern)
            .with_context(|| format!("Invalid tool pattern: {}", pattern))?;
    }

    let entries = trail.entries()?;
    if entries.is_empty() {
        print_empty(&path);
        return Ok(());
    }

    let shown = filter_entries(&entries, &filter);
    println!();
    for entry in &shown {
        println!("  {}", format_entry(entry));
    }

    let stats = summarize(&entries);
    println!();
    println!(
        "  {} showing {} of {} | {}",
        "─".repeat(20).dimmed(),
        shown.len(),
        entries.len(),
        stats.one_line().dimmed()
    );
    println!();

    Ok(())
}

fn print_empty(path: &Path) {
    println!();
    println!("  {} No reviews recorded in {}", "ℹ".blue(), path.display());
    println!("  Run a scenario first:");
    println!("    {}", "hitlctl run --scenario <file>".dimmed());
    println!();
}
