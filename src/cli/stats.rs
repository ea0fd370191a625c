//! `hitlctl stats`: aggregate counts over the audit log.

use crate::audit::AuditTrail;
use crate::cli::load_config;
use crate::policy::DecisionKind;
use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Run the `hitlctl stats` command.
pub fn run_stats(audit_log: Option<PathBuf>, config: Option<&Path>, json: bool) -> Result<()> {
    let path = match audit_log {
        Some(p) => p,
        None => load_config(config)?.audit_log,
    };
    let stats = AuditTrail::open(&path).stats()?;

    if json {
        // A log that was never written aggregates to nothing at all.
        if stats.is_empty() {
            println!("{{}}");
            return Ok(());
        }
        let out = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{}", out);
        return Ok(());
    }

    if stats.is_empty() {
        println!();
        println!("  {} No reviews recorded in {}", "ℹ".blue(), path.display());
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  {} total | {} approved | {} edited | {} rejected",
        stats.total_reviews.to_string().bold(),
        stats.count(DecisionKind::Approve).to_string().green().bold(),
        stats.count(DecisionKind::Edit).to_string().yellow().bold(),
        stats.count(DecisionKind::Reject).to_string().red().bold(),
    );
    print_counts("By tool", &stats.by_tool);
    print_counts("By reviewer", &stats.by_reviewer);
    println!();

    Ok(())
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>) {
    println!();
    println!("  {}", title.dimmed());
    let width = counts.keys().map(|k| k.len()).max().unwrap_or(0);
    for (name, count) in counts {
        println!("    {:width$}  {}", name, count, width = width);
    }
}
