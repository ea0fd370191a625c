//! `hitlctl policy`: show what each oversight level reviews.

use crate::cli::load_config;
use crate::policy::levels::available_levels;
use crate::policy::{ApprovalPolicy, OversightLevel};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

/// Run the `hitlctl policy` command. Without a level, shows the policy the
/// current config resolves to.
pub fn run_policy(level: Option<&str>, config: Option<&Path>) -> Result<()> {
    let (title, policy) = match level {
        Some(name) => match OversightLevel::from_str_loose(name) {
            Some(level) => (level.to_string(), level.policy()),
            None => bail!("Unknown oversight level '{}' (expected high, moderate or minimal)", name),
        },
        None => ("configured".to_string(), load_config(config)?.policy()?),
    };

    println!();
    println!("  {} {}", "Oversight:".bold(), title.cyan());
    println!();
    print_policy(&policy);

    println!();
    println!("  {}", "Levels:".dimmed());
    for (name, description) in available_levels() {
        println!("    {:10} {}", name.bold(), description.dimmed());
    }
    println!();

    Ok(())
}

fn print_policy(policy: &ApprovalPolicy) {
    for (kind, requirement) in policy.iter() {
        let marker = if requirement.needs_review() {
            "●".yellow()
        } else {
            "○".dimmed()
        };
        println!("  {} {:20} {}", marker, kind.as_str(), requirement);
    }
}
