//! hitlctl: human review for autonomous agents.
//!
//! Quick start:
//!   hitlctl run --scenario demo.yaml     # drive an agent, review what it proposes
//!   hitlctl stats                        # how reviews have gone so far
//!   hitlctl log                          # every recorded decision
//!
//! For more info: hitlctl --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use hitlctl::cli;
use std::path::PathBuf;

/// hitlctl: approve, edit or reject what your agent wants to do.
#[derive(Parser)]
#[command(
    name = "hitlctl",
    version,
    about = "Human-in-the-loop review for autonomous agents",
    long_about = "hitlctl pauses an agent before sensitive actions and asks a\n\
                  reviewer to approve, edit or reject them. Every decision is\n\
                  written to an audit log.\n\n\
                  Quick start:\n  \
                  hitlctl run --scenario demo.yaml\n  \
                  hitlctl stats\n  \
                  hitlctl log"
)]
struct Cli {
    /// Config file (default: .hitlctl.yaml, searched upwards)
    #[arg(long, global = true, env = "HITLCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted agent through the review loop
    Run {
        /// Scenario file (JSON or YAML)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Opening user message
        #[arg(short, long, default_value = "Run the scenario")]
        message: String,

        /// Thread ID (default: a fresh UUID)
        #[arg(short, long)]
        thread: Option<String>,

        /// Oversight level: high, moderate, minimal
        #[arg(short, long)]
        level: Option<String>,

        /// Reviewer: terminal, auto-approve, auto-reject
        #[arg(long, default_value = "terminal")]
        approval: String,

        /// Name recorded in the audit log
        #[arg(long)]
        reviewer: Option<String>,

        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,

        /// Don't record decisions
        #[arg(long)]
        no_audit: bool,

        /// Review rounds before giving up
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Show review statistics
    Stats {
        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// See recorded decisions
    Log {
        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,

        /// Only this thread
        #[arg(short, long)]
        thread: Option<String>,

        /// Filter: approve, edit, reject
        #[arg(short, long)]
        decision: Option<String>,

        /// Tool name glob, e.g. "get_document*"
        #[arg(long)]
        tool: Option<String>,

        /// Max entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show what an oversight level reviews
    Policy {
        /// high, moderate or minimal (default: from config)
        level: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Only warnings by default; RUST_LOG=hitlctl=debug for the loop's trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hitlctl=warn".parse().expect("static directive")),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Run {
            scenario,
            message,
            thread,
            level,
            approval,
            reviewer,
            audit_log,
            no_audit,
            max_iterations,
        } => {
            let options = cli::run::RunOptions {
                scenario,
                message,
                thread_id: thread,
                level,
                approval_mode: approval,
                reviewer,
                audit_log,
                no_audit,
                max_iterations,
                config,
            };
            cli::run::run_scenario(options).await
        }

        Commands::Stats { audit_log, json } => cli::stats::run_stats(audit_log, config.as_deref(), json),

        Commands::Log {
            audit_log,
            thread,
            decision,
            tool,
            limit,
        } => cli::log::run_log(cli::log::LogOptions {
            audit_log,
            config,
            thread,
            decision,
            tool,
            limit,
        }),

        Commands::Policy { level } => cli::policy::run_policy(level.as_deref(), config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}
