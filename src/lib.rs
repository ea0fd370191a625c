//! hitlctl: human-in-the-loop review for autonomous agents.
//!
//! An agent proposes actions; the ones the approval policy marks as
//! sensitive pause the run until a reviewer approves, edits or rejects them.
//! Every decision lands in an append-only audit log. The binary entrypoint is
//! in `main.rs`.

pub mod audit;
pub mod cli;
pub mod config;
pub mod hitl;
pub mod policy;
pub mod review;
