//! Audit trail writer: append-only JSONL file.
//!
//! Each decision is serialized to one line and written with a single call on
//! a file opened in append mode, so several loops (or processes) can share the
//! same log without interleaving records. The file is reopened per record;
//! nothing is held between writes.

use crate::audit::types::AuditEntry;
use crate::review::types::{ActionRequest, ReviewContext, ReviewDecision};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log file used when no path is configured.
pub const DEFAULT_AUDIT_FILE: &str = "review_audit.jsonl";

/// Handle to an append-only review log.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    log_path: PathBuf,
}

impl AuditTrail {
    /// Create a trail writing to `path`. Creates missing parent directories;
    /// the file itself appears on the first write.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
        }
        Ok(Self { log_path })
    }

    /// Handle for reading an existing log. Touches nothing on disk.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            log_path: path.as_ref().to_path_buf(),
        }
    }

    /// Record one review decision. Returns the entry that was written.
    pub fn log(
        &self,
        action: &ActionRequest,
        decision: &ReviewDecision,
        reviewer: &str,
        thread_id: &str,
        context: Option<&ReviewContext>,
    ) -> Result<AuditEntry> {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            thread_id: thread_id.to_string(),
            reviewer: reviewer.to_string(),
            action_tool: action.name.clone(),
            action_args: action.args.clone(),
            decision_type: decision.kind(),
            edited_args: decision.edited_args().cloned(),
            context: context.cloned(),
        };
        self.append(&entry)?;
        Ok(entry)
    }

    /// Append a prepared entry as one line.
    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).context("Failed to serialize audit entry")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;
        file.write_all(line.as_bytes())
            .context("Failed to write audit entry")?;
        file.flush().context("Failed to flush audit log")?;

        tracing::debug!(
            "Audit: {} {} by {} ({})",
            entry.decision_type,
            entry.action_tool,
            entry.reviewer,
            entry.thread_id
        );
        Ok(())
    }

    /// Get the path to the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
