//! Audit log reader: replay and aggregate.
//!
//! Statistics are a pure fold over the file; nothing is cached between calls,
//! so a fresh `AuditTrail` on the same path sees everything written before.

use crate::audit::logger::AuditTrail;
use crate::audit::types::*;
use crate::policy::types::DecisionKind;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;

impl AuditTrail {
    /// Read every entry in write order. A missing log reads as empty.
    ///
    /// Blank lines are skipped. A last line without a trailing newline that
    /// fails to parse is a torn write and is skipped with a warning; any
    /// other unparseable line is an error.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read audit log: {}", path.display()))?;
        parse_entries(&content)
            .with_context(|| format!("Failed to parse audit log: {}", path.display()))
    }

    /// Aggregate counts over the whole log. Empty if the log doesn't exist.
    pub fn stats(&self) -> Result<ReviewStats> {
        if !self.log_path().exists() {
            return Ok(ReviewStats::default());
        }
        Ok(summarize(&self.entries()?))
    }

    /// Entries matching a filter, oldest first.
    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        Ok(filter_entries(&self.entries()?, filter))
    }
}

fn parse_entries(content: &str) -> Result<Vec<AuditEntry>> {
    let terminated = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let last = lines.len().saturating_sub(1);

    let mut entries = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) if i == last && !terminated => {
                tracing::warn!("Skipping incomplete audit entry at line {}: {}", i + 1, e);
            }
            Err(e) => bail!("Malformed audit entry at line {}: {}", i + 1, e),
        }
    }
    Ok(entries)
}

/// Fold entries into aggregate counts.
pub fn summarize(entries: &[AuditEntry]) -> ReviewStats {
    entries.iter().fold(ReviewStats::seeded(), |mut stats, entry| {
        stats.record(entry);
        stats
    })
}

/// Apply a filter, honoring its limit.
pub fn filter_entries(entries: &[AuditEntry], filter: &AuditFilter) -> Vec<AuditEntry> {
    entries
        .iter()
        .filter(|e| filter.matches(e))
        .take(filter.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Pretty-print a log entry for terminal display.
pub fn format_entry(entry: &AuditEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    let decision = match entry.decision_type {
        DecisionKind::Approve => "APPROVED".green().to_string(),
        DecisionKind::Edit => "EDITED".yellow().to_string(),
        DecisionKind::Reject => "REJECTED".red().to_string(),
    };

    let mut line = format!(
        "[{}] {} {} by {}",
        timestamp.dimmed(),
        decision,
        entry.action_tool.bold(),
        entry.reviewer
    );

    if let Some(stage) = entry.context.as_ref().and_then(|c| c.stage.as_deref()) {
        line.push_str(&format!(" ({})", stage.dimmed()));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::types::{ActionRequest, ReviewDecision};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_trail(tmp: &TempDir) -> AuditTrail {
        let trail = AuditTrail::new(tmp.path().join("audit.jsonl")).unwrap();
        let todos = ActionRequest::new("write_todos", json!({"todos": []}));
        let doc = ActionRequest::new("get_document", json!({"doc_id": "doc_001"}));
        let pages = ActionRequest::new("get_document_pages", json!({"doc_id": "doc_001", "pages": [1]}));
        trail.log(&todos, &ReviewDecision::Approve, "alice", "t1", None).unwrap();
        trail.log(&doc, &ReviewDecision::Reject, "bob", "t1", None).unwrap();
        trail.log(&pages, &ReviewDecision::Approve, "alice", "t2", None).unwrap();
        trail
    }

    #[test]
    fn test_stats_missing_log_is_empty() {
        let tmp = TempDir::new().unwrap();
        let trail = AuditTrail::new(tmp.path().join("none.jsonl")).unwrap();
        assert!(trail.stats().unwrap().is_empty());
        assert!(trail.entries().unwrap().is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let tmp = TempDir::new().unwrap();
        let stats = sample_trail(&tmp).stats().unwrap();
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.count(DecisionKind::Approve), 2);
        assert_eq!(stats.count(DecisionKind::Edit), 0);
        assert_eq!(stats.by_decision.get("edit"), Some(&0));
        assert_eq!(stats.by_reviewer["alice"], 2);
        assert_eq!(stats.by_tool["get_document"], 1);
    }

    #[test]
    fn test_skips_blank_and_torn_trailing_lines() {
        let tmp = TempDir::new().unwrap();
        let trail = sample_trail(&tmp);
        let mut content = fs::read_to_string(trail.log_path()).unwrap();
        content.push_str("\n\n{\"timestamp\": \"2026-");
        fs::write(trail.log_path(), content).unwrap();

        assert_eq!(trail.entries().unwrap().len(), 3);
    }

    #[test]
    fn test_corrupt_interior_line_is_error() {
        let tmp = TempDir::new().unwrap();
        let trail = sample_trail(&tmp);
        let content = fs::read_to_string(trail.log_path()).unwrap();
        fs::write(trail.log_path(), format!("garbage\n{}", content)).unwrap();

        let err = trail.entries().unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_filter_by_tool_glob_and_thread() {
        let tmp = TempDir::new().unwrap();
        let entries = sample_trail(&tmp).entries().unwrap();

        let filter = AuditFilter::default().with_tool_pattern("get_document*").unwrap();
        assert_eq!(filter_entries(&entries, &filter).len(), 2);

        let filter = AuditFilter {
            thread_id: Some("t1".to_string()),
            decision: Some(DecisionKind::Approve),
            ..Default::default()
        };
        let found = filter_entries(&entries, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].action_tool, "write_todos");
    }

    #[test]
    fn test_filter_limit() {
        let tmp = TempDir::new().unwrap();
        let entries = sample_trail(&tmp).entries().unwrap();
        let filter = AuditFilter {
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(filter_entries(&entries, &filter).len(), 2);
    }

    #[test]
    fn test_format_entry_mentions_tool_and_reviewer() {
        let tmp = TempDir::new().unwrap();
        let entries = sample_trail(&tmp).entries().unwrap();
        let line = format_entry(&entries[1]);
        assert!(line.contains("get_document"));
        assert!(line.contains("bob"));
    }
}
