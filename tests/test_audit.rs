//! Integration tests for the audit trail: durable appends and statistics.

use hitlctl::audit::{AuditFilter, AuditTrail};
use hitlctl::policy::DecisionKind;
use hitlctl::review::{ActionRequest, ReviewContext, ReviewDecision};
use serde_json::json;
use tempfile::TempDir;

fn decision(i: usize) -> ReviewDecision {
    match i % 3 {
        0 => ReviewDecision::Approve,
        1 => ReviewDecision::edit(ActionRequest::new("task", json!({"name": "general-purpose", "task": "x"}))),
        _ => ReviewDecision::Reject,
    }
}

#[test]
fn test_stats_total_matches_logged_decisions() {
    let tmp = TempDir::new().unwrap();
    let trail = AuditTrail::new(tmp.path().join("audit.jsonl")).unwrap();
    let tools = ["write_todos", "task", "write_file", "get_document"];

    let n = 11;
    for i in 0..n {
        let action = ActionRequest::new(tools[i % tools.len()], json!({"i": i}));
        let ctx = ReviewContext::for_iteration(i + 1, "thread-a");
        trail
            .log(&action, &decision(i), "reviewer", "thread-a", Some(&ctx))
            .unwrap();
    }

    let stats = trail.stats().unwrap();
    assert_eq!(stats.total_reviews, n);
    assert_eq!(stats.by_decision.values().sum::<usize>(), n);
    assert_eq!(stats.by_tool.values().sum::<usize>(), n);
    assert_eq!(stats.by_reviewer["reviewer"], n);
    assert_eq!(stats.count(DecisionKind::Approve), 4);
    assert_eq!(stats.count(DecisionKind::Edit), 4);
    assert_eq!(stats.count(DecisionKind::Reject), 3);
}

#[test]
fn test_fresh_trail_sees_previous_entries() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("logs").join("audit.jsonl");

    {
        let trail = AuditTrail::new(&path).unwrap();
        let action = ActionRequest::new("write_file", json!({"file_path": "a.md", "content": ""}));
        trail.log(&action, &ReviewDecision::Approve, "alice", "t1", None).unwrap();
        trail.log(&action, &ReviewDecision::Reject, "bob", "t2", None).unwrap();
    }

    let reopened = AuditTrail::new(&path).unwrap();
    let stats = reopened.stats().unwrap();
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.by_tool["write_file"], 2);

    let entries = reopened.entries().unwrap();
    assert_eq!(entries[0].reviewer, "alice");
    assert_eq!(entries[1].decision_type, DecisionKind::Reject);
}

#[test]
fn test_missing_log_gives_empty_stats() {
    let tmp = TempDir::new().unwrap();
    let trail = AuditTrail::new(tmp.path().join("never-written.jsonl")).unwrap();
    let stats = trail.stats().unwrap();
    assert!(stats.is_empty());
    assert_eq!(stats.total_reviews, 0);
    assert!(!trail.log_path().exists());
}

#[test]
fn test_edit_entries_carry_edited_args() {
    let tmp = TempDir::new().unwrap();
    let trail = AuditTrail::new(tmp.path().join("audit.jsonl")).unwrap();
    let action = ActionRequest::new("task", json!({"name": "legal-analyzer", "task": "x"}));
    let entry = trail.log(&action, &decision(1), "carol", "t", None).unwrap();

    assert_eq!(entry.action_args["name"], "legal-analyzer");
    assert_eq!(entry.edited_args.unwrap()["name"], "general-purpose");
}

#[test]
fn test_query_by_thread() {
    let tmp = TempDir::new().unwrap();
    let trail = AuditTrail::new(tmp.path().join("audit.jsonl")).unwrap();
    let action = ActionRequest::new("get_document", json!({"doc_id": "doc_001"}));
    for thread in ["a", "b", "a"] {
        trail.log(&action, &ReviewDecision::Approve, "r", thread, None).unwrap();
    }

    let filter = AuditFilter {
        thread_id: Some("a".to_string()),
        ..Default::default()
    };
    assert_eq!(trail.query(&filter).unwrap().len(), 2);
}

#[test]
fn test_concurrent_writers_do_not_interleave() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("audit.jsonl");

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let trail = AuditTrail::new(&path).unwrap();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let action = ActionRequest::new("write_file", json!({"content": "x".repeat(200), "i": i}));
                    trail
                        .log(&action, &ReviewDecision::Approve, "r", &format!("thread-{}", t), None)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let trail = AuditTrail::new(&path).unwrap();
    assert_eq!(trail.stats().unwrap().total_reviews, 100);
}

#[test]
fn test_reads_timestamps_without_offset() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("audit.jsonl");
    let lines = [
        r#"{"timestamp": "2025-01-15T10:30:00.123456", "thread_id": "t", "reviewer": "human", "action_tool": "write_file", "action_args": {}, "decision_type": "approve", "edited_args": null, "context": null}"#,
        r#"{"timestamp": "2025-01-15T10:31:00", "thread_id": "t", "reviewer": "human", "action_tool": "task", "action_args": {}, "decision_type": "reject", "edited_args": null, "context": null}"#,
        r#"{"timestamp": "2025-01-15T10:32:00+00:00", "thread_id": "t", "reviewer": "human", "action_tool": "task", "action_args": {}, "decision_type": "reject"}"#,
    ];
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    let entries = AuditTrail::open(&path).entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].timestamp.to_rfc3339().starts_with("2025-01-15T10:30:00.123456"));
    assert!(entries[1].timestamp.to_rfc3339().starts_with("2025-01-15T10:31:00"));
    assert_eq!(entries[2].context, None);
}

#[test]
fn test_bad_timestamp_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("audit.jsonl");
    std::fs::write(
        &path,
        r#"{"timestamp": "yesterday", "thread_id": "t", "reviewer": "human", "action_tool": "task", "action_args": {}, "decision_type": "reject"}"#.to_string() + "\n",
    )
    .unwrap();

    let err = AuditTrail::open(&path).entries().unwrap_err();
    assert!(format!("{:#}", err).contains("line 1"));
}
