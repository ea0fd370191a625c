//! Integration tests for approval policies: canned levels, custom flags and
//! YAML parsing.

use hitlctl::policy::parser::parse_policy_str;
use hitlctl::policy::{ActionKind, ApprovalPolicy, ApprovalRequirement, DecisionKind, OversightLevel};

fn assert_six_kinds(policy: &ApprovalPolicy) {
    let kinds: Vec<ActionKind> = policy.kinds().collect();
    assert_eq!(kinds, ActionKind::ALL.to_vec());
}

#[test]
fn test_every_policy_covers_six_actions() {
    assert_six_kinds(&ApprovalPolicy::high_oversight());
    assert_six_kinds(&ApprovalPolicy::moderate_oversight());
    assert_six_kinds(&ApprovalPolicy::minimal_oversight());

    for bits in 0..16u8 {
        let policy = ApprovalPolicy::custom(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
        assert_six_kinds(&policy);
    }
}

#[test]
fn test_custom_matches_canned_levels() {
    assert_eq!(ApprovalPolicy::custom(true, true, true, true), ApprovalPolicy::high_oversight());
    assert_eq!(ApprovalPolicy::custom(false, false, false, true), ApprovalPolicy::minimal_oversight());
}

#[test]
fn test_custom_pairs_document_and_file_flags() {
    let policy = ApprovalPolicy::custom(false, true, true, false);
    assert!(!policy.requires_review(ActionKind::WriteTodos));
    assert!(policy.requires_review(ActionKind::Task));
    assert!(policy.requires_review(ActionKind::GetDocument));
    assert!(policy.requires_review(ActionKind::GetDocumentPages));
    assert!(!policy.requires_review(ActionKind::WriteFile));
    assert!(!policy.requires_review(ActionKind::EditFile));
}

#[test]
fn test_moderate_policy_shape() {
    let policy = ApprovalPolicy::moderate_oversight();
    assert_eq!(policy.requirement(ActionKind::WriteTodos), &ApprovalRequirement::FullReview);
    assert_eq!(policy.requirement(ActionKind::GetDocument), &ApprovalRequirement::NoReview);
    assert_eq!(
        policy.requirement(ActionKind::EditFile),
        &ApprovalRequirement::restricted([DecisionKind::Approve, DecisionKind::Reject])
    );
    assert_eq!(policy.reviewed_count(), 4);
}

#[test]
fn test_review_configs_follow_policy() {
    let configs = ApprovalPolicy::moderate_oversight().review_configs();
    let names: Vec<&str> = configs.iter().map(|c| c.action_name.as_str()).collect();
    assert_eq!(names, vec!["write_todos", "task", "write_file", "edit_file"]);

    let edit_file = configs.iter().find(|c| c.action_name == "edit_file").unwrap();
    assert_eq!(edit_file.allowed_decisions, vec![DecisionKind::Approve, DecisionKind::Reject]);
}

#[test]
fn test_levels_parse_loosely() {
    assert_eq!(OversightLevel::from_str_loose("HIGH"), Some(OversightLevel::High));
    assert_eq!(OversightLevel::from_str_loose("trusted"), Some(OversightLevel::Minimal));
    assert_eq!(OversightLevel::from_str_loose("sometimes"), None);
    assert_eq!(OversightLevel::Moderate.policy(), ApprovalPolicy::moderate_oversight());
}

#[test]
fn test_yaml_level_and_mapping() {
    assert_eq!(parse_policy_str("high").unwrap(), ApprovalPolicy::high_oversight());

    let err = parse_policy_str("write_todos: true\ntask: false\n").unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("get_document"));
    assert!(message.contains("edit_file"));
}

#[test]
fn test_policy_serializes_like_config() {
    let yaml = serde_yaml::to_string(&ApprovalPolicy::moderate_oversight()).unwrap();
    assert_eq!(parse_policy_str(&yaml).unwrap(), ApprovalPolicy::moderate_oversight());
}
