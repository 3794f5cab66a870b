// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn allow_gate_allows_and_records_call() {
    let gate = FakePolicyGate::allow();
    let decision = gate
        .check(PolicyAction::Update, ":1.42", &PolicyDetails::default())
        .await
        .expect("check");
    assert_eq!(decision, PolicyDecision::Allow);
    assert_eq!(gate.calls(), vec![(PolicyAction::Update, ":1.42".to_string())]);
}

#[tokio::test]
async fn deny_gate_denies() {
    let gate = FakePolicyGate::deny();
    let decision = gate
        .check(PolicyAction::Vacuum, ":1.7", &PolicyDetails::default())
        .await
        .expect("check");
    assert_eq!(decision, PolicyDecision::Deny);
}

#[tokio::test]
async fn interactive_gate_is_distinct_from_deny() {
    let gate = FakePolicyGate::interactive();
    let decision = gate
        .check(PolicyAction::Check, ":1.1", &PolicyDetails::default())
        .await
        .expect("check");
    assert_eq!(decision, PolicyDecision::Interactive);
}
