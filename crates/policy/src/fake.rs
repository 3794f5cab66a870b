// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake policy gate for tests: the production trait has
//! exactly one other implementor, reachable only behind `test-support`.

use crate::gate::{PolicyAction, PolicyDecision, PolicyDetails, PolicyError, PolicyGate};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Always returns a fixed decision, and records every call it received so
/// tests can assert on what was authorized.
pub struct FakePolicyGate {
    decision: PolicyDecision,
    calls: Mutex<Vec<(PolicyAction, String)>>,
}

impl FakePolicyGate {
    pub fn new(decision: PolicyDecision) -> Self {
        Self { decision, calls: Mutex::new(Vec::new()) }
    }

    pub fn allow() -> Self {
        Self::new(PolicyDecision::Allow)
    }

    pub fn deny() -> Self {
        Self::new(PolicyDecision::Deny)
    }

    pub fn interactive() -> Self {
        Self::new(PolicyDecision::Interactive)
    }

    pub fn calls(&self) -> Vec<(PolicyAction, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl PolicyGate for FakePolicyGate {
    async fn check(
        &self,
        action: PolicyAction,
        subject_bus_name: &str,
        _details: &PolicyDetails,
    ) -> Result<PolicyDecision, PolicyError> {
        self.calls.lock().push((action, subject_bus_name.to_string()));
        Ok(self.decision)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
