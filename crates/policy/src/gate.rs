// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `PolicyGate` trait: the one seam every RMI entry point
//! authorizes through before creating a Job.

use async_trait::async_trait;
use std::collections::HashMap;

/// Policy action names a caller may be authorized against. Matches the
/// `.check` / `.update` / `.update-to-version` / `.vacuum` action ids the
/// policy service recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Check,
    Update,
    UpdateToVersion,
    Vacuum,
}

impl PolicyAction {
    pub fn action_id(self) -> &'static str {
        match self {
            Self::Check => "org.freedesktop.sysupdate1.check",
            Self::Update => "org.freedesktop.sysupdate1.update",
            Self::UpdateToVersion => "org.freedesktop.sysupdate1.update-to-version",
            Self::Vacuum => "org.freedesktop.sysupdate1.vacuum",
        }
    }
}

/// The detail set passed alongside an action id, shown to the user in an
/// interactive authentication prompt.
#[derive(Debug, Clone, Default)]
pub struct PolicyDetails {
    pub class: String,
    pub name: String,
    pub version: Option<String>,
    pub offline: bool,
}

impl PolicyDetails {
    pub fn to_map(&self) -> HashMap<&'static str, String> {
        let mut map = HashMap::new();
        map.insert("class", self.class.clone());
        map.insert("name", self.name.clone());
        if let Some(version) = &self.version {
            map.insert("version", version.clone());
        }
        map.insert("offline", self.offline.to_string());
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
    /// The subject could be authorized, but only after interactive
    /// authentication the method handler cannot block on.
    Interactive,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy service call failed: {0}")]
    Bus(#[from] zbus::Error),
}

/// Asynchronous authorization client. The production implementation talks
/// to a polkit-compatible bus service; tests use the in-memory fake behind
/// the `test-support` feature.
#[async_trait]
pub trait PolicyGate: Send + Sync {
    async fn check(
        &self,
        action: PolicyAction,
        subject_bus_name: &str,
        details: &PolicyDetails,
    ) -> Result<PolicyDecision, PolicyError>;
}
