// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, type, and the bits shared between the engine and the bus
//! surface (everything that doesn't require owning a child process).

use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing identifier for a job, unique for the lifetime of
/// the daemon process. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(u64);

impl JobId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Bus object path for this job: `/org/freedesktop/sysupdate1/job/_<id>`.
    pub fn object_path(self) -> String {
        format!("/org/freedesktop/sysupdate1/job/_{}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing [`JobId`]s. Shared (via `Arc`) by the manager
/// state; a fresh generator starts counting at 1, matching sysupdated's own
/// convention that job id 0 is never valid.
#[derive(Debug, Default)]
pub struct JobIdGen {
    next: AtomicU64,
}

impl JobIdGen {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    pub fn next(&self) -> JobId {
        JobId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// The kind of operation a job performs against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    List,
    Describe,
    CheckNew,
    Update,
    Vacuum,
}

impl JobKind {
    /// Mutating jobs hold per-target exclusion for their duration.
    pub fn is_mutating(self) -> bool {
        matches!(self, JobKind::Update | JobKind::Vacuum)
    }

    /// Jobs that detach: the RMI caller is answered at `READY=1` rather than
    /// at child exit.
    pub fn detaches(self) -> bool {
        matches!(self, JobKind::Update)
    }

    /// The worker verb for this job kind. `Describe` reuses `list` (the
    /// version argument distinguishes it on the worker side).
    pub fn verb(self) -> &'static str {
        match self {
            JobKind::List | JobKind::Describe => "list",
            JobKind::CheckNew => "check-new",
            JobKind::Update => "update",
            JobKind::Vacuum => "vacuum",
        }
    }

    /// The polkit action name required to start or cancel this job.
    pub fn policy_action(self, version: Option<&str>) -> &'static str {
        match self {
            JobKind::List | JobKind::Describe | JobKind::CheckNew => "org.freedesktop.sysupdate1.check",
            JobKind::Update if version.is_some() => "org.freedesktop.sysupdate1.update-to-version",
            JobKind::Update => "org.freedesktop.sysupdate1.update",
            JobKind::Vacuum => "org.freedesktop.sysupdate1.vacuum",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::List => "list",
            JobKind::Describe => "describe",
            JobKind::CheckNew => "check-new",
            JobKind::Update => "update",
            JobKind::Vacuum => "vacuum",
        })
    }
}

bitflags::bitflags! {
    /// Flags accepted by `List`/`Describe` (the only methods that accept any
    /// flags at all). `Update` and `Vacuum` require the flags to be zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct JobFlags: u64 {
        const OFFLINE = 1 << 0;
    }
}

/// Read-only snapshot of a job, as exposed by `Manager.ListJobs` and the
/// `Job` bus object's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub kind: JobKind,
    pub target: TargetId,
    pub version: Option<String>,
    pub offline: bool,
    pub progress: u8,
    pub object_path: String,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
