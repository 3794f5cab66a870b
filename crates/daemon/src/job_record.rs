// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's private bookkeeping for one in-flight [`Job`](sysupdate_core::JobId).
//! Distinct from [`sysupdate_core::JobSummary`], which is the read-only
//! snapshot handed out over the bus.

use sysupdate_core::{JobKind, TargetId};
use tokio::sync::oneshot;

pub struct JobRecord {
    pub kind: JobKind,
    pub target: TargetId,
    pub version: Option<String>,
    pub offline: bool,
    pub progress: u8,
    pub errno: Option<i32>,
    pub cancel_attempts: u32,
    /// Set once the worker has actually been spawned; notifications are
    /// matched against it.
    pub pid: Option<i32>,
    /// Only `Some` for a job that detaches (`Update`): fired by the notify
    /// dispatcher when `READY=1` arrives, so `Engine::update` can stop
    /// waiting on the child and hand it off to a reaper task instead.
    pub ready_tx: Option<oneshot::Sender<()>>,
}

impl JobRecord {
    pub fn new(kind: JobKind, target: TargetId, version: Option<String>, offline: bool) -> Self {
        Self {
            kind,
            target,
            version,
            offline,
            progress: 0,
            errno: None,
            cancel_attempts: 0,
            pid: None,
            ready_tx: None,
        }
    }
}
