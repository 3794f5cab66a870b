// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous worker helper: runs a worker to completion with a
//! piped stdout, for short queries that never touch the job registry or the
//! notify channel — component listing during discovery, version reads, and
//! appstream URL reads.

use crate::argv::{build_argv, ArgvRequest};
use std::process::Stdio;
use sysupdate_core::Target;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SyncHelperError {
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("worker exited with status {0}")]
    NonZeroExit(i32),
    #[error("worker terminated by signal")]
    Signalled,
    #[error("worker produced unparseable JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run the worker to completion and parse its stdout as JSON.
pub async fn run_worker_sync(req: &ArgvRequest<'_>, notify_socket_path: &std::path::Path) -> Result<serde_json::Value, SyncHelperError> {
    let mut argv = build_argv(req).into_iter();
    let program = argv.next().unwrap_or_else(|| req.binary.into());
    let args: Vec<_> = argv.collect();

    let mut cmd = Command::new(&program);
    cmd.args(&args);
    cmd.env("NOTIFY_SOCKET", notify_socket_path);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::inherit());
    cmd.kill_on_drop(true);

    let output = cmd.output().await?;

    let Some(code) = output.status.code() else {
        return Err(SyncHelperError::Signalled);
    };
    if code != 0 {
        return Err(SyncHelperError::NonZeroExit(code));
    }

    if output.stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(Default::default()));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Runs the worker's `components` verb for discovery rebuild, scoped to
/// `target` (or the host, if `None`). This verb is never exposed as an RMI
/// `JobKind` — it only ever runs through this synchronous helper, bypassing
/// the job registry and notify channel entirely.
pub async fn run_components_query(
    binary: &str,
    target: Option<&Target>,
    verify_no: bool,
    notify_socket_path: &std::path::Path,
) -> Result<serde_json::Value, SyncHelperError> {
    let mut argv = vec![binary.to_string(), "--json=short".to_string()];
    if verify_no {
        argv.push("--verify=no".to_string());
    }
    if let Some(selector) = target.and_then(|t| t.selector_arg()) {
        argv.push(selector);
    }
    argv.push("components".to_string());

    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.env("NOTIFY_SOCKET", notify_socket_path);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::inherit());
    cmd.kill_on_drop(true);

    let output = cmd.output().await?;

    let Some(code) = output.status.code() else {
        return Err(SyncHelperError::Signalled);
    };
    if code != 0 {
        return Err(SyncHelperError::NonZeroExit(code));
    }

    if output.stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(Default::default()));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

#[cfg(test)]
#[path = "sync_helper_tests.rs"]
mod tests;
