// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns one worker invocation with its stdout captured to an anonymous,
//! seekable memory file so the daemon can re-read it after the child exits.

use crate::argv::{build_argv, ArgvRequest};
use nix::sys::memfd::{memfd_create, MemFdCreateFlag};
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// A spawned worker: the child handle (owned by the event loop, which
/// reaps it) plus the memfd its stdout was redirected to.
pub struct SpawnedWorker {
    pub child: Child,
    pub stdout_capture: File,
}

/// Build the argument vector, create the stdout capture file, and spawn the
/// child with `NOTIFY_SOCKET` set in its environment.
///
/// File descriptors other than 0/1/2 are never inherited: `tokio::process`
/// marks every fd it doesn't explicitly wire up as close-on-exec, so no
/// extra bookkeeping is needed here to satisfy that requirement.
pub fn spawn_worker(req: &ArgvRequest<'_>, notify_socket_path: &std::path::Path) -> io::Result<SpawnedWorker> {
    let mut argv = build_argv(req).into_iter();
    let program = argv.next().unwrap_or_else(|| req.binary.into());
    let args: Vec<_> = argv.collect();

    let memfd = memfd_create(c"sysupdate-worker-stdout", MemFdCreateFlag::empty())
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
    let stdout_capture = File::from(memfd);
    let stdout_for_child = stdout_capture.try_clone()?;

    let mut cmd = Command::new(&program);
    cmd.args(&args);
    cmd.env("NOTIFY_SOCKET", notify_socket_path);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::from(stdout_for_child));
    cmd.stderr(Stdio::inherit());
    cmd.kill_on_drop(true);

    let child = cmd.spawn().inspect_err(|err| {
        tracing::warn!(?program, error = %err, "failed to spawn worker");
    })?;

    Ok(SpawnedWorker { child, stdout_capture })
}

/// Seek the capture file back to the start and parse its contents as JSON.
/// Empty output is logged and treated as an empty JSON object, matching the
/// daemon's "successful no-op" reading of a worker that printed nothing.
pub fn read_captured_json(mut file: File) -> Result<serde_json::Value, serde_json::Error> {
    use std::io::Read;

    if let Err(err) = file.seek(SeekFrom::Start(0)) {
        tracing::warn!(error = %err, "failed to rewind worker stdout capture");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let mut buf = String::new();
    if let Err(err) = file.read_to_string(&mut buf) {
        tracing::warn!(error = %err, "failed to read worker stdout capture");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    if buf.trim().is_empty() {
        tracing::debug!("worker produced no stdout output");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    serde_json::from_str(&buf)
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;
