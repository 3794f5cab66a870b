// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `zbus` object tree: thin interface wrappers that delegate to
//! [`crate::engine::Engine`] and translate [`sysupdate_core::SysupdateError`]
//! into [`crate::error::BusError`] at the edge. All decision-making lives in
//! `engine`, which is testable without a live bus connection; this module is
//! wiring.

pub mod job;
pub mod manager;
pub mod target;

use crate::engine::Engine;
use sysupdate_core::TargetId;

pub const TARGET_PATH_PREFIX: &str = "/org/freedesktop/sysupdate1/target";

pub fn target_object_path(id: &TargetId) -> String {
    format!("{TARGET_PATH_PREFIX}/{}", escape_label(id.as_str()))
}

/// Bus-safe escape for one object path element, mirroring systemd's
/// `bus_label_escape`: keep `[A-Za-z0-9]`, escape everything else (and a
/// leading digit) as `_xx` hex.
pub fn escape_label(input: &str) -> String {
    if input.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(input.len());
    for (i, b) in input.bytes().enumerate() {
        let keep = b.is_ascii_alphanumeric() && !(i == 0 && b.is_ascii_digit());
        if keep {
            out.push(b as char);
        } else {
            out.push('_');
            out.push_str(&format!("{b:02x}"));
        }
    }
    out
}

/// Serves a `Target` bus object for every target the engine currently
/// knows about. Idempotent: `object_server().at()` is a no-op (returns
/// `Ok(false)`) for a path already registered, so this can be called on
/// every `Manager.ListTargets` without tracking what's already served.
///
/// Deliberately one-directional: a target that later vanishes from the
/// registry (flushed on idle) keeps its bus object around until the
/// connection closes. Re-discovering it reuses the same object path, so a
/// stale proxy self-heals on its next call rather than dangling.
pub async fn sync_target_objects(connection: &zbus::Connection, engine: &Engine) {
    for target in engine.list_targets() {
        let path = target_object_path(&target.id);
        let iface = target::TargetIface { engine: engine.clone(), target_id: target.id.clone() };
        if let Err(err) = connection.object_server().at(path.clone(), iface).await {
            tracing::warn!(target = %target.id, error = %err, "failed to serve target object");
        }
    }
}
