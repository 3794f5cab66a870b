// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual signal emission: `JobRemoved` on the Manager and a
//! `PropertiesChanged` for a Job's `Progress` property.
//!
//! Both need to fire from contexts that don't hold a live `&self` reference
//! to the registered interface instance — the notify dispatcher, and a
//! detached job's reaper task — so we go through `Connection::emit_signal`
//! directly rather than the macro-generated per-interface signal helpers.

use sysupdate_core::JobId;
use zbus::zvariant::{ObjectPath, Value};
use zbus::Connection;

pub const MANAGER_PATH: &str = "/org/freedesktop/sysupdate1";
pub const MANAGER_INTERFACE: &str = "org.freedesktop.sysupdate1.Manager";
pub const JOB_INTERFACE: &str = "org.freedesktop.sysupdate1.Job";

pub async fn emit_job_removed(connection: &Connection, id: JobId, path: &str, status: i32) {
    let object_path = match ObjectPath::try_from(path) {
        Ok(p) => p,
        Err(err) => {
            tracing::warn!(job = %id, path, error = %err, "invalid job object path, not emitting JobRemoved");
            return;
        }
    };
    let result = connection
        .emit_signal(None::<&str>, MANAGER_PATH, MANAGER_INTERFACE, "JobRemoved", &(id.get(), object_path, status))
        .await;
    if let Err(err) = result {
        tracing::warn!(job = %id, error = %err, "failed to emit JobRemoved signal");
    }
}

pub async fn emit_progress_changed(connection: &Connection, job_path: &str, progress: u8) {
    let mut changed = std::collections::HashMap::new();
    changed.insert("Progress", Value::from(progress));
    let invalidated: Vec<&str> = Vec::new();

    let result = connection
        .emit_signal(
            None::<&str>,
            job_path,
            "org.freedesktop.DBus.Properties",
            "PropertiesChanged",
            &(JOB_INTERFACE, changed, invalidated),
        )
        .await;
    if let Err(err) = result {
        tracing::warn!(path = job_path, error = %err, "failed to emit PropertiesChanged for Progress");
    }
}
