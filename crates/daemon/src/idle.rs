// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle shutdown: systemd is expected
//! to restart the daemon on the next bus activation, so exiting here is
//! just giving up a process that has nothing left to do.

use crate::engine::Engine;
use std::time::Duration;

/// Polls [`Engine::is_idle`] once per `poll_interval` and exits the process
/// the first time `idle_timeout` has elapsed with no jobs outstanding.
/// Every non-idle tick resets the clock, matching a quiescence timer rather
/// than a fixed deadline.
pub async fn run(engine: Engine, idle_timeout: Duration) {
    let poll_interval = (idle_timeout / 10).max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(poll_interval);
    let mut idle_since: Option<tokio::time::Instant> = None;

    loop {
        interval.tick().await;
        if !engine.is_idle() {
            idle_since = None;
            continue;
        }
        let since = *idle_since.get_or_insert_with(tokio::time::Instant::now);
        if since.elapsed() >= idle_timeout {
            tracing::info!("exiting after idle timeout with no jobs outstanding");
            std::process::exit(0);
        }
    }
}
