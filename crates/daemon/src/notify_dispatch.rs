// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notify-channel dispatch loop: reads credentialed
//! datagrams off the shared socket and folds each one into the engine's
//! job state.

use crate::engine::Engine;
use sysupdate_notify::NotifyReceiver;

/// Runs until the socket is closed (normally only at process shutdown, since
/// [`NotifyReceiver`] has no other failure mode that isn't itself logged and
/// skipped).
pub async fn run(receiver: NotifyReceiver, engine: Engine) {
    loop {
        match receiver.recv_message().await {
            Ok(Some((pid, msg))) => engine.apply_notification(pid, msg).await,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "notify socket read failed");
                continue;
            }
        }
    }
}
