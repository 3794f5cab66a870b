// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup, in the style of the daemon
//! binary: a `tracing_subscriber` registry honoring `RUST_LOG`/`SYSUPDATED_LOG`
//! with a sensible default filter, initialized once from `main`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the global `tracing` subscriber. Prefers `SYSUPDATED_LOG`
/// over the conventional `RUST_LOG` so the daemon's own knob takes
/// precedence when both are set; falls back to `info` level.
pub fn init() {
    let filter = std::env::var("SYSUPDATED_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
