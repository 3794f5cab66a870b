// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sysupdate-worker: spawning and reaping `systemd-sysupdate` invocations.
//!
//! Covers both call shapes the daemon needs: a detached spawn whose stdout
//! is captured to a memfd for the event loop to read back after exit
//! ([`invoker`]), and a synchronous run-to-completion helper for short
//! queries that never touch the job registry ([`sync_helper`]). Argument
//! vector construction ([`argv`]) and cancellation signal escalation
//! ([`signal`]) are shared by both call shapes.

pub mod argv;
pub mod config;
pub mod invoker;
pub mod signal;
pub mod sync_helper;

pub use argv::{build_argv, ArgvRequest};
pub use config::WorkerConfig;
pub use invoker::{read_captured_json, spawn_worker, SpawnedWorker};
pub use signal::{cancel, signal_for_attempt};
pub use sync_helper::{run_components_query, run_worker_sync, SyncHelperError};
