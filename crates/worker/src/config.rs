// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker invocation configuration — the pieces of `DaemonConfig` the
//! invoker and sync helper actually need, kept as a narrow struct so this
//! crate doesn't depend on the daemon's full configuration type.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Path (or bare name, resolved via `$PATH`) to the worker binary.
    /// Overridden in tests via `SYSTEMD_SYSUPDATE_PATH`.
    pub binary: String,
    /// Adds `--verify=no` to every invocation. Overridden in tests via
    /// `SYSTEMD_SYSUPDATE_VERIFY_NO`.
    pub verify_no: bool,
    /// Runtime directory the notify socket is created under.
    pub runtime_dir: PathBuf,
}

impl WorkerConfig {
    pub fn notify_socket_path(&self) -> PathBuf {
        self.runtime_dir.join("sysupdate").join("notify")
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            binary: "systemd-sysupdate".to_string(),
            verify_no: false,
            runtime_dir: Path::new("/run").to_path_buf(),
        }
    }
}
