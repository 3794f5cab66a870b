// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: a small struct loaded once from the
//! process environment with documented defaults, rather than scattered
//! `std::env::var` calls sprinkled through the engine.

use std::path::{Path, PathBuf};
use std::time::Duration;
use sysupdate_worker::WorkerConfig;

/// Default quiescence interval before the daemon exits once idle ("Idle
/// shutdown"). Five minutes, matching `sysupdated`'s own default.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Runtime directory; the notify socket lives at
    /// `<runtime_dir>/sysupdate/notify`.
    pub runtime_dir: PathBuf,
    /// Worker binary path or bare name resolved via `$PATH`.
    pub worker_binary: String,
    /// Adds `--verify=no` to every worker invocation. Testing-only.
    pub verify_no: bool,
    /// How long the daemon stays alive with no jobs before exiting.
    pub idle_timeout: Duration,
}

impl DaemonConfig {
    /// Reads `RUNTIME_DIRECTORY` (falls back to `/run`),
    /// `SYSTEMD_SYSUPDATE_PATH`, `SYSTEMD_SYSUPDATE_VERIFY_NO`, and
    /// `SYSUPDATED_IDLE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let runtime_dir = std::env::var_os("RUNTIME_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new("/run").to_path_buf());

        let worker_binary =
            std::env::var("SYSTEMD_SYSUPDATE_PATH").unwrap_or_else(|_| "systemd-sysupdate".to_string());

        let verify_no = env_truthy("SYSTEMD_SYSUPDATE_VERIFY_NO");

        let idle_timeout = std::env::var("SYSUPDATED_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);

        Self { runtime_dir, worker_binary, verify_no, idle_timeout }
    }

    pub fn notify_socket_path(&self) -> PathBuf {
        self.runtime_dir.join("sysupdate").join("notify")
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            binary: self.worker_binary.clone(),
            verify_no: self.verify_no,
            runtime_dir: self.runtime_dir.clone(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            runtime_dir: Path::new("/run").to_path_buf(),
            worker_binary: "systemd-sysupdate".to_string(),
            verify_no: false,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Treats `1`, `true`, `yes` (case-insensitive) as truthy; anything else,
/// including an unset variable, as false.
fn env_truthy(key: &str) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = DaemonConfig::default();
        assert_eq!(config.runtime_dir, Path::new("/run"));
        assert_eq!(config.worker_binary, "systemd-sysupdate");
        assert!(!config.verify_no);
        assert_eq!(config.idle_timeout, DEFAULT_IDLE_TIMEOUT);
    }

    #[test]
    fn notify_socket_path_is_derived() {
        let config = DaemonConfig { runtime_dir: PathBuf::from("/run/test"), ..DaemonConfig::default() };
        assert_eq!(config.notify_socket_path(), PathBuf::from("/run/test/sysupdate/notify"));
    }

    #[test]
    fn env_truthy_accepts_common_spellings() {
        for v in ["1", "true", "TRUE", "yes", "Yes"] {
            std::env::set_var("SYSUPDATED_TEST_TRUTHY_PROBE", v);
            assert!(env_truthy("SYSUPDATED_TEST_TRUTHY_PROBE"), "{v} should be truthy");
        }
        std::env::set_var("SYSUPDATED_TEST_TRUTHY_PROBE", "0");
        assert!(!env_truthy("SYSUPDATED_TEST_TRUTHY_PROBE"));
        std::env::remove_var("SYSUPDATED_TEST_TRUTHY_PROBE");
    }
}
