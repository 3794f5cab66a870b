// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy: every way an RMI method call can fail.
//!
//! This type is bus-agnostic (no `zbus` dependency here): the daemon crate
//! maps [`ErrorKind`] onto concrete `org.freedesktop.sysupdate1.Error.*`
//! D-Bus error names at the edge. Keeping the mapping out of this crate
//! means the engine logic (and its tests) never need a live bus connection
//! to construct or compare errors.

use thiserror::Error;

/// Stable tag used by the bus layer to pick a D-Bus error name; kept
/// separate from the `Display` message so the two can vary independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgs,
    AuthDenied,
    AuthInteractive,
    Busy,
    WorkerProtocol,
    WorkerSignalled,
    WorkerExit,
    WorkerErrno,
    NoUpdateCandidate,
}

#[derive(Debug, Error)]
pub enum SysupdateError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("access denied: {0}")]
    AuthDenied(String),

    #[error("interactive authentication required")]
    AuthInteractive,

    #[error("target is busy running another update")]
    Busy,

    #[error("worker protocol violation: {0}")]
    WorkerProtocol(String),

    #[error("worker terminated by signal {signal}")]
    WorkerSignalled { signal: String },

    #[error("worker exited with status {code}")]
    WorkerExit { code: i32 },

    #[error("worker reported error {errno}")]
    WorkerErrno { errno: i32 },

    #[error("no update candidate found")]
    NoUpdateCandidate,
}

impl SysupdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SysupdateError::InvalidArgs(_) => ErrorKind::InvalidArgs,
            SysupdateError::AuthDenied(_) => ErrorKind::AuthDenied,
            SysupdateError::AuthInteractive => ErrorKind::AuthInteractive,
            SysupdateError::Busy => ErrorKind::Busy,
            SysupdateError::WorkerProtocol(_) => ErrorKind::WorkerProtocol,
            SysupdateError::WorkerSignalled { .. } => ErrorKind::WorkerSignalled,
            SysupdateError::WorkerExit { .. } => ErrorKind::WorkerExit,
            SysupdateError::WorkerErrno { .. } => ErrorKind::WorkerErrno,
            SysupdateError::NoUpdateCandidate => ErrorKind::NoUpdateCandidate,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
