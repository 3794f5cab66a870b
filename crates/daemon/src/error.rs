// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the bus-agnostic [`SysupdateError`] taxonomy onto concrete
//! `org.freedesktop.sysupdate1.Error.*` D-Bus error names. Kept out of
//! `sysupdate-core` so that crate never needs a live bus connection to
//! construct or compare errors.

use sysupdate_core::{ErrorKind, SysupdateError};
use zbus::DBusError;

#[derive(Debug, DBusError)]
#[zbus(prefix = "org.freedesktop.sysupdate1.Error")]
pub enum BusError {
    #[zbus(error)]
    ZBus(zbus::Error),
    InvalidArgs(String),
    AuthDenied(String),
    AuthInteractive(String),
    Busy(String),
    WorkerProtocol(String),
    WorkerFailed(String),
    NoUpdateCandidate(String),
}

impl From<SysupdateError> for BusError {
    fn from(err: SysupdateError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::InvalidArgs => BusError::InvalidArgs(message),
            ErrorKind::AuthDenied => BusError::AuthDenied(message),
            ErrorKind::AuthInteractive => BusError::AuthInteractive(message),
            ErrorKind::Busy => BusError::Busy(message),
            ErrorKind::WorkerProtocol => BusError::WorkerProtocol(message),
            ErrorKind::WorkerSignalled | ErrorKind::WorkerExit | ErrorKind::WorkerErrno => {
                BusError::WorkerFailed(message)
            }
            ErrorKind::NoUpdateCandidate => BusError::NoUpdateCandidate(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_maps_to_busy_variant() {
        let bus_err: BusError = SysupdateError::Busy.into();
        assert!(matches!(bus_err, BusError::Busy(_)));
    }

    #[test]
    fn no_update_candidate_maps_through() {
        let bus_err: BusError = SysupdateError::NoUpdateCandidate.into();
        assert!(matches!(bus_err, BusError::NoUpdateCandidate(_)));
    }

    #[test]
    fn worker_exit_and_errno_share_failed_variant() {
        let exit: BusError = SysupdateError::WorkerExit { code: 3 }.into();
        let errno: BusError = SysupdateError::WorkerErrno { errno: 19 }.into();
        assert!(matches!(exit, BusError::WorkerFailed(_)));
        assert!(matches!(errno, BusError::WorkerFailed(_)));
    }
}
