// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation: SIGTERM for the first three attempts, SIGKILL
//! from the fourth attempt onward.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Which signal the Nth cancellation attempt (1-indexed) should deliver.
pub fn signal_for_attempt(attempt: u32) -> Signal {
    if attempt <= 3 {
        Signal::SIGTERM
    } else {
        Signal::SIGKILL
    }
}

/// Deliver the appropriate signal for this attempt number to `pid`.
pub fn cancel(pid: i32, attempt: u32) -> nix::Result<Signal> {
    let signal = signal_for_attempt(attempt);
    signal::kill(Pid::from_raw(pid), signal)?;
    Ok(signal)
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
