// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn first_three_attempts_are_sigterm() {
    for attempt in 1..=3 {
        assert_eq!(signal_for_attempt(attempt), Signal::SIGTERM, "attempt {attempt}");
    }
}

#[test]
fn fourth_and_later_attempts_are_sigkill() {
    for attempt in 4..=6 {
        assert_eq!(signal_for_attempt(attempt), Signal::SIGKILL, "attempt {attempt}");
    }
}
