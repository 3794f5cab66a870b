// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sysupdate-policy: the authorization client every RMI entry point calls
//! through before a Job is created.

pub mod gate;
pub mod polkit;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use gate::{PolicyAction, PolicyDecision, PolicyDetails, PolicyError, PolicyGate};
pub use polkit::PolkitGate;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePolicyGate;
