// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sysupdate-notify: the credential-authenticated datagram channel workers
//! use to report progress.
//!
//! Binding, credential enforcement, and truncation handling live in
//! [`socket`]; this crate re-exports a convenience method that also parses
//! the accepted payload into a [`sysupdate_core::NotifyMessage`], since
//! every caller wants both together.

pub mod socket;

pub use socket::{NotifyError, NotifyReceiver, RawNotification};
use sysupdate_core::NotifyMessage;

impl NotifyReceiver {
    /// Receive one datagram and parse it, or `None` if the datagram was
    /// dropped at the credential-check stage.
    pub async fn recv_message(&self) -> Result<Option<(i32, NotifyMessage)>, NotifyError> {
        Ok(self.recv_one().await?.map(|raw| (raw.pid, NotifyMessage::parse(&raw.payload))))
    }
}
