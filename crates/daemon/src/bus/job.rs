// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `org.freedesktop.sysupdate1.Job` interface. Only served for a
//! job that has detached (`Update` past `READY=1`) — every other job kind
//! replies inline and is gone before a caller could ever look it up.

use crate::engine::Engine;
use crate::error::BusError;
use sysupdate_core::JobId;

pub struct JobIface {
    pub engine: Engine,
    pub job_id: JobId,
}

#[zbus::interface(name = "org.freedesktop.sysupdate1.Job")]
impl JobIface {
    #[zbus(property)]
    async fn id(&self) -> u64 {
        self.job_id.get()
    }

    #[zbus(property, name = "Type")]
    async fn type_(&self) -> String {
        self.engine.job_snapshot(self.job_id).map(|s| s.kind.to_string()).unwrap_or_default()
    }

    #[zbus(property)]
    async fn offline(&self) -> bool {
        self.engine.job_snapshot(self.job_id).map(|s| s.offline).unwrap_or(false)
    }

    #[zbus(property)]
    async fn progress(&self) -> u8 {
        self.engine.job_snapshot(self.job_id).map(|s| s.progress).unwrap_or(0)
    }

    async fn cancel(&self, #[zbus(header)] hdr: zbus::message::Header<'_>) -> Result<(), BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        self.engine.cancel(self.job_id, &subject).await?;
        Ok(())
    }
}
