// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `org.freedesktop.sysupdate1.Manager` interface: the single
//! object clients find at the well-known bus name, from which every
//! `Target`/`Job` object path is reachable. No literal
//! `org.freedesktop.DBus.ObjectManager` is implemented here — `ListTargets`
//! is the enumerator, and that's all a client needs to discover target
//! object paths.

use crate::bus::{sync_target_objects, target_object_path};
use crate::engine::Engine;
use crate::error::BusError;
use zbus::zvariant::OwnedObjectPath;

pub struct ManagerIface {
    pub engine: Engine,
}

#[zbus::interface(name = "org.freedesktop.sysupdate1.Manager")]
impl ManagerIface {
    async fn list_targets(
        &self,
        #[zbus(connection)] connection: &zbus::Connection,
    ) -> Result<Vec<(String, String, OwnedObjectPath)>, BusError> {
        self.engine.ensure_targets().await;
        sync_target_objects(connection, &self.engine).await;

        self.engine
            .list_targets()
            .into_iter()
            .map(|t| {
                let path = OwnedObjectPath::try_from(target_object_path(&t.id))
                    .map_err(|e| BusError::WorkerProtocol(format!("invalid target object path: {e}")))?;
                Ok((t.class.to_string(), t.name, path))
            })
            .collect()
    }

    async fn list_jobs(&self) -> Result<Vec<(u64, String, u8, OwnedObjectPath)>, BusError> {
        self.engine
            .list_jobs()
            .into_iter()
            .map(|j| {
                let path = OwnedObjectPath::try_from(j.object_path.as_str())
                    .map_err(|e| BusError::WorkerProtocol(format!("invalid job object path: {e}")))?;
                Ok((j.id.get(), j.kind.to_string(), j.progress, path))
            })
            .collect()
    }

    #[zbus(name = "ListAppStream")]
    async fn list_app_stream(&self) -> Result<Vec<String>, BusError> {
        Ok(self.engine.list_appstream().await?)
    }
}
