// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `org.freedesktop.sysupdate1.Target` interface: one object per
//! discovered host/component/image, all RMI entry points that act on a
//! single target.

use crate::engine::Engine;
use crate::error::BusError;
use sysupdate_core::TargetId;
use zbus::zvariant::OwnedObjectPath;

pub struct TargetIface {
    pub engine: Engine,
    pub target_id: TargetId,
}

impl TargetIface {
    fn target(&self) -> sysupdate_core::Target {
        self.engine
            .list_targets()
            .into_iter()
            .find(|t| t.id == self.target_id)
            .unwrap_or_else(|| sysupdate_core::Target::component(self.target_id.as_str()))
    }
}

#[zbus::interface(name = "org.freedesktop.sysupdate1.Target")]
impl TargetIface {
    #[zbus(property)]
    async fn class(&self) -> String {
        self.target().class.to_string()
    }

    #[zbus(property)]
    async fn name(&self) -> String {
        self.target().name
    }

    #[zbus(property)]
    async fn path(&self) -> String {
        self.target().path
    }

    #[allow(clippy::wrong_self_convention)]
    async fn list(&self, flags: u64, #[zbus(header)] hdr: zbus::message::Header<'_>) -> Result<Vec<String>, BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        Ok(self.engine.list(&self.target_id, flags, &subject).await?)
    }

    async fn describe(&self, version: String, flags: u64, #[zbus(header)] hdr: zbus::message::Header<'_>) -> Result<String, BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        Ok(self.engine.describe(&self.target_id, version, flags, &subject).await?)
    }

    #[zbus(name = "CheckNew")]
    async fn check_new(&self, #[zbus(header)] hdr: zbus::message::Header<'_>) -> Result<String, BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        Ok(self.engine.check_new(&self.target_id, &subject).await?)
    }

    async fn update(
        &self,
        version: String,
        flags: u64,
        #[zbus(header)] hdr: zbus::message::Header<'_>,
    ) -> Result<(String, u64, OwnedObjectPath), BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        let version = if version.is_empty() { None } else { Some(version) };
        let (new_version, id, path) = self.engine.update(&self.target_id, version, flags, &subject).await?;
        let object_path = OwnedObjectPath::try_from(path.as_str())
            .map_err(|e| BusError::WorkerProtocol(format!("invalid job object path {path}: {e}")))?;
        Ok((new_version, id.get(), object_path))
    }

    async fn vacuum(&self, #[zbus(header)] hdr: zbus::message::Header<'_>) -> Result<u64, BusError> {
        let subject = hdr.sender().map(|s| s.to_string()).unwrap_or_default();
        Ok(self.engine.vacuum(&self.target_id, &subject).await?)
    }

    #[zbus(name = "GetAppStream")]
    async fn get_app_stream(&self) -> Result<Vec<String>, BusError> {
        Ok(self.engine.get_appstream(&self.target_id).await?)
    }

    #[zbus(name = "GetVersion")]
    async fn get_version(&self) -> Result<String, BusError> {
        Ok(self.engine.get_version(&self.target_id).await?)
    }
}
