// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target registry and discovery: lazy, ephemeral enumeration of
//! [`Target`]s. Populated on first external need, flushed whenever the job
//! map becomes empty.

use crate::discovery::ImageDiscovery;
use std::collections::HashMap;
use std::path::Path;
use sysupdate_core::{Target, TargetClass, TargetId};
use sysupdate_worker::run_components_query;

#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: HashMap<TargetId, Target>,
    populated: bool,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self { targets: HashMap::new(), populated: false }
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Empties the registry; only valid while no jobs reference any target
    /// (the caller — the idle check — is responsible for that invariant).
    pub fn flush(&mut self) {
        self.targets.clear();
        self.populated = false;
    }

    pub fn get(&self, id: &TargetId) -> Option<&Target> {
        self.targets.get(id)
    }

    pub fn get_mut(&mut self, id: &TargetId) -> Option<&mut Target> {
        self.targets.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.targets.contains_key(id)
    }

    /// Seeds one target directly and marks the registry populated, bypassing
    /// discovery. Used by tests in other modules that need a known target
    /// without standing up a fake filesystem and worker script.
    #[cfg(test)]
    pub fn insert(&mut self, target: Target) {
        self.targets.insert(target.id.clone(), target);
        self.populated = true;
    }

    /// Rebuilds the registry from scratch, two-phase:
    /// image classes first (each kept only if it reports a default
    /// component), then the host and its named components. Per-image
    /// failures are logged and the image is skipped rather than aborting
    /// the whole rebuild; a host query failure leaves the registry with
    /// whatever images were already found.
    pub async fn rebuild(&mut self, discovery: &dyn ImageDiscovery, binary: &str, verify_no: bool, notify_socket_path: &Path) {
        self.targets.clear();

        for class in TargetClass::IMAGE_CLASSES {
            let images = match discovery.discover(class).await {
                Ok(images) => images,
                Err(err) => {
                    tracing::warn!(%class, error = %err, "image discovery failed");
                    continue;
                }
            };
            for image in images {
                let target = Target::image(image.class, &image.name, &image.path, image.image_kind);
                match run_components_query(binary, Some(&target), verify_no, notify_socket_path).await {
                    Ok(doc) => {
                        if doc.get("default").and_then(|v| v.as_bool()).unwrap_or(false) {
                            self.targets.insert(target.id.clone(), target);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(target = %target.id, error = %err, "components query failed during discovery");
                    }
                }
            }
        }

        match run_components_query(binary, None, verify_no, notify_socket_path).await {
            Ok(doc) => {
                if doc.get("default").and_then(|v| v.as_bool()).unwrap_or(false) {
                    let host = Target::host();
                    self.targets.insert(host.id.clone(), host);
                }
                if let Some(names) = doc.get("components").and_then(|v| v.as_array()) {
                    for name in names.iter().filter_map(|v| v.as_str()) {
                        let component = Target::component(name);
                        self.targets.insert(component.id.clone(), component);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "host components query failed during discovery");
            }
        }

        self.populated = true;
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
