// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target identity and metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of entity a [`Target`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetClass {
    /// The running host system itself.
    Host,
    /// A named sub-component of the host (e.g. a boot loader, firmware blob).
    Component,
    /// A discovered machine image.
    Machine,
    /// A discovered portable service image.
    Portable,
    /// A discovered system extension image.
    Sysext,
    /// A discovered configuration extension image.
    Confext,
}

impl TargetClass {
    /// Image classes that are discovered from the filesystem rather than
    /// queried from the worker's `components` verb.
    pub const IMAGE_CLASSES: [TargetClass; 4] = [
        TargetClass::Machine,
        TargetClass::Portable,
        TargetClass::Sysext,
        TargetClass::Confext,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetClass::Host => "host",
            TargetClass::Component => "component",
            TargetClass::Machine => "machine",
            TargetClass::Portable => "portable",
            TargetClass::Sysext => "sysext",
            TargetClass::Confext => "confext",
        }
    }
}

impl fmt::Display for TargetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The on-disk shape backing an image-class target. Meaningful only for
/// image-class targets (machine/portable/sysext/confext); host and component
/// targets report `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    Directory,
    Subvolume,
    Raw,
    Block,
    #[default]
    Invalid,
}

/// Unique, bus-path-safe identifier for a [`Target`].
///
/// `"host"` for the host target, `"<class>:<name>"` for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    pub const HOST: &'static str = "host";

    pub fn host() -> Self {
        Self(Self::HOST.to_string())
    }

    pub fn new(class: TargetClass, name: &str) -> Self {
        if matches!(class, TargetClass::Host) {
            return Self::host();
        }
        Self(format!("{class}:{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity and metadata for one updatable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub class: TargetClass,
    /// Human identifier: component name, image name, or "" for the host.
    pub name: String,
    /// Filesystem location (image path) or configuration directory name
    /// (`sysupdate.d` / `sysupdate.<name>.d`) for host/component targets.
    pub path: String,
    /// Meaningful only for image-class targets.
    pub image_kind: ImageKind,
}

impl Target {
    pub fn host() -> Self {
        Self {
            id: TargetId::host(),
            class: TargetClass::Host,
            name: String::new(),
            path: "sysupdate.d".to_string(),
            image_kind: ImageKind::Invalid,
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: TargetId::new(TargetClass::Component, &name),
            path: format!("sysupdate.{name}.d"),
            class: TargetClass::Component,
            name,
            image_kind: ImageKind::Invalid,
        }
    }

    pub fn image(class: TargetClass, name: impl Into<String>, path: impl Into<String>, image_kind: ImageKind) -> Self {
        assert!(matches!(
            class,
            TargetClass::Machine | TargetClass::Portable | TargetClass::Sysext | TargetClass::Confext
        ));
        let name = name.into();
        Self {
            id: TargetId::new(class, &name),
            class,
            name,
            path: path.into(),
            image_kind,
        }
    }

    /// The selector argument passed on the worker command line for this
    /// target, if any (the host target has no selector).
    pub fn selector_arg(&self) -> Option<String> {
        match self.class {
            TargetClass::Host => None,
            TargetClass::Component => Some(format!("--component={}", self.name)),
            TargetClass::Machine | TargetClass::Portable | TargetClass::Sysext | TargetClass::Confext => {
                match self.image_kind {
                    ImageKind::Directory | ImageKind::Subvolume => Some(format!("--root={}", self.path)),
                    ImageKind::Raw | ImageKind::Block => Some(format!("--image={}", self.path)),
                    ImageKind::Invalid => None,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
