// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image discovery: enumerating machine, portable, sysext, and confext
//! images from the filesystem is an external collaborator — the real
//! `sysupdated` delegates this to `libsystemd`'s image discovery routines.
//! We model it as a narrow trait so the registry rebuild logic is
//! exercised in tests without touching the filesystem, backed by a thin
//! default implementation that walks one conventional search directory per
//! image class.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sysupdate_core::{ImageKind, TargetClass};

/// One image found by discovery, before the registry decides whether it has
/// a default component and is worth keeping as a [`sysupdate_core::Target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredImage {
    pub class: TargetClass,
    pub name: String,
    pub path: String,
    pub image_kind: ImageKind,
}

/// Enumerates images of the machine/portable/sysext/confext classes.
#[async_trait]
pub trait ImageDiscovery: Send + Sync {
    async fn discover(&self, class: TargetClass) -> std::io::Result<Vec<DiscoveredImage>>;
}

/// Walks one conventional directory per image class, classifying each entry
/// by its filesystem shape.
pub struct FsImageDiscovery {
    search_dirs: Vec<(TargetClass, PathBuf)>,
}

impl FsImageDiscovery {
    /// The directories `systemd-sysupdate`'s own image discovery searches
    /// for each class, in priority order. We search only the first; a
    /// production discovery library also merges `/usr/lib`, `/etc`, and
    /// `/run` overlays, which is exactly the part delegated out of scope.
    pub fn conventional() -> Self {
        Self {
            search_dirs: vec![
                (TargetClass::Machine, PathBuf::from("/var/lib/machines")),
                (TargetClass::Portable, PathBuf::from("/var/lib/portables")),
                (TargetClass::Sysext, PathBuf::from("/var/lib/extensions")),
                (TargetClass::Confext, PathBuf::from("/var/lib/confexts")),
            ],
        }
    }
}

impl Default for FsImageDiscovery {
    fn default() -> Self {
        Self::conventional()
    }
}

#[async_trait]
impl ImageDiscovery for FsImageDiscovery {
    async fn discover(&self, class: TargetClass) -> std::io::Result<Vec<DiscoveredImage>> {
        let Some((_, dir)) = self.search_dirs.iter().find(|(c, _)| *c == class) else {
            return Ok(Vec::new());
        };
        let dir = dir.clone();
        tokio::task::spawn_blocking(move || scan_dir(class, &dir))
            .await
            .unwrap_or_else(|join_err| Err(std::io::Error::other(join_err)))
    }
}

fn scan_dir(class: TargetClass, dir: &Path) -> std::io::Result<Vec<DiscoveredImage>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // The directory simply not existing is normal (not every class is
        // populated on every host); anything else is a real error.
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let image_kind = if file_type.is_dir() {
            // TODO: distinguishing a plain directory from a btrfs subvolume
            // needs a btrfs ioctl; the real discovery library does this, we
            // always report Directory.
            ImageKind::Directory
        } else if file_type.is_file() {
            ImageKind::Raw
        } else if file_type.is_symlink() {
            match std::fs::metadata(entry.path()) {
                Ok(meta) if is_block_device(&meta) => ImageKind::Block,
                Ok(_) => ImageKind::Raw,
                Err(_) => continue,
            }
        } else {
            continue;
        };

        images.push(DiscoveredImage {
            class,
            path: entry.path().to_string_lossy().into_owned(),
            name,
            image_kind,
        });
    }
    images.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(images)
}

#[cfg(unix)]
fn is_block_device(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;
    meta.file_type().is_block_device()
}

#[cfg(not(unix))]
fn is_block_device(_meta: &std::fs::Metadata) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_yields_no_images() {
        let discovery = FsImageDiscovery { search_dirs: vec![(TargetClass::Machine, PathBuf::from("/nonexistent/path/for/tests"))] };
        let images = discovery.discover(TargetClass::Machine).await.expect("discover should not error");
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn discovers_directories_and_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("foo.raw")).expect("mkdir");
        std::fs::write(tmp.path().join("bar.raw"), b"not really raw").expect("write");
        std::fs::write(tmp.path().join(".hidden"), b"").expect("write hidden");

        let discovery = FsImageDiscovery { search_dirs: vec![(TargetClass::Sysext, tmp.path().to_path_buf())] };
        let mut images = discovery.discover(TargetClass::Sysext).await.expect("discover");
        images.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name, "bar.raw");
        assert_eq!(images[0].image_kind, ImageKind::Raw);
        assert_eq!(images[1].name, "foo.raw");
        assert_eq!(images[1].image_kind, ImageKind::Directory);
    }

    #[tokio::test]
    async fn unconfigured_class_yields_no_images() {
        let discovery = FsImageDiscovery { search_dirs: vec![] };
        let images = discovery.discover(TargetClass::Portable).await.expect("discover");
        assert!(images.is_empty());
    }
}
