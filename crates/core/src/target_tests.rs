// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn host_id_is_always_host() {
    assert_eq!(TargetId::host().as_str(), "host");
    assert_eq!(TargetId::new(TargetClass::Host, "whatever").as_str(), "host");
}

#[test]
fn component_id_is_class_colon_name() {
    let id = TargetId::new(TargetClass::Component, "bootloader");
    assert_eq!(id.as_str(), "component:bootloader");
}

#[test]
fn host_target_has_no_selector() {
    assert_eq!(Target::host().selector_arg(), None);
}

#[test]
fn component_target_selector() {
    let t = Target::component("bootloader");
    assert_eq!(t.selector_arg().as_deref(), Some("--component=bootloader"));
    assert_eq!(t.path, "sysupdate.bootloader.d");
}

#[test]
fn directory_image_uses_root_selector() {
    let t = Target::image(TargetClass::Machine, "foo", "/var/lib/machines/foo", ImageKind::Directory);
    assert_eq!(t.selector_arg().as_deref(), Some("--root=/var/lib/machines/foo"));
}

#[test]
fn raw_image_uses_image_selector() {
    let t = Target::image(TargetClass::Portable, "foo", "/var/lib/portables/foo.raw", ImageKind::Raw);
    assert_eq!(t.selector_arg().as_deref(), Some("--image=/var/lib/portables/foo.raw"));
}

#[test]
fn invalid_image_kind_has_no_selector() {
    let t = Target::image(TargetClass::Sysext, "foo", "/nowhere", ImageKind::Invalid);
    assert_eq!(t.selector_arg(), None);
}
