// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sysupdate_core::{ImageKind, TargetClass};

fn os(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn host_list_has_no_selector() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::List,
        version: None,
        offline: false,
        verify_no: false,
    };
    assert_eq!(os(&build_argv(&req)), vec!["systemd-sysupdate", "--json=short", "list"]);
}

#[test]
fn component_target_selector_present() {
    let target = Target::component("bootloader");
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::CheckNew,
        version: None,
        offline: false,
        verify_no: false,
    };
    assert_eq!(
        os(&build_argv(&req)),
        vec!["systemd-sysupdate", "--json=short", "--component=bootloader", "check-new"]
    );
}

#[test]
fn describe_appends_list_verb_and_version() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::Describe,
        version: Some("2.0"),
        offline: false,
        verify_no: false,
    };
    assert_eq!(os(&build_argv(&req)), vec!["systemd-sysupdate", "--json=short", "list", "2.0"]);
}

#[test]
fn update_without_version_means_latest() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::Update,
        version: None,
        offline: false,
        verify_no: false,
    };
    assert_eq!(os(&build_argv(&req)), vec!["systemd-sysupdate", "--json=short", "update"]);
}

#[test]
fn update_with_version_appends_it() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::Update,
        version: Some("9.9"),
        offline: false,
        verify_no: false,
    };
    assert_eq!(os(&build_argv(&req)), vec!["systemd-sysupdate", "--json=short", "update", "9.9"]);
}

#[test]
fn offline_flag_precedes_verb() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::List,
        version: None,
        offline: true,
        verify_no: false,
    };
    assert_eq!(
        os(&build_argv(&req)),
        vec!["systemd-sysupdate", "--json=short", "--offline", "list"]
    );
}

#[test]
fn verify_no_is_first_optional_flag() {
    let target = Target::host();
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::Vacuum,
        version: None,
        offline: false,
        verify_no: true,
    };
    assert_eq!(
        os(&build_argv(&req)),
        vec!["systemd-sysupdate", "--json=short", "--verify=no", "vacuum"]
    );
}

#[test]
fn raw_image_uses_image_selector_arg() {
    let target = Target::image(TargetClass::Machine, "foo", "/var/lib/machines/foo.raw", ImageKind::Raw);
    let req = ArgvRequest {
        binary: "systemd-sysupdate",
        target: &target,
        kind: JobKind::List,
        version: None,
        offline: false,
        verify_no: false,
    };
    assert_eq!(
        os(&build_argv(&req)),
        vec!["systemd-sysupdate", "--json=short", "--image=/var/lib/machines/foo.raw", "list"]
    );
}
