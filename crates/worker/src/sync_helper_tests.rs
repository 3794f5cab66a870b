// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use sysupdate_core::{JobKind, Target};

/// Writes an executable shell script that ignores its arguments and prints
/// fixed JSON to stdout, for exercising `run_worker_sync`'s happy path
/// without a real `systemd-sysupdate` binary.
fn fake_worker_script(json: &str) -> tempfile::TempPath {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "#!/bin/sh\nprintf '%s' '{json}'").expect("write script");
    let mut perms = file.as_file().metadata().expect("metadata").permissions();
    perms.set_mode(0o755);
    file.as_file().set_permissions(perms).expect("chmod");
    file.into_temp_path()
}

#[tokio::test]
async fn parses_stdout_json() {
    let script = fake_worker_script(r#"{"components":["a","b"],"default":true}"#);
    let req = ArgvRequest {
        binary: script.to_str().expect("utf8 path"),
        target: &Target::host(),
        kind: JobKind::List,
        version: None,
        offline: false,
        verify_no: false,
    };
    let value = run_worker_sync(&req, std::path::Path::new("/run/sysupdate/notify"))
        .await
        .expect("should succeed");
    assert_eq!(value["components"], serde_json::json!(["a", "b"]));
    assert_eq!(value["default"], serde_json::json!(true));
}

#[tokio::test]
async fn non_zero_exit_is_an_error() {
    let req = ArgvRequest {
        binary: "/bin/false",
        target: &Target::host(),
        kind: JobKind::CheckNew,
        version: None,
        offline: false,
        verify_no: false,
    };
    let err = run_worker_sync(&req, std::path::Path::new("/run/sysupdate/notify"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, SyncHelperError::NonZeroExit(_)));
}

#[tokio::test]
async fn components_query_scopes_to_target() {
    let script = fake_worker_script(r#"{"default":true,"components":["bootloader"]}"#);
    let value = run_components_query(
        script.to_str().expect("utf8 path"),
        Some(&Target::component("bootloader")),
        false,
        std::path::Path::new("/run/sysupdate/notify"),
    )
    .await
    .expect("should succeed");
    assert_eq!(value["default"], serde_json::json!(true));
    assert_eq!(value["components"], serde_json::json!(["bootloader"]));
}

#[tokio::test]
async fn components_query_host_has_no_selector() {
    let script = fake_worker_script(r#"{"default":false,"components":[]}"#);
    let value = run_components_query(script.to_str().expect("utf8 path"), None, false, std::path::Path::new("/run/sysupdate/notify"))
        .await
        .expect("should succeed");
    assert_eq!(value["default"], serde_json::json!(false));
}

#[tokio::test]
async fn success_with_empty_stdout_is_empty_object() {
    let req = ArgvRequest {
        binary: "/bin/true",
        target: &Target::host(),
        kind: JobKind::CheckNew,
        version: None,
        offline: false,
        verify_no: false,
    };
    let value = run_worker_sync(&req, std::path::Path::new("/run/sysupdate/notify"))
        .await
        .expect("should succeed");
    assert_eq!(value, serde_json::json!({}));
}
