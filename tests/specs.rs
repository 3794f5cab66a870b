// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios spanning discovery, the worker protocol, policy
//! authorization, and the job engine together — the seams that the
//! per-crate unit tests necessarily exercise in isolation.

use async_trait::async_trait;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use sysupdate_core::{TargetClass, TargetId};
use sysupdate_daemon::discovery::{DiscoveredImage, ImageDiscovery};
use sysupdate_daemon::{DaemonConfig, Engine};
use sysupdate_policy::FakePolicyGate;

struct NoImages;

#[async_trait]
impl ImageDiscovery for NoImages {
    async fn discover(&self, _class: TargetClass) -> std::io::Result<Vec<DiscoveredImage>> {
        Ok(Vec::new())
    }
}

/// A worker stand-in that answers every verb at once: `run_components_query`
/// reads `default`/`components`, `List` reads `all`, `CheckNew` reads
/// `available`, `Vacuum` reads `removed`. One fixed script can play every
/// role an end-to-end flow needs.
fn omniscient_worker() -> tempfile::TempPath {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        "#!/bin/sh\nprintf '%s' '{{\"default\":true,\"components\":[\"bootloader\"],\"all\":[\"1.0.0\",\"2.0.0\"],\"available\":\"2.0.0\",\"removed\":1}}'"
    )
    .expect("write script");
    let mut perms = file.as_file().metadata().expect("metadata").permissions();
    perms.set_mode(0o755);
    file.as_file().set_permissions(perms).expect("chmod");
    file.into_temp_path()
}

fn engine_with(binary: &std::path::Path, policy: std::sync::Arc<dyn sysupdate_policy::PolicyGate>) -> Engine {
    let config = DaemonConfig { worker_binary: binary.to_str().expect("utf8 path").to_string(), ..DaemonConfig::default() };
    Engine::new(config, policy, std::sync::Arc::new(NoImages))
}

#[tokio::test]
async fn discovery_surfaces_host_and_its_components() {
    let script = omniscient_worker();
    let engine = engine_with(&script, std::sync::Arc::new(FakePolicyGate::allow()));

    engine.ensure_targets().await;
    let mut ids: Vec<String> = engine.list_targets().into_iter().map(|t| t.id.to_string()).collect();
    ids.sort();

    assert_eq!(ids, vec!["component:bootloader".to_string(), "host".to_string()]);
}

#[tokio::test]
async fn list_check_new_and_vacuum_round_trip_through_the_worker() {
    let script = omniscient_worker();
    let engine = engine_with(&script, std::sync::Arc::new(FakePolicyGate::allow()));
    engine.ensure_targets().await;

    let versions = engine.list(&TargetId::host(), 0, ":1.1").await.expect("list should succeed");
    assert_eq!(versions, vec!["1.0.0".to_string(), "2.0.0".to_string()]);

    let available = engine.check_new(&TargetId::host(), ":1.1").await.expect("check-new should succeed");
    assert_eq!(available, "2.0.0");

    let component = TargetId::new(TargetClass::Component, "bootloader");
    let removed = engine.vacuum(&component, ":1.1").await.expect("vacuum should succeed");
    assert_eq!(removed, 1);

    // Both jobs completed inline; the engine returns to idle and the
    // registry is eligible to be flushed on the next idle check.
    assert!(engine.is_idle());
}

#[tokio::test]
async fn policy_denial_blocks_every_mutating_action_before_a_worker_runs() {
    let script = omniscient_worker();
    let policy = std::sync::Arc::new(FakePolicyGate::deny());
    let engine = engine_with(&script, policy.clone());
    engine.ensure_targets().await;

    let err = engine.vacuum(&TargetId::host(), ":1.7").await.expect_err("should be denied");
    assert!(matches!(err, sysupdate_core::SysupdateError::AuthDenied(_)));

    let err = engine
        .update(&TargetId::host(), None, 0, ":1.7")
        .await
        .expect_err("update should be denied too");
    assert!(matches!(err, sysupdate_core::SysupdateError::AuthDenied(_)));

    // Denied calls still go through the policy gate and leave a record of
    // who was denied, even though no job was ever created.
    assert_eq!(policy.calls().len(), 2);
    assert!(engine.is_idle());
}

#[tokio::test]
async fn operating_on_an_undiscovered_target_is_rejected_as_invalid_args() {
    let script = omniscient_worker();
    let engine = engine_with(&script, std::sync::Arc::new(FakePolicyGate::allow()));
    engine.ensure_targets().await;

    let missing = TargetId::new(TargetClass::Machine, "nonexistent");
    let err = engine.describe(&missing, "1.0.0".to_string(), 0, ":1.9").await.expect_err("should be unknown");
    assert!(matches!(err, sysupdate_core::SysupdateError::InvalidArgs(_)));
}
