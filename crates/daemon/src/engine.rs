// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job lifecycle engine: authorization, worker
//! spawning, child-exit handling, and the detach protocol for `Update`. This
//! is the one module in the crate with no `zbus` interface macros in it —
//! everything here is plain `async fn`s on [`Engine`], exercised in tests
//! with [`sysupdate_policy::FakePolicyGate`] and a fake worker script rather
//! than a live bus connection.

use crate::config::DaemonConfig;
use crate::discovery::ImageDiscovery;
use crate::job_record::JobRecord;
use crate::registry::TargetRegistry;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use sysupdate_core::{JobFlags, JobId, JobIdGen, JobKind, JobSummary, SysupdateError, Target, TargetId};
use sysupdate_policy::{PolicyAction, PolicyDecision, PolicyDetails, PolicyError, PolicyGate};
use sysupdate_worker::{spawn_worker, ArgvRequest, SpawnedWorker, WorkerConfig};
use zbus::Connection;

struct Inner {
    config: DaemonConfig,
    id_gen: JobIdGen,
    jobs: HashMap<JobId, JobRecord>,
    targets: TargetRegistry,
    /// Targets with a mutating job (`Update`/`Vacuum`) currently running
    /// Kept out of [`Target`] itself, which is a
    /// plain, `Serialize`-able value type with no notion of engine state.
    busy_targets: HashSet<TargetId>,
    policy: Arc<dyn PolicyGate>,
    discovery: Arc<dyn ImageDiscovery>,
    connection: Option<Connection>,
}

/// Shared handle to the engine's state. Cheap to clone (an `Arc` underneath);
/// every background task (notify dispatch, a detached job's reaper) holds
/// its own clone rather than a borrow, since each outlives the RMI call that
/// spawned it.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Mutex<Inner>>,
}

impl Engine {
    pub fn new(config: DaemonConfig, policy: Arc<dyn PolicyGate>, discovery: Arc<dyn ImageDiscovery>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                id_gen: JobIdGen::new(),
                jobs: HashMap::new(),
                targets: TargetRegistry::new(),
                busy_targets: HashSet::new(),
                policy,
                discovery,
                connection: None,
            })),
        }
    }

    pub fn set_connection(&self, connection: Connection) {
        self.inner.lock().connection = Some(connection);
    }

    fn connection(&self) -> Option<Connection> {
        self.inner.lock().connection.clone()
    }

    fn policy(&self) -> Arc<dyn PolicyGate> {
        self.inner.lock().policy.clone()
    }

    fn discovery(&self) -> Arc<dyn ImageDiscovery> {
        self.inner.lock().discovery.clone()
    }

    fn worker_config(&self) -> WorkerConfig {
        self.inner.lock().config.worker_config()
    }

    /// Idle means no jobs outstanding.
    pub fn is_idle(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    /// Populates the target registry if it hasn't been already. Two
    /// concurrent callers racing here both rebuild and the second write
    /// simply wins — harmless, since rebuild is idempotent and the registry
    /// is never read mid-rebuild by its own callers (the lock is only held
    /// for the final swap).
    pub async fn ensure_targets(&self) {
        if self.inner.lock().targets.is_populated() {
            return;
        }
        let discovery = self.discovery();
        let wc = self.worker_config();
        let mut fresh = TargetRegistry::new();
        fresh.rebuild(discovery.as_ref(), &wc.binary, wc.verify_no, &wc.notify_socket_path()).await;
        self.inner.lock().targets = fresh;
    }

    pub fn list_targets(&self) -> Vec<Target> {
        self.inner.lock().targets.iter().cloned().collect()
    }

    fn require_target(&self, id: &TargetId) -> Result<Target, SysupdateError> {
        self.inner.lock().targets.get(id).cloned().ok_or_else(|| SysupdateError::InvalidArgs(format!("unknown target: {id}")))
    }

    pub fn list_jobs(&self) -> Vec<JobSummary> {
        let inner = self.inner.lock();
        inner
            .jobs
            .iter()
            .map(|(id, r)| JobSummary {
                id: *id,
                kind: r.kind,
                target: r.target.clone(),
                version: r.version.clone(),
                offline: r.offline,
                progress: r.progress,
                object_path: id.object_path(),
            })
            .collect()
    }

    pub fn job_snapshot(&self, id: JobId) -> Option<JobSummary> {
        let inner = self.inner.lock();
        inner.jobs.get(&id).map(|r| JobSummary {
            id,
            kind: r.kind,
            target: r.target.clone(),
            version: r.version.clone(),
            offline: r.offline,
            progress: r.progress,
            object_path: id.object_path(),
        })
    }

    async fn authorize(&self, action: PolicyAction, subject: &str, target: &Target, version: Option<&str>, offline: bool) -> Result<(), SysupdateError> {
        let details = PolicyDetails { class: target.class.to_string(), name: target.name.clone(), version: version.map(str::to_string), offline };
        match self.policy().check(action, subject, &details).await.map_err(policy_error)? {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny => Err(SysupdateError::AuthDenied(format!("not authorized for {}", action.action_id()))),
            PolicyDecision::Interactive => Err(SysupdateError::AuthInteractive),
        }
    }

    // ---- non-mutating / mutating inline jobs (List, Describe, CheckNew, Vacuum) ----

    pub async fn list(&self, target_id: &TargetId, flags: u64, subject: &str) -> Result<Vec<String>, SysupdateError> {
        let flags = parse_flags(flags)?;
        self.ensure_targets().await;
        let target = self.require_target(target_id)?;
        let offline = flags.contains(JobFlags::OFFLINE);
        self.authorize(PolicyAction::Check, subject, &target, None, offline).await?;
        let json = self.run_inline_job(JobKind::List, target, None, offline).await?;
        let all = json.get("all").and_then(|v| v.as_array()).ok_or_else(|| SysupdateError::WorkerProtocol("missing 'all' array".into()))?;
        all.iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| SysupdateError::WorkerProtocol("'all' entries must be strings".into())))
            .collect()
    }

    pub async fn describe(&self, target_id: &TargetId, version: String, flags: u64, subject: &str) -> Result<String, SysupdateError> {
        if version.is_empty() {
            return Err(SysupdateError::InvalidArgs("version must not be empty".into()));
        }
        let flags = parse_flags(flags)?;
        self.ensure_targets().await;
        let target = self.require_target(target_id)?;
        let offline = flags.contains(JobFlags::OFFLINE);
        self.authorize(PolicyAction::Check, subject, &target, Some(&version), offline).await?;
        let json = self.run_inline_job(JobKind::Describe, target, Some(version), offline).await?;
        serde_json::to_string(&json).map_err(|e| SysupdateError::WorkerProtocol(e.to_string()))
    }

    pub async fn check_new(&self, target_id: &TargetId, subject: &str) -> Result<String, SysupdateError> {
        self.ensure_targets().await;
        let target = self.require_target(target_id)?;
        self.authorize(PolicyAction::Check, subject, &target, None, false).await?;
        let json = self.run_inline_job(JobKind::CheckNew, target, None, false).await?;
        match json.get("available") {
            None | Some(serde_json::Value::Null) => Ok(String::new()),
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(SysupdateError::WorkerProtocol("'available' must be a string or null".into())),
        }
    }

    pub async fn vacuum(&self, target_id: &TargetId, subject: &str) -> Result<u64, SysupdateError> {
        self.ensure_targets().await;
        let target = self.require_target(target_id)?;
        self.authorize(PolicyAction::Vacuum, subject, &target, None, false).await?;
        let json = self.run_inline_job(JobKind::Vacuum, target, None, false).await?;
        json.get("removed").and_then(|v| v.as_u64()).ok_or_else(|| SysupdateError::WorkerProtocol("missing 'removed' count".into()))
    }

    pub async fn get_version(&self, target_id: &TargetId) -> Result<String, SysupdateError> {
        let target = self.require_target(target_id)?;
        let wc = self.worker_config();
        let req = ArgvRequest { binary: &wc.binary, target: &target, kind: JobKind::CheckNew, version: None, offline: false, verify_no: wc.verify_no };
        let json = sysupdate_worker::run_worker_sync(&req, &wc.notify_socket_path()).await.map_err(|e| SysupdateError::WorkerProtocol(e.to_string()))?;
        Ok(json.get("current").and_then(|v| v.as_str()).unwrap_or_default().to_string())
    }

    pub async fn get_appstream(&self, target_id: &TargetId) -> Result<Vec<String>, SysupdateError> {
        let target = self.require_target(target_id)?;
        let wc = self.worker_config();
        let req = ArgvRequest { binary: &wc.binary, target: &target, kind: JobKind::List, version: None, offline: false, verify_no: wc.verify_no };
        let json = sysupdate_worker::run_worker_sync(&req, &wc.notify_socket_path()).await.map_err(|e| SysupdateError::WorkerProtocol(e.to_string()))?;
        Ok(json
            .get("appstream_urls")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default())
    }

    pub async fn list_appstream(&self) -> Result<Vec<String>, SysupdateError> {
        self.ensure_targets().await;
        let mut urls = std::collections::BTreeSet::new();
        for target in self.list_targets() {
            if let Ok(target_urls) = self.get_appstream(&target.id).await {
                urls.extend(target_urls);
            }
        }
        Ok(urls.into_iter().collect())
    }

    /// Registers, spawns, and waits out a job that replies at child exit
    /// rather than detaching (every kind but `Update`).
    async fn run_inline_job(&self, kind: JobKind, target: Target, version: Option<String>, offline: bool) -> Result<serde_json::Value, SysupdateError> {
        let id = {
            let mut inner = self.inner.lock();
            if kind.is_mutating() && inner.busy_targets.contains(&target.id) {
                return Err(SysupdateError::Busy);
            }
            let id = inner.id_gen.next();
            inner.jobs.insert(id, JobRecord::new(kind, target.id.clone(), version.clone(), offline));
            if kind.is_mutating() {
                inner.busy_targets.insert(target.id.clone());
            }
            id
        };

        let wc = self.worker_config();
        let req = ArgvRequest { binary: &wc.binary, target: &target, kind, version: version.as_deref(), offline, verify_no: wc.verify_no };
        let spawned = match spawn_worker(&req, &wc.notify_socket_path()) {
            Ok(s) => s,
            Err(err) => {
                self.abort_job(id, &target.id, kind);
                return Err(SysupdateError::WorkerProtocol(format!("failed to spawn worker: {err}")));
            }
        };
        let SpawnedWorker { mut child, stdout_capture } = spawned;
        let pid = child.id().map(|p| p as i32);
        if let Some(r) = self.inner.lock().jobs.get_mut(&id) {
            r.pid = pid;
        }

        let status = child.wait().await;
        self.reap_and_remove(id, &target.id, kind, status, stdout_capture)
    }

    fn abort_job(&self, id: JobId, target_id: &TargetId, kind: JobKind) {
        let mut inner = self.inner.lock();
        if kind.is_mutating() {
            inner.busy_targets.remove(target_id);
        }
        inner.jobs.remove(&id);
        if inner.jobs.is_empty() {
            inner.targets.flush();
        }
    }

    /// Child-exit handling shared by every job kind. Emitting `JobRemoved`
    /// and dispatching the RMI reply are the caller's job, since a detached
    /// job reaches this via a different path than an inline one.
    fn reap_and_remove(&self, id: JobId, target_id: &TargetId, kind: JobKind, wait_result: io::Result<ExitStatus>, stdout_capture: File) -> Result<serde_json::Value, SysupdateError> {
        let errno = self.inner.lock().jobs.get(&id).and_then(|r| r.errno);

        let outcome = match wait_result {
            Err(err) => Err(SysupdateError::WorkerProtocol(format!("failed to reap worker: {err}"))),
            Ok(status) => translate_status(&status, errno)
                .and_then(|()| sysupdate_worker::read_captured_json(stdout_capture).map_err(|err| SysupdateError::WorkerProtocol(err.to_string()))),
        };

        self.abort_job(id, target_id, kind);
        outcome
    }

    // ---- Update: detached ----

    pub async fn update(&self, target_id: &TargetId, version: Option<String>, flags: u64, subject: &str) -> Result<(String, JobId, String), SysupdateError> {
        if flags != 0 {
            return Err(SysupdateError::InvalidArgs("Update accepts no flags".into()));
        }
        self.ensure_targets().await;
        let target = self.require_target(target_id)?;
        let action = if version.is_some() { PolicyAction::UpdateToVersion } else { PolicyAction::Update };
        self.authorize(action, subject, &target, version.as_deref(), false).await?;

        let (id, mut ready_rx) = {
            let mut inner = self.inner.lock();
            if inner.busy_targets.contains(&target.id) {
                return Err(SysupdateError::Busy);
            }
            let id = inner.id_gen.next();
            let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
            let mut record = JobRecord::new(JobKind::Update, target.id.clone(), version.clone(), false);
            record.ready_tx = Some(ready_tx);
            inner.jobs.insert(id, record);
            inner.busy_targets.insert(target.id.clone());
            (id, ready_rx)
        };

        let wc = self.worker_config();
        let req = ArgvRequest { binary: &wc.binary, target: &target, kind: JobKind::Update, version: version.as_deref(), offline: false, verify_no: wc.verify_no };
        let spawned = match spawn_worker(&req, &wc.notify_socket_path()) {
            Ok(s) => s,
            Err(err) => {
                self.abort_job(id, &target.id, JobKind::Update);
                return Err(SysupdateError::WorkerProtocol(format!("failed to spawn worker: {err}")));
            }
        };
        let SpawnedWorker { mut child, stdout_capture } = spawned;
        let pid = child.id().map(|p| p as i32);
        if let Some(r) = self.inner.lock().jobs.get_mut(&id) {
            r.pid = pid;
        }

        tokio::select! {
            ready = &mut ready_rx => {
                let _ = ready;
                let (version_now, path) = {
                    let inner = self.inner.lock();
                    match inner.jobs.get(&id) {
                        Some(record) => (record.version.clone().unwrap_or_default(), id.object_path()),
                        // Reaped out from under us between the ready signal and this lock
                        // acquisition; fall back to the version the caller originally asked for.
                        None => (version.clone().unwrap_or_default(), id.object_path()),
                    }
                };
                if let Some(connection) = self.connection() {
                    let iface = crate::bus::job::JobIface { engine: self.clone(), job_id: id };
                    if let Err(err) = connection.object_server().at(path.clone(), iface).await {
                        tracing::warn!(job = %id, error = %err, "failed to serve job object");
                    }
                }
                let engine = self.clone();
                let target_id = target.id.clone();
                tokio::spawn(async move {
                    let status = child.wait().await;
                    engine.finish_detached(id, target_id, status, stdout_capture).await;
                });
                Ok((version_now, id, path))
            }
            status = child.wait() => {
                let result = self.reap_and_remove(id, &target.id, JobKind::Update, status, stdout_capture);
                match result {
                    Ok(_) => Err(SysupdateError::NoUpdateCandidate),
                    Err(err) => Err(err),
                }
            }
        }
    }

    async fn finish_detached(&self, id: JobId, target_id: TargetId, wait_result: io::Result<ExitStatus>, stdout_capture: File) {
        let errno = self.inner.lock().jobs.get(&id).and_then(|r| r.errno);
        let status_value = match &wait_result {
            Ok(status) => status_to_signal_value(status, errno),
            Err(_) => errno.map(|e| -e).unwrap_or(-1),
        };
        let path = id.object_path();
        self.reap_and_remove(id, &target_id, JobKind::Update, wait_result, stdout_capture);

        if let Some(connection) = self.connection() {
            let _ = connection.object_server().remove::<crate::bus::job::JobIface, _>(path.as_str()).await;
            crate::signals::emit_job_removed(&connection, id, &path, status_value).await;
        }
    }

    // ---- Cancel ----

    pub async fn cancel(&self, id: JobId, subject: &str) -> Result<(), SysupdateError> {
        let (kind, version, pid, target_id) = {
            let inner = self.inner.lock();
            let record = inner.jobs.get(&id).ok_or_else(|| SysupdateError::InvalidArgs(format!("no such job: {id}")))?;
            (record.kind, record.version.clone(), record.pid, record.target.clone())
        };

        let target = { self.inner.lock().targets.get(&target_id).cloned() };
        let action = policy_action_for(kind, version.as_deref());
        let details = PolicyDetails {
            class: target.as_ref().map(|t| t.class.to_string()).unwrap_or_default(),
            name: target.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            version: version.clone(),
            offline: false,
        };
        match self.policy().check(action, subject, &details).await.map_err(policy_error)? {
            PolicyDecision::Allow => {}
            PolicyDecision::Deny => return Err(SysupdateError::AuthDenied("not authorized to cancel this job".into())),
            PolicyDecision::Interactive => return Err(SysupdateError::AuthInteractive),
        }

        let attempt = {
            let mut inner = self.inner.lock();
            match inner.jobs.get_mut(&id) {
                Some(record) => {
                    record.cancel_attempts += 1;
                    record.cancel_attempts
                }
                None => return Err(SysupdateError::InvalidArgs(format!("job {id} already finished"))),
            }
        };

        if let Some(pid) = pid {
            sysupdate_worker::cancel(pid, attempt).map_err(|err| SysupdateError::WorkerProtocol(format!("failed to signal worker: {err}")))?;
        }
        Ok(())
    }

    /// Apply one parsed notify-channel datagram.
    pub async fn apply_notification(&self, pid: i32, msg: sysupdate_core::NotifyMessage) {
        let outcome = {
            let mut inner = self.inner.lock();
            let Some(id) = inner.jobs.iter().find(|(_, r)| r.pid == Some(pid)).map(|(id, _)| *id) else {
                tracing::warn!(pid, "notification from unknown worker pid");
                return;
            };
            let object_path = id.object_path();
            let Some(record) = inner.jobs.get_mut(&id) else {
                tracing::warn!(pid, job = %id, "job vanished between lookup and update");
                return;
            };

            if let Some(v) = msg.version() {
                record.version = Some(v.to_string());
            }
            let progress_changed = msg.progress().map(|p| {
                record.progress = p;
                p
            });
            if msg.had_rejected_progress() {
                tracing::warn!(pid, job = %id, "dropping out-of-range progress report");
            }
            if let Some(errno) = msg.errno() {
                record.errno = Some(errno);
            }
            let ready_tx = if msg.is_ready() { record.ready_tx.take() } else { None };

            (object_path, progress_changed, ready_tx, inner.connection.clone())
        };
        let (object_path, progress_changed, ready_tx, connection) = outcome;

        if let Some(tx) = ready_tx {
            let _ = tx.send(());
        }
        if let (Some(progress), Some(connection)) = (progress_changed, connection) {
            crate::signals::emit_progress_changed(&connection, &object_path, progress).await;
        }
    }
}

fn parse_flags(raw: u64) -> Result<JobFlags, SysupdateError> {
    JobFlags::from_bits(raw).ok_or_else(|| SysupdateError::InvalidArgs("unknown flag bits".into()))
}

fn policy_action_for(kind: JobKind, version: Option<&str>) -> PolicyAction {
    match kind {
        JobKind::List | JobKind::Describe | JobKind::CheckNew => PolicyAction::Check,
        JobKind::Update if version.is_some() => PolicyAction::UpdateToVersion,
        JobKind::Update => PolicyAction::Update,
        JobKind::Vacuum => PolicyAction::Vacuum,
    }
}

fn policy_error(err: PolicyError) -> SysupdateError {
    SysupdateError::AuthDenied(format!("policy check failed: {err}"))
}

fn translate_status(status: &ExitStatus, errno: Option<i32>) -> Result<(), SysupdateError> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return Err(SysupdateError::WorkerSignalled { signal: signal_name(sig) });
        }
    }
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => match errno {
            Some(errno) => Err(SysupdateError::WorkerErrno { errno }),
            None => Err(SysupdateError::WorkerExit { code }),
        },
        None => Err(SysupdateError::WorkerSignalled { signal: "unknown".to_string() }),
    }
}

#[cfg(unix)]
fn status_to_signal_value(status: &ExitStatus, errno: Option<i32>) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(sig) = status.signal() {
        return -sig;
    }
    if let Some(errno) = errno {
        return -errno;
    }
    status.code().unwrap_or(-1)
}

#[cfg(not(unix))]
fn status_to_signal_value(status: &ExitStatus, errno: Option<i32>) -> i32 {
    errno.map(|e| -e).unwrap_or_else(|| status.code().unwrap_or(-1))
}

fn signal_name(sig: i32) -> String {
    nix::sys::signal::Signal::try_from(sig).map(|s| s.as_str().to_string()).unwrap_or_else(|_| sig.to_string())
}

#[cfg(test)]
impl Engine {
    pub(crate) fn seed_target(&self, target: Target) {
        self.inner.lock().targets.insert(target);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
