// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sysupdated: binds the notify socket, connects to the system bus, and
//! runs the RMI surface until told to stop or until idle.

use std::sync::Arc;
use sysupdate_daemon::bus::manager::ManagerIface;
use sysupdate_daemon::bus::sync_target_objects;
use sysupdate_daemon::discovery::FsImageDiscovery;
use sysupdate_daemon::signals::MANAGER_PATH;
use sysupdate_daemon::{idle, logging, notify_dispatch, DaemonConfig, Engine};
use sysupdate_policy::PolkitGate;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = DaemonConfig::from_env();
    info!(runtime_dir = %config.runtime_dir.display(), "starting sysupdated");

    let notify_receiver = sysupdate_notify::NotifyReceiver::bind(&config.notify_socket_path())?;

    let connection = zbus::Connection::system().await?;
    let policy: Arc<dyn sysupdate_policy::PolicyGate> = Arc::new(PolkitGate::new(connection.clone()));
    let discovery = Arc::new(FsImageDiscovery::conventional());
    let engine = Engine::new(config.clone(), policy, discovery);
    engine.set_connection(connection.clone());

    connection
        .object_server()
        .at(MANAGER_PATH, ManagerIface { engine: engine.clone() })
        .await?;
    engine.ensure_targets().await;
    sync_target_objects(&connection, &engine).await;

    connection.request_name("org.freedesktop.sysupdate1").await?;

    tokio::spawn(notify_dispatch::run(notify_receiver, engine.clone()));
    tokio::spawn(idle::run(engine.clone(), config.idle_timeout));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    if let Err(err) = connection.release_name("org.freedesktop.sysupdate1").await {
        error!(error = %err, "failed to release bus name on shutdown");
    }
    info!("sysupdated stopped");
    Ok(())
}
