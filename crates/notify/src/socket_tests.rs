// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::net::UnixDatagram as StdUnixDatagram;

#[tokio::test]
async fn receives_credentialed_datagram() {
    let dir = tempfile_dir();
    let path = dir.join("notify");
    let receiver = NotifyReceiver::bind(&path).expect("bind");

    let sender = StdUnixDatagram::unbound().expect("unbound");
    sender.connect(&path).expect("connect");
    sender.send(b"X_SYSUPDATE_PROGRESS=42\n").expect("send");

    let raw = receiver.recv_one().await.expect("recv").expect("not dropped");
    assert_eq!(raw.pid, std::process::id() as i32);
    assert_eq!(raw.payload, b"X_SYSUPDATE_PROGRESS=42\n");
}

#[tokio::test]
async fn recv_message_parses_payload() {
    let dir = tempfile_dir();
    let path = dir.join("notify");
    let receiver = NotifyReceiver::bind(&path).expect("bind");

    let sender = StdUnixDatagram::unbound().expect("unbound");
    sender.connect(&path).expect("connect");
    sender.send(b"READY=1\nX_SYSUPDATE_VERSION=2.0\n").expect("send");

    let (pid, message) = receiver.recv_message().await.expect("recv").expect("not dropped");
    assert_eq!(pid, std::process::id() as i32);
    assert!(message.is_ready());
    assert_eq!(message.version(), Some("2.0"));
}

#[tokio::test]
async fn rebinding_unlinks_stale_socket() {
    let dir = tempfile_dir();
    let path = dir.join("notify");
    let _first = NotifyReceiver::bind(&path).expect("bind");
    let _second = NotifyReceiver::bind(&path).expect("rebind over stale socket");
}

fn tempfile_dir() -> std::path::PathBuf {
    let dir = tempfile::tempdir().expect("tempdir");
    dir.into_path()
}
