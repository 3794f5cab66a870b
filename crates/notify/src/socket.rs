// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The credential-authenticated notify socket: a single datagram
//! socket shared by every live worker, demultiplexed by sender PID.

use nix::sys::socket::{
    bind, recvmsg, setsockopt, socket, sockopt, AddressFamily, ControlMessageOwned, MsgFlags,
    RecvMsg, SockFlag, SockType, UnixAddr,
};
use nix::unistd::unlink;
use std::io::IoSliceMut;
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::path::Path;
use thiserror::Error;
use tokio::io::unix::AsyncFd;

/// Longest notify datagram the receiver accepts in one read. Anything
/// longer is reported as truncated and dropped, matching the daemon's
/// fixed-size recvmsg buffer.
const MAX_DATAGRAM: usize = 4096;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to bind notify socket at {path}: {source}")]
    Bind {
        path: std::path::PathBuf,
        #[source]
        source: nix::Error,
    },
    #[error("notify socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One raw datagram accepted off the wire: the sender's credentialed PID
/// and its payload bytes, before any `KEY=VALUE` parsing.
#[derive(Debug)]
pub struct RawNotification {
    pub pid: i32,
    pub payload: Vec<u8>,
}

/// A bound, credential-authenticated `SOCK_DGRAM` socket. Binds at a
/// filesystem path (unlinking any stale socket left by a prior run) rather
/// than the abstract namespace, since the runtime directory is already
/// exclusive to this daemon instance.
pub struct NotifyReceiver {
    fd: AsyncFd<OwnedFd>,
    path: std::path::PathBuf,
}

impl NotifyReceiver {
    pub fn bind(path: &Path) -> Result<Self, NotifyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Ignore failures: the path may simply not exist yet from a prior run.
        let _ = unlink(path);

        let fd = socket(
            AddressFamily::Unix,
            SockType::Datagram,
            SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|source| NotifyError::Bind { path: path.to_path_buf(), source })?;

        setsockopt(&fd, sockopt::PassCred, &true)
            .map_err(|source| NotifyError::Bind { path: path.to_path_buf(), source })?;

        let addr = UnixAddr::new(path).map_err(|source| NotifyError::Bind { path: path.to_path_buf(), source })?;
        bind(fd.as_raw_fd(), &addr).map_err(|source| NotifyError::Bind { path: path.to_path_buf(), source })?;

        Ok(Self { fd: AsyncFd::new(fd)?, path: path.to_path_buf() })
    }

    /// Receive and credential-check exactly one datagram, or `None` if it
    /// was dropped (truncated, uncredentialed, or from a non-positive PID).
    pub async fn recv_one(&self) -> Result<Option<RawNotification>, NotifyError> {
        loop {
            let mut guard = self.fd.readable().await?;
            match guard.try_io(|fd| recv_datagram(fd.as_fd())) {
                Ok(result) => return result.map_err(NotifyError::from),
                Err(_would_block) => continue,
            }
        }
    }
}

impl Drop for NotifyReceiver {
    fn drop(&mut self) {
        let _ = unlink(&self.path);
    }
}

fn recv_datagram(fd: std::os::fd::BorrowedFd<'_>) -> std::io::Result<Option<RawNotification>> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut iov = [IoSliceMut::new(&mut buf)];
    let mut cmsg_space = nix::cmsg_space!(nix::sys::socket::UnixCredentials);

    let msg: RecvMsg<'_, '_, UnixAddr> = match recvmsg(fd.as_raw_fd(), &mut iov, Some(&mut cmsg_space), MsgFlags::empty()) {
        Ok(msg) => msg,
        Err(nix::errno::Errno::EAGAIN) => return Ok(None),
        Err(err) => return Err(std::io::Error::from_raw_os_error(err as i32)),
    };

    if msg.flags.contains(MsgFlags::MSG_TRUNC) {
        tracing::warn!("dropping truncated notify datagram");
        return Ok(None);
    }

    let pid = msg.cmsgs().ok().into_iter().flatten().find_map(|cmsg| match cmsg {
        ControlMessageOwned::ScmCredentials(cred) => Some(cred.pid()),
        _ => None,
    });

    let Some(pid) = pid else {
        tracing::warn!("dropping notify datagram with no sender credentials");
        return Ok(None);
    };

    if pid <= 0 {
        tracing::warn!(pid, "dropping notify datagram with non-positive pid");
        return Ok(None);
    }

    let len = msg.bytes;
    buf.truncate(len);
    Ok(Some(RawNotification { pid, payload: buf }))
}

#[cfg(test)]
#[path = "socket_tests.rs"]
mod tests;
