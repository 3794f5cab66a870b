// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing for `sd_notify`-style `KEY=VALUE` datagrams sent by workers.

use serde::{Deserialize, Serialize};

/// One recognized field out of a notification datagram. Unrecognized keys
/// are ignored entirely (not even logged — workers may send other sd_notify
/// keys such as `STATUS=` that carry no meaning here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyField {
    /// `X_SYSUPDATE_VERSION=<string>`
    Version(String),
    /// `X_SYSUPDATE_PROGRESS=<0..100>`, already range-checked.
    Progress(u8),
    /// `ERRNO=<integer>`, already checked non-negative.
    Errno(i32),
    /// `READY=1`
    Ready,
}

/// A parsed datagram: the recognized fields in receive order, with `Ready`
/// (if present) moved to the end regardless of where it appeared in the
/// wire data, so callers can apply it last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyMessage {
    pub fields: Vec<NotifyField>,
    /// Set when `X_SYSUPDATE_PROGRESS` was present but out of range or
    /// unparseable; the caller should log a warning and otherwise ignore it.
    had_rejected_progress: bool,
}

impl NotifyMessage {
    /// Parse a raw datagram payload. Malformed individual lines are dropped
    /// with no effect on the rest of the message; the caller is expected to
    /// log a warning for progress values that don't parse (this function
    /// itself is infallible and side-effect free so it stays unit-testable).
    pub fn parse(payload: &[u8]) -> Self {
        let text = String::from_utf8_lossy(payload);
        let mut version = None;
        let mut progress = None;
        let mut progress_rejected = false;
        let mut errno = None;
        let mut ready = false;

        for line in text.split(['\n', '\0']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key {
                "X_SYSUPDATE_VERSION" => version = Some(value.to_string()),
                "X_SYSUPDATE_PROGRESS" => match value.parse::<u32>() {
                    Ok(v) if v <= 100 => progress = Some(v as u8),
                    _ => progress_rejected = true,
                },
                "ERRNO" => {
                    if let Ok(v) = value.parse::<i32>() {
                        if v >= 0 {
                            errno = Some(v);
                        }
                    }
                }
                "READY" if value == "1" => ready = true,
                _ => {}
            }
        }

        let mut fields = Vec::new();
        if let Some(v) = version {
            fields.push(NotifyField::Version(v));
        }
        if let Some(p) = progress {
            fields.push(NotifyField::Progress(p));
        }
        if let Some(e) = errno {
            fields.push(NotifyField::Errno(e));
        }
        if ready {
            fields.push(NotifyField::Ready);
        }
        Self {
            fields,
            had_rejected_progress: progress_rejected,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            NotifyField::Version(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn progress(&self) -> Option<u8> {
        self.fields.iter().find_map(|f| match f {
            NotifyField::Progress(p) => Some(*p),
            _ => None,
        })
    }

    pub fn errno(&self) -> Option<i32> {
        self.fields.iter().find_map(|f| match f {
            NotifyField::Errno(e) => Some(*e),
            _ => None,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.fields.iter().any(|f| matches!(f, NotifyField::Ready))
    }

    pub fn had_rejected_progress(&self) -> bool {
        self.had_rejected_progress
    }
}

#[cfg(test)]
#[path = "notify_msg_tests.rs"]
mod tests;
