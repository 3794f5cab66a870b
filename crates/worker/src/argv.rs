// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker argument vector construction.
//!
//! `<path> --json=short [--verify=no] [<target-selector>] [--offline] <verb> [<version>]`

use std::ffi::OsString;
use sysupdate_core::{JobKind, Target};

/// Everything [`build_argv`] needs beyond the target and job kind.
#[derive(Debug, Clone)]
pub struct ArgvRequest<'a> {
    pub binary: &'a str,
    pub target: &'a Target,
    pub kind: JobKind,
    /// Required (non-empty) for `Describe`; optional for `Update` (absent
    /// means "latest"); ignored for every other kind.
    pub version: Option<&'a str>,
    pub offline: bool,
    /// Adds `--verify=no`; a testing-only bypass of signature verification.
    pub verify_no: bool,
}

pub fn build_argv(req: &ArgvRequest<'_>) -> Vec<OsString> {
    let mut argv = vec![OsString::from(req.binary), OsString::from("--json=short")];

    if req.verify_no {
        argv.push(OsString::from("--verify=no"));
    }

    if let Some(selector) = req.target.selector_arg() {
        argv.push(OsString::from(selector));
    }

    if req.offline {
        argv.push(OsString::from("--offline"));
    }

    argv.push(OsString::from(req.kind.verb()));

    match req.kind {
        JobKind::Describe => {
            // Validated non-empty by the caller before a Job is ever created.
            if let Some(version) = req.version {
                argv.push(OsString::from(version));
            }
        }
        JobKind::Update => {
            if let Some(version) = req.version {
                argv.push(OsString::from(version));
            }
        }
        JobKind::List | JobKind::CheckNew | JobKind::Vacuum => {}
    }

    argv
}

#[cfg(test)]
#[path = "argv_tests.rs"]
mod tests;
