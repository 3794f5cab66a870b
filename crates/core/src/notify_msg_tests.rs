// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_version_progress_ready_in_order() {
    let msg = NotifyMessage::parse(b"X_SYSUPDATE_VERSION=1.2.3\nX_SYSUPDATE_PROGRESS=42\nREADY=1\n");
    assert_eq!(msg.version(), Some("1.2.3"));
    assert_eq!(msg.progress(), Some(42));
    assert!(msg.is_ready());
    // Ready is ordered last regardless of wire position.
    assert_eq!(msg.fields.last(), Some(&NotifyField::Ready));
}

#[test]
fn ready_is_moved_to_end_even_if_sent_first() {
    let msg = NotifyMessage::parse(b"READY=1\nX_SYSUPDATE_VERSION=2.0\n");
    assert_eq!(
        msg.fields,
        vec![NotifyField::Version("2.0".to_string()), NotifyField::Ready]
    );
}

#[test]
fn progress_over_100_is_rejected() {
    let msg = NotifyMessage::parse(b"X_SYSUPDATE_PROGRESS=101\n");
    assert_eq!(msg.progress(), None);
    assert!(msg.had_rejected_progress());
}

#[test]
fn progress_unparseable_is_rejected() {
    let msg = NotifyMessage::parse(b"X_SYSUPDATE_PROGRESS=not-a-number\n");
    assert_eq!(msg.progress(), None);
    assert!(msg.had_rejected_progress());
}

#[test]
fn progress_at_boundary_100_is_accepted() {
    let msg = NotifyMessage::parse(b"X_SYSUPDATE_PROGRESS=100\n");
    assert_eq!(msg.progress(), Some(100));
    assert!(!msg.had_rejected_progress());
}

#[test]
fn negative_errno_is_dropped() {
    let msg = NotifyMessage::parse(b"ERRNO=-5\n");
    assert_eq!(msg.errno(), None);
}

#[test]
fn positive_errno_is_kept() {
    let msg = NotifyMessage::parse(b"ERRNO=2\n");
    assert_eq!(msg.errno(), Some(2));
}

#[test]
fn unknown_keys_are_ignored() {
    let msg = NotifyMessage::parse(b"STATUS=doing the thing\nMAINPID=1234\n");
    assert!(msg.fields.is_empty());
}

#[test]
fn ready_requires_value_1() {
    let msg = NotifyMessage::parse(b"READY=0\n");
    assert!(!msg.is_ready());
}

#[test]
fn empty_datagram_parses_to_empty_message() {
    let msg = NotifyMessage::parse(b"");
    assert!(msg.fields.is_empty());
    assert!(!msg.had_rejected_progress());
}

#[test]
fn blank_lines_are_skipped() {
    let msg = NotifyMessage::parse(b"\n\nX_SYSUPDATE_VERSION=1.0\n\n");
    assert_eq!(msg.version(), Some("1.0"));
}
