#![cfg(unix)]

use fdmux::Interest;
use fdmux::poll::{PollFd, wait_poll, wait_poll_prefix};

use std::io::{Write, pipe};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

#[test]
fn poll_zero_timeout_returns_immediately() {
    let (reader, _writer) = pipe().unwrap();
    let mut entries = [PollFd::new(reader.as_raw_fd(), Interest::READABLE)];

    let ready = wait_poll(&mut entries, 0).unwrap();

    assert_eq!(ready, 0);
    assert!(entries[0].observed().is_empty());
}

#[test]
fn poll_reports_single_writable_descriptor() {
    let (r1, _w1) = pipe().unwrap();
    let (r2, _w2) = pipe().unwrap();
    let (_r3, w3) = pipe().unwrap();

    let interest = Interest::READABLE | Interest::WRITABLE;
    let mut entries = [
        PollFd::new(r1.as_raw_fd(), interest),
        PollFd::new(r2.as_raw_fd(), interest),
        PollFd::new(w3.as_raw_fd(), interest),
    ];

    let ready = wait_poll(&mut entries, 100).unwrap();

    assert_eq!(ready, 1);
    assert!(entries[0].observed().is_empty());
    assert!(entries[1].observed().is_empty());
    assert_eq!(entries[2].observed(), Interest::WRITABLE);
}

#[test]
fn poll_stream_pair_scenario() {
    let (mut left, right) = UnixStream::pair().unwrap();

    let interest = Interest::READABLE | Interest::WRITABLE;
    let mut entries = [
        PollFd::new(left.as_raw_fd(), interest),
        PollFd::new(right.as_raw_fd(), interest),
    ];

    let ready = wait_poll(&mut entries, 100).unwrap();

    assert!(ready >= 1);
    for entry in &entries {
        assert!(entry.observed().is_writable());
        assert!(!entry.observed().is_readable());
    }

    left.write_all(b"x").unwrap();

    let ready = wait_poll(&mut entries, 100).unwrap();

    assert!(ready >= 1);
    assert!(entries[1].observed().is_readable());
    assert!(!entries[0].observed().is_readable());
}

#[test]
fn poll_reports_hangup_without_asking() {
    let (reader, writer) = pipe().unwrap();
    drop(writer);

    let mut entries = [PollFd::new(reader.as_raw_fd(), Interest::empty())];

    let ready = wait_poll(&mut entries, 100).unwrap();

    assert_eq!(ready, 1);
    assert!(entries[0].observed().contains(Interest::HANGUP));
}

#[test]
fn poll_reports_invalid_descriptor() {
    let mut entries = [PollFd::new(i32::MAX, Interest::READABLE)];

    let ready = wait_poll(&mut entries, 0).unwrap();

    assert_eq!(ready, 1);
    assert_eq!(entries[0].observed(), Interest::INVALID);
}

#[test]
fn poll_prefix_leaves_tail_untouched() {
    let (reader, _writer) = pipe().unwrap();
    let (_other, writer) = pipe().unwrap();

    let mut entries = [
        PollFd::new(reader.as_raw_fd(), Interest::READABLE),
        PollFd::new(writer.as_raw_fd(), Interest::WRITABLE),
    ];

    let ready = wait_poll_prefix(&mut entries, 1, 0).unwrap();

    assert_eq!(ready, 0);
    assert!(!entries[1].is_ready());
}
