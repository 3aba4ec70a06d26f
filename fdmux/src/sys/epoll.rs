//! Linux `epoll` adapter.
//!
//! This is the only platform with kernel edge-registration support. The
//! registration table lives in the kernel; this adapter only forwards
//! create/ctl/wait/close and normalizes their results.

use super::unix::ready_count;
use crate::epoll::Op;
use crate::error::{Error, RegistrationFault, Result};
use crate::interest::Interest;

use libc::{
    EEXIST, ENOENT, EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD, EPOLLERR, EPOLLET,
    EPOLLHUP, EPOLLIN, EPOLLONESHOT, EPOLLOUT, EPOLLPRI, EPOLLRDHUP, EINVAL, epoll_create1,
    epoll_ctl, epoll_event, epoll_wait,
};
use std::os::fd::RawFd;

/// Native `struct epoll_event`.
pub(crate) type NativeEvent = epoll_event;

/// Bit used to carry [`Interest::INVALID`] through an `epoll_event`.
///
/// This is the `POLLNVAL` position, which `epoll` never reports itself.
const INVALID_BIT: u32 = 0x20;

/// Interest bits and their `epoll` counterparts.
const EPOLL_BITS: [(Interest, u32); 9] = [
    (Interest::READABLE, EPOLLIN as u32),
    (Interest::PRIORITY, EPOLLPRI as u32),
    (Interest::WRITABLE, EPOLLOUT as u32),
    (Interest::ERROR, EPOLLERR as u32),
    (Interest::HANGUP, EPOLLHUP as u32),
    (Interest::INVALID, INVALID_BIT),
    (Interest::READ_HANGUP, EPOLLRDHUP as u32),
    (Interest::ONESHOT, EPOLLONESHOT as u32),
    (Interest::EDGE, EPOLLET as u32),
];

/// Returns `true`: edge registration is supported.
pub(crate) const fn is_supported() -> bool {
    true
}

/// Translates an interest mask into `epoll` event bits.
pub(crate) fn to_native_events(interest: Interest) -> u32 {
    EPOLL_BITS
        .iter()
        .filter(|(flag, _)| interest.contains(*flag))
        .fold(0, |events, (_, bit)| events | bit)
}

/// Translates `epoll` event bits into an interest mask.
pub(crate) fn from_native_events(events: u32) -> Interest {
    EPOLL_BITS
        .iter()
        .filter(|(_, bit)| events & bit != 0)
        .fold(Interest::empty(), |interest, (flag, _)| interest | *flag)
}

/// Builds an event carrying `fd` as its user data.
pub(crate) fn event_new(fd: RawFd, interest: Interest) -> epoll_event {
    epoll_event {
        events: to_native_events(interest),
        u64: fd as u64,
    }
}

/// Creates a close-on-exec `epoll` instance.
///
/// The kernel ignores the size hint, but it must be positive, as it must
/// for `epoll_create(2)`.
pub(crate) fn create(size_hint: i32) -> Result<RawFd> {
    if size_hint <= 0 {
        return Err(Error::Os(EINVAL));
    }

    let epfd = unsafe { epoll_create1(EPOLL_CLOEXEC) };
    if epfd < 0 {
        return Err(Error::last_os_error());
    }

    Ok(epfd)
}

/// Adds, modifies or removes `fd` in the table of `epfd`.
///
/// `EEXIST` on add and `ENOENT` on modify/remove are reported as
/// [`Error::InvalidRegistration`].
pub(crate) fn ctl(epfd: RawFd, op: Op, fd: RawFd, interest: Interest) -> Result<()> {
    let opcode = match op {
        Op::Add => EPOLL_CTL_ADD,
        Op::Modify => EPOLL_CTL_MOD,
        Op::Remove => EPOLL_CTL_DEL,
    };

    // Kernels before 2.6.9 require a non-null event even for removal.
    let mut event = event_new(fd, interest);

    let rc = unsafe { epoll_ctl(epfd, opcode, fd, &mut event) };
    if rc == 0 {
        return Ok(());
    }

    let code = super::last_error_code();
    let fault = match (op, code) {
        (Op::Add, EEXIST) => RegistrationFault::AlreadyRegistered,
        (Op::Modify | Op::Remove, ENOENT) => RegistrationFault::NotRegistered,
        _ => return Err(Error::Os(code)),
    };

    Err(Error::InvalidRegistration {
        descriptor: fd,
        fault,
    })
}

/// Calls `epoll_wait(2)` over `len` events starting at `events`.
///
/// An empty buffer returns `Ok(0)` without a syscall; the kernel would
/// reject it with `EINVAL`.
pub(crate) fn wait(
    epfd: RawFd,
    events: *mut epoll_event,
    len: usize,
    timeout_ms: i32,
) -> Result<usize> {
    if len == 0 {
        return Ok(0);
    }

    let max = len.min(i32::MAX as usize) as i32;

    let rc = unsafe { epoll_wait(epfd, events, max, timeout_ms) };
    ready_count(rc)
}

/// Closes an `epoll` instance.
pub(crate) fn close(epfd: RawFd) -> Result<()> {
    let rc = unsafe { libc::close(epfd) };
    if rc < 0 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}
