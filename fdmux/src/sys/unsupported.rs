//! Edge-registration stand-in for platforms without `epoll`.
//!
//! Every operation fails with [`Error::CapabilityUnavailable`] before any
//! syscall is attempted. The event layout matches Linux so that the
//! unified multiplexer can still fill [`Event`](crate::epoll::Event) buffers.

use super::RawDescriptor;
use crate::epoll::Op;
use crate::error::{Error, Result};
use crate::interest::Interest;

/// Layout-compatible replacement for `struct epoll_event`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct NativeEvent {
    pub(crate) events: u32,
    pub(crate) u64: u64,
}

/// Returns `false`: edge registration is not supported.
pub(crate) const fn is_supported() -> bool {
    false
}

/// Interest bits are stored unchanged.
pub(crate) fn to_native_events(interest: Interest) -> u32 {
    interest.bits()
}

pub(crate) fn from_native_events(events: u32) -> Interest {
    Interest::from_bits_truncate(events)
}

pub(crate) fn event_new(fd: RawDescriptor, interest: Interest) -> NativeEvent {
    NativeEvent {
        events: to_native_events(interest),
        u64: fd as u64,
    }
}

pub(crate) fn create(_size_hint: i32) -> Result<RawDescriptor> {
    Err(Error::CapabilityUnavailable)
}

pub(crate) fn ctl(
    _epfd: RawDescriptor,
    _op: Op,
    _fd: RawDescriptor,
    _interest: Interest,
) -> Result<()> {
    Err(Error::CapabilityUnavailable)
}

pub(crate) fn wait(
    _epfd: RawDescriptor,
    _events: *mut NativeEvent,
    _len: usize,
    _timeout_ms: i32,
) -> Result<usize> {
    Err(Error::CapabilityUnavailable)
}

pub(crate) fn close(_epfd: RawDescriptor) -> Result<()> {
    Err(Error::CapabilityUnavailable)
}
