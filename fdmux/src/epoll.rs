//! Edge-registration readiness (`epoll`).
//!
//! A [`Session`] is a registration table held by the kernel. Descriptors are
//! added, modified and removed incrementally with [`Session::mutate`], and
//! [`Session::wait`] fills a caller-owned `[Event]` buffer with the ready
//! ones.
//!
//! Only Linux provides this strategy. Elsewhere [`Session::create`] fails
//! with [`CapabilityUnavailable`](crate::Error::CapabilityUnavailable)
//! without attempting any syscall, so the owning library can fall back to
//! [`poll`](crate::poll) or [`select`](crate::select).
//!
//! # Concurrency
//!
//! A `Session` performs no locking of its own. Concurrent `mutate`/`wait`
//! calls on the same session from several threads must be serialized by the
//! caller.

use crate::error::Result;
use crate::interest::Interest;
use crate::sys::RawDescriptor;
use crate::sys::edge::{self, NativeEvent};

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

/// A registration change applied by [`Session::mutate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Register a new descriptor.
    Add,
    /// Change the interest of a registered descriptor.
    Modify,
    /// Deregister a descriptor.
    Remove,
}

/// A readiness report: a descriptor and the events observed on it.
///
/// On Linux this is layout-compatible with `struct epoll_event`, so a
/// `[Event]` buffer is filled by the kernel in place.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct Event(NativeEvent);

impl Event {
    /// Creates an event reporting `observed` on `fd`.
    pub fn new(fd: RawDescriptor, observed: Interest) -> Self {
        Self(edge::event_new(fd, observed))
    }

    /// Returns the descriptor this event refers to.
    pub fn descriptor(&self) -> RawDescriptor {
        let data = self.0.u64;
        data as RawDescriptor
    }

    /// Returns the observed events.
    pub fn observed(&self) -> Interest {
        let events = self.0.events;
        edge::from_native_events(events)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(0, Interest::empty())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("descriptor", &self.descriptor())
            .field("observed", &self.observed())
            .finish()
    }
}

/// A kernel-held edge-registration table.
///
/// The session owns only its own table descriptor; registered descriptors
/// are referenced, never closed. Dropping the session closes the table;
/// [`destroy`](Self::destroy) does the same and reports a close failure.
///
/// A session is `Send` but not `Sync`: sharing one between threads needs a
/// lock around it.
///
/// ```rust,compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<fdmux::epoll::Session>();
/// ```
pub struct Session {
    /// Descriptor of the kernel table.
    fd: RawDescriptor,

    _not_sync: PhantomData<Cell<()>>,
}

impl Session {
    /// Returns `true` if this platform supports edge-registration sessions.
    pub const fn is_supported() -> bool {
        edge::is_supported()
    }

    /// Creates a session sized for about `size_hint` descriptors.
    ///
    /// `size_hint` must be positive.
    ///
    /// # Errors
    ///
    /// - [`CapabilityUnavailable`](crate::Error::CapabilityUnavailable) when
    ///   the platform lacks kernel edge notification,
    /// - [`Os`](crate::Error::Os) for any OS failure.
    pub fn create(size_hint: i32) -> Result<Self> {
        let fd = edge::create(size_hint)?;
        log::debug!("edge-registration session {} created (hint {})", fd, size_hint);

        Ok(Self {
            fd,
            _not_sync: PhantomData,
        })
    }

    /// Adds, modifies or removes `fd` in the table.
    ///
    /// `interest` is ignored for [`Op::Remove`].
    ///
    /// # Errors
    ///
    /// - [`InvalidRegistration`](crate::Error::InvalidRegistration) when `fd`
    ///   is already registered ([`Op::Add`]) or is not registered
    ///   ([`Op::Modify`], [`Op::Remove`]),
    /// - [`Os`](crate::Error::Os) for any other failure, such as a closed
    ///   descriptor.
    pub fn mutate(&self, op: Op, fd: RawDescriptor, interest: Interest) -> Result<()> {
        edge::ctl(self.fd, op, fd, interest)
    }

    /// Registers `fd` with `interest`.
    pub fn add(&self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        self.mutate(Op::Add, fd, interest)
    }

    /// Replaces the interest of a registered `fd`.
    pub fn modify(&self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        self.mutate(Op::Modify, fd, interest)
    }

    /// Deregisters `fd`.
    pub fn remove(&self, fd: RawDescriptor) -> Result<()> {
        self.mutate(Op::Remove, fd, Interest::empty())
    }

    /// Waits until a registered descriptor is ready or `timeout_ms` elapses.
    ///
    /// Fills `events` from the front, up to its length, and returns the
    /// number of events filled. A negative timeout blocks forever.
    ///
    /// An interrupted wait and an empty `events` buffer both return `Ok(0)`.
    pub fn wait(&self, events: &mut [Event], timeout_ms: i32) -> Result<usize> {
        edge::wait(
            self.fd,
            events.as_mut_ptr().cast::<NativeEvent>(),
            events.len(),
            timeout_ms,
        )
    }

    /// Returns the descriptor of the kernel table.
    pub fn as_raw(&self) -> RawDescriptor {
        self.fd
    }

    /// Closes the session.
    pub fn destroy(self) -> Result<()> {
        let fd = self.fd;
        mem::forget(self);

        log::debug!("edge-registration session {} destroyed", fd);
        edge::close(fd)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("fd", &self.fd).finish()
    }
}

impl Drop for Session {
    /// Closes the kernel table.
    fn drop(&mut self) {
        let _ = edge::close(self.fd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_descriptor_and_mask() {
        let event = Event::new(7, Interest::READABLE | Interest::HANGUP);

        assert_eq!(event.descriptor(), 7);
        assert_eq!(event.observed(), Interest::READABLE | Interest::HANGUP);
    }

    #[test]
    fn test_default_event_is_empty() {
        assert!(Event::default().observed().is_empty());
    }

    #[test]
    fn test_session_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Session>();
    }

    #[test]
    fn test_event_keeps_invalid_condition() {
        let event = Event::new(1, Interest::INVALID);
        assert_eq!(event.observed(), Interest::INVALID);
    }
}
