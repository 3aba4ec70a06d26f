//! Unified readiness multiplexer.
//!
//! This module ties the three wait primitives together behind one
//! registration contract:
//! - register, re-register or deregister a descriptor with an [`Interest`],
//! - wait, filling a caller-owned `[Event]` buffer with ready descriptors.
//!
//! The [`Strategy`] is chosen once, at build time, and every call dispatches
//! with a `match` on the [`Multiplexer`] variant. Registration may allocate;
//! waiting never does.
//!
//! Timeouts, wakeups with nothing ready and interrupted waits all report
//! `Ok(0)`.

mod builder;
mod level;
mod list;

pub use builder::{DEFAULT_EDGE_THRESHOLD, MultiplexerBuilder};
pub use level::LevelRescan;
pub use list::ListBased;

use crate::epoll::{Event, Session};
use crate::error::Result;
use crate::interest::Interest;
use crate::sys::RawDescriptor;

/// A readiness wait strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `select` over fixed-capacity descriptor sets.
    LevelRescan,

    /// `poll` (or `WSAPoll`) over a flat entry list.
    ListBased,

    /// A kernel-held registration table (`epoll`).
    EdgeRegistration,
}

impl Strategy {
    /// Returns `true` if this strategy can be used on the current platform.
    pub const fn is_available(self) -> bool {
        match self {
            Strategy::LevelRescan | Strategy::ListBased => true,
            Strategy::EdgeRegistration => Session::is_supported(),
        }
    }

    /// Picks a strategy for `expected_descriptors` descriptors.
    ///
    /// Edge registration is picked at or above `edge_threshold` when it is
    /// available; the list-based strategy otherwise.
    pub fn probe(expected_descriptors: usize, edge_threshold: usize) -> Self {
        if expected_descriptors >= edge_threshold && Strategy::EdgeRegistration.is_available() {
            Strategy::EdgeRegistration
        } else {
            Strategy::ListBased
        }
    }
}

/// A readiness multiplexer bound to one strategy.
#[derive(Debug)]
pub enum Multiplexer {
    /// Level-rescan registrations.
    LevelRescan(LevelRescan),

    /// List-based registrations.
    ListBased(ListBased),

    /// Edge-registration session.
    EdgeRegistration(Session),
}

impl Multiplexer {
    /// Returns a [`MultiplexerBuilder`].
    pub fn builder() -> MultiplexerBuilder {
        MultiplexerBuilder::new()
    }

    /// Returns the strategy this multiplexer was built with.
    pub fn strategy(&self) -> Strategy {
        match self {
            Multiplexer::LevelRescan(_) => Strategy::LevelRescan,
            Multiplexer::ListBased(_) => Strategy::ListBased,
            Multiplexer::EdgeRegistration(_) => Strategy::EdgeRegistration,
        }
    }

    /// Registers `fd` with `interest`.
    ///
    /// [`Interest::EDGE`], [`Interest::ONESHOT`] and
    /// [`Interest::READ_HANGUP`] are only honored by edge registration.
    ///
    /// # Errors
    ///
    /// [`InvalidRegistration`](crate::Error::InvalidRegistration) if `fd` is
    /// already registered, or cannot be held by the level-rescan sets.
    pub fn register(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        log::trace!("register fd {} for {:?}", fd, interest);

        match self {
            Multiplexer::LevelRescan(level) => level.register(fd, interest),
            Multiplexer::ListBased(list) => list.register(fd, interest),
            Multiplexer::EdgeRegistration(session) => session.add(fd, interest),
        }
    }

    /// Replaces the interest of a registered `fd`.
    pub fn reregister(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        log::trace!("reregister fd {} for {:?}", fd, interest);

        match self {
            Multiplexer::LevelRescan(level) => level.reregister(fd, interest),
            Multiplexer::ListBased(list) => list.reregister(fd, interest),
            Multiplexer::EdgeRegistration(session) => session.modify(fd, interest),
        }
    }

    /// Deregisters `fd`.
    pub fn deregister(&mut self, fd: RawDescriptor) -> Result<()> {
        log::trace!("deregister fd {}", fd);

        match self {
            Multiplexer::LevelRescan(level) => level.deregister(fd),
            Multiplexer::ListBased(list) => list.deregister(fd),
            Multiplexer::EdgeRegistration(session) => session.remove(fd),
        }
    }

    /// Waits until a registered descriptor is ready or `timeout_ms` elapses.
    ///
    /// Fills `events` from the front with `(descriptor, observed)` pairs, up
    /// to its length, and returns the number filled. A negative timeout
    /// blocks forever.
    pub fn wait(&mut self, events: &mut [Event], timeout_ms: i32) -> Result<usize> {
        match self {
            Multiplexer::LevelRescan(level) => level.wait(events, timeout_ms),
            Multiplexer::ListBased(list) => list.wait(events, timeout_ms),
            Multiplexer::EdgeRegistration(session) => session.wait(events, timeout_ms),
        }
    }
}
