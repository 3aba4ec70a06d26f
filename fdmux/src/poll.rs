//! List-based readiness (`poll`).
//!
//! The caller owns a flat slice of [`PollFd`] entries, each pairing a
//! descriptor with its requested interest. [`wait_poll`] hands the slice to
//! the kernel as-is and the observed events are written back into the same
//! entries.

use crate::error::Result;
use crate::interest::Interest;
use crate::sys::RawDescriptor;
use crate::sys::platform::{self, NativePollFd, from_poll_events, pollfd_new, to_poll_events};

use std::fmt;

/// One entry of a list-based wait.
///
/// Layout-compatible with the native `pollfd` (`WSAPOLLFD` on Windows), so a
/// `[PollFd]` is passed to the kernel without conversion.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct PollFd(NativePollFd);

const _: () = assert!(std::mem::size_of::<PollFd>() == std::mem::size_of::<NativePollFd>());

impl PollFd {
    /// Creates an entry requesting `interest` on `fd`, with no observed
    /// events.
    pub fn new(fd: RawDescriptor, interest: Interest) -> Self {
        Self(pollfd_new(fd, interest))
    }

    /// Returns the descriptor of this entry.
    pub fn descriptor(&self) -> RawDescriptor {
        self.0.fd as RawDescriptor
    }

    /// Returns the requested interest.
    ///
    /// Only the bits the platform can request are kept.
    pub fn requested(&self) -> Interest {
        from_poll_events(self.0.events)
    }

    /// Replaces the requested interest.
    pub fn set_requested(&mut self, interest: Interest) {
        self.0.events = to_poll_events(interest) as _;
    }

    /// Returns the events observed by the last wait.
    ///
    /// This is the requested interest intersected with the signaled
    /// conditions, plus any of [`Interest::ALWAYS`].
    pub fn observed(&self) -> Interest {
        from_poll_events(self.0.revents)
    }

    /// Returns `true` if the last wait observed any event on this entry.
    pub fn is_ready(&self) -> bool {
        self.0.revents != 0
    }
}

impl fmt::Debug for PollFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollFd")
            .field("descriptor", &self.descriptor())
            .field("requested", &self.requested())
            .field("observed", &self.observed())
            .finish()
    }
}

/// Waits until an entry is ready or `timeout_ms` elapses.
///
/// A negative `timeout_ms` blocks forever and `0` returns immediately.
///
/// Returns the number of entries with a nonzero observed mask. An interrupted
/// wait returns `Ok(0)`.
pub fn wait_poll(entries: &mut [PollFd], timeout_ms: i32) -> Result<usize> {
    platform::poll(
        entries.as_mut_ptr().cast::<NativePollFd>(),
        entries.len(),
        timeout_ms,
    )
}

/// Like [`wait_poll`], restricted to the first `count` entries.
///
/// # Panics
///
/// Panics if `count > entries.len()`.
pub fn wait_poll_prefix(entries: &mut [PollFd], count: usize, timeout_ms: i32) -> Result<usize> {
    assert!(
        count <= entries.len(),
        "count {} exceeds buffer capacity {}",
        count,
        entries.len()
    );

    wait_poll(&mut entries[..count], timeout_ms)
}
