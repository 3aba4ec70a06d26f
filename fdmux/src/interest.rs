use bitflags::bitflags;

bitflags! {
    /// Readiness kinds a caller asks for, or a wait reports.
    ///
    /// The same mask is used in both directions: as the *requested* interest
    /// of a descriptor and as the *observed* events after a wait.
    ///
    /// Bit positions follow the Linux `poll`/`epoll` numbering so that masks
    /// stay stable across platforms, but every adapter translates them to the
    /// native constants explicitly.
    ///
    /// [`ERROR`](Self::ERROR), [`HANGUP`](Self::HANGUP) and
    /// [`INVALID`](Self::INVALID) are always reported by the list-based and
    /// edge-registration waits whether requested or not.
    /// [`READ_HANGUP`](Self::READ_HANGUP), [`ONESHOT`](Self::ONESHOT) and
    /// [`EDGE`](Self::EDGE) only have meaning for an edge-registration session.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Interest: u32 {
        /// Data can be read without blocking.
        const READABLE = 0x0001;
        /// Urgent (out-of-band) data can be read.
        const PRIORITY = 0x0002;
        /// Data can be written without blocking.
        const WRITABLE = 0x0004;
        /// An error condition is pending on the descriptor.
        const ERROR = 0x0008;
        /// The peer hung up.
        const HANGUP = 0x0010;
        /// The descriptor is not open.
        const INVALID = 0x0020;
        /// The peer shut down its writing half.
        const READ_HANGUP = 0x2000;
        /// Disarm the registration after one report.
        const ONESHOT = 1 << 30;
        /// Report transitions instead of levels.
        const EDGE = 1 << 31;
    }
}

impl Interest {
    /// Conditions reported regardless of the requested interest.
    pub const ALWAYS: Interest = Interest::ERROR
        .union(Interest::HANGUP)
        .union(Interest::INVALID);

    /// Returns `true` if [`READABLE`](Self::READABLE) is set.
    pub fn is_readable(self) -> bool {
        self.contains(Interest::READABLE)
    }

    /// Returns `true` if [`WRITABLE`](Self::WRITABLE) is set.
    pub fn is_writable(self) -> bool {
        self.contains(Interest::WRITABLE)
    }

    /// Returns `true` if any of the always-reported conditions is set.
    pub fn is_error(self) -> bool {
        self.intersects(Interest::ALWAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_contains_error_conditions() {
        assert!(Interest::ALWAYS.contains(Interest::ERROR));
        assert!(Interest::ALWAYS.contains(Interest::HANGUP));
        assert!(Interest::ALWAYS.contains(Interest::INVALID));
        assert!(!Interest::ALWAYS.contains(Interest::READABLE));
    }

    #[test]
    fn test_predicates() {
        let interest = Interest::READABLE | Interest::HANGUP;

        assert!(interest.is_readable());
        assert!(!interest.is_writable());
        assert!(interest.is_error());
        assert!(!Interest::WRITABLE.is_error());
    }
}
