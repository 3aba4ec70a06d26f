use crate::epoll::Event;
use crate::error::{Error, RegistrationFault, Result};
use crate::interest::Interest;
use crate::select::{FdSet, INFINITE, wait_select};
use crate::sys::RawDescriptor;

/// Registration state of the level-rescan strategy.
///
/// Interest lives in three master sets. Every wait copies them onto the
/// stack, lets `select` narrow the copies and reports the survivors, so the
/// masters are never disturbed by a wait.
///
/// On Windows at least one registered socket must carry interest, because
/// WinSock rejects a `select` over empty sets.
#[derive(Debug, Clone)]
pub struct LevelRescan {
    /// Every registered descriptor, with or without interest.
    registered: FdSet,

    /// Descriptors waiting for readability.
    read: FdSet,

    /// Descriptors waiting for writability.
    write: FdSet,

    /// Descriptors waiting for an exceptional condition.
    error: FdSet,

    /// Highest registered descriptor plus one.
    nfds: i32,
}

/// Returns the `nfds` value needed to cover `fd`.
fn bound(fd: RawDescriptor) -> i32 {
    i32::try_from(fd).map_or(i32::MAX, |fd| fd.saturating_add(1))
}

fn fault(descriptor: RawDescriptor, fault: RegistrationFault) -> Error {
    Error::InvalidRegistration { descriptor, fault }
}

fn toggle(set: &mut FdSet, fd: RawDescriptor, on: bool) {
    if on {
        set.insert(fd);
    } else {
        set.remove(fd);
    }
}

impl LevelRescan {
    pub(crate) fn new() -> Self {
        Self {
            registered: FdSet::new(),
            read: FdSet::new(),
            write: FdSet::new(),
            error: FdSet::new(),
            nfds: 0,
        }
    }

    fn apply(&mut self, fd: RawDescriptor, interest: Interest) {
        toggle(&mut self.read, fd, interest.contains(Interest::READABLE));
        toggle(&mut self.write, fd, interest.contains(Interest::WRITABLE));
        toggle(
            &mut self.error,
            fd,
            interest.intersects(Interest::ERROR | Interest::PRIORITY),
        );
    }

    pub(crate) fn register(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        if self.registered.contains(fd) {
            return Err(fault(fd, RegistrationFault::AlreadyRegistered));
        }

        if !self.registered.insert(fd) {
            return Err(fault(fd, RegistrationFault::OutOfRange));
        }

        self.apply(fd, interest);
        self.nfds = self.nfds.max(bound(fd));

        Ok(())
    }

    pub(crate) fn reregister(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        if !self.registered.contains(fd) {
            return Err(fault(fd, RegistrationFault::NotRegistered));
        }

        self.apply(fd, interest);
        Ok(())
    }

    pub(crate) fn deregister(&mut self, fd: RawDescriptor) -> Result<()> {
        if !self.registered.contains(fd) {
            return Err(fault(fd, RegistrationFault::NotRegistered));
        }

        self.registered.remove(fd);
        self.apply(fd, Interest::empty());

        if bound(fd) == self.nfds {
            self.nfds = self.registered.iter(self.nfds).last().map_or(0, bound);
        }

        Ok(())
    }

    pub(crate) fn wait(&mut self, events: &mut [Event], timeout_ms: i32) -> Result<usize> {
        let mut read = self.read;
        let mut write = self.write;
        let mut error = self.error;

        let timeout = if timeout_ms < 0 {
            INFINITE
        } else {
            i64::from(timeout_ms)
        };

        let ready = wait_select(
            self.nfds,
            Some(&mut read),
            Some(&mut write),
            Some(&mut error),
            timeout,
        )?;

        if ready == 0 {
            return Ok(0);
        }

        let mut filled = 0;

        for fd in self.registered.iter(self.nfds) {
            if filled == events.len() {
                break;
            }

            let mut observed = Interest::empty();
            if read.contains(fd) {
                observed |= Interest::READABLE;
            }
            if write.contains(fd) {
                observed |= Interest::WRITABLE;
            }
            if error.contains(fd) {
                observed |= Interest::ERROR;
            }

            if !observed.is_empty() {
                events[filled] = Event::new(fd, observed);
                filled += 1;
            }
        }

        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_register_is_rejected() {
        let mut level = LevelRescan::new();
        level.register(5, Interest::READABLE).unwrap();

        assert_eq!(
            level.register(5, Interest::WRITABLE),
            Err(fault(5, RegistrationFault::AlreadyRegistered))
        );
    }

    #[test]
    fn test_reregister_moves_between_sets() {
        let mut level = LevelRescan::new();
        level.register(5, Interest::READABLE).unwrap();
        level.reregister(5, Interest::WRITABLE).unwrap();

        assert!(!level.read.contains(5));
        assert!(level.write.contains(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_nfds_tracks_highest_descriptor() {
        let mut level = LevelRescan::new();
        level.register(3, Interest::READABLE).unwrap();
        level.register(9, Interest::READABLE).unwrap();
        assert_eq!(level.nfds, 10);

        level.deregister(9).unwrap();
        assert_eq!(level.nfds, 4);

        level.deregister(3).unwrap();
        assert_eq!(level.nfds, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_out_of_range_descriptor_is_rejected() {
        let mut level = LevelRescan::new();
        let fd = FdSet::CAPACITY as RawDescriptor;

        assert_eq!(
            level.register(fd, Interest::READABLE),
            Err(fault(fd, RegistrationFault::OutOfRange))
        );
    }

    #[test]
    fn test_deregister_unknown_descriptor() {
        let mut level = LevelRescan::new();

        assert_eq!(
            level.deregister(4),
            Err(fault(4, RegistrationFault::NotRegistered))
        );
    }
}
