use crate::epoll::Event;
use crate::error::{Error, RegistrationFault, Result};
use crate::interest::Interest;
use crate::poll::{PollFd, wait_poll};
use crate::sys::RawDescriptor;

/// Registration state of the list-based strategy.
///
/// The entry table is the `poll` buffer itself: it is handed to the kernel
/// on every wait without being rebuilt. It is sized once at build time and
/// only grows when a registration exceeds that size.
#[derive(Debug, Clone)]
pub struct ListBased {
    entries: Vec<PollFd>,
}

impl ListBased {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, fd: RawDescriptor) -> Result<usize> {
        self.entries
            .iter()
            .position(|entry| entry.descriptor() == fd)
            .ok_or(Error::InvalidRegistration {
                descriptor: fd,
                fault: RegistrationFault::NotRegistered,
            })
    }

    pub(crate) fn register(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        if self.position(fd).is_ok() {
            return Err(Error::InvalidRegistration {
                descriptor: fd,
                fault: RegistrationFault::AlreadyRegistered,
            });
        }

        self.entries.push(PollFd::new(fd, interest));
        Ok(())
    }

    pub(crate) fn reregister(&mut self, fd: RawDescriptor, interest: Interest) -> Result<()> {
        let index = self.position(fd)?;
        self.entries[index].set_requested(interest);
        Ok(())
    }

    pub(crate) fn deregister(&mut self, fd: RawDescriptor) -> Result<()> {
        let index = self.position(fd)?;
        self.entries.swap_remove(index);
        Ok(())
    }

    pub(crate) fn wait(&mut self, events: &mut [Event], timeout_ms: i32) -> Result<usize> {
        let ready = wait_poll(&mut self.entries, timeout_ms)?;
        if ready == 0 {
            return Ok(0);
        }

        let ready_entries = self.entries.iter().filter(|entry| entry.is_ready());

        let mut filled = 0;
        for (slot, entry) in events.iter_mut().zip(ready_entries) {
            *slot = Event::new(entry.descriptor(), entry.observed());
            filled += 1;
        }

        Ok(filled)
    }
}
