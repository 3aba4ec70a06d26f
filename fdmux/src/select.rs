//! Level-rescan readiness (`select`).
//!
//! The caller builds up to three [`FdSet`]s (read, write and error interest)
//! and hands them to [`wait_select`]. On return each set has been narrowed in
//! place to the descriptors whose condition was signaled.
//!
//! Sets are plain values on the caller's stack; nothing is allocated by the
//! wait.

use crate::error::Result;
use crate::sys::RawDescriptor;
use crate::sys::platform::{
    self, FD_SET_CAPACITY, NativeFdSet, fd_set_clear, fd_set_contains, fd_set_insert,
    fd_set_iter, fd_set_new, fd_set_remove,
};

use std::fmt;
use std::ptr;

/// Timeout sentinel that blocks until a descriptor becomes ready.
pub const INFINITE: i64 = -1;

/// A fixed-capacity descriptor set, layout-compatible with the native one.
///
/// On Unix this is a bitmap addressed by descriptor number, so only
/// descriptors below [`FdSet::CAPACITY`] can be members. On Windows it is an
/// array of up to [`FdSet::CAPACITY`] sockets.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct FdSet(NativeFdSet);

impl FdSet {
    /// Maximum number of descriptors (Windows) or highest descriptor plus
    /// one (Unix) the set can address.
    pub const CAPACITY: usize = FD_SET_CAPACITY;

    /// Creates an empty set.
    pub fn new() -> Self {
        Self(fd_set_new())
    }

    /// Adds `fd` to the set.
    ///
    /// Returns `false` if the set cannot hold `fd`. Adding a member twice is
    /// harmless.
    pub fn insert(&mut self, fd: RawDescriptor) -> bool {
        fd_set_insert(&mut self.0, fd)
    }

    /// Removes `fd` from the set.
    pub fn remove(&mut self, fd: RawDescriptor) {
        fd_set_remove(&mut self.0, fd);
    }

    /// Returns `true` if `fd` is a member.
    pub fn contains(&self, fd: RawDescriptor) -> bool {
        fd_set_contains(&self.0, fd)
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        fd_set_clear(&mut self.0);
    }

    /// Iterates over the members, in ascending order on Unix and insertion
    /// order on Windows.
    ///
    /// `nfds` bounds the scan on Unix, exactly as it bounds `select`.
    pub fn iter(&self, nfds: i32) -> impl Iterator<Item = RawDescriptor> + '_ {
        fd_set_iter(&self.0, nfds)
    }

    fn as_mut_ptr(set: Option<&mut FdSet>) -> *mut NativeFdSet {
        set.map_or(ptr::null_mut(), |s| &mut s.0 as *mut NativeFdSet)
    }
}

impl Default for FdSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter(FD_SET_CAPACITY as i32))
            .finish()
    }
}

/// Waits until a descriptor in one of the sets is ready or `timeout_ms`
/// elapses.
///
/// - `nfds` is the highest descriptor in any set plus one (ignored on
///   Windows).
/// - `timeout_ms` is in milliseconds; [`INFINITE`] blocks forever.
///
/// Returns the number of signaled descriptors as counted by the OS (a
/// descriptor present in several sets counts once per set). Each supplied set
/// is narrowed to its signaled members.
///
/// An interrupted wait returns `Ok(0)`. Callers cannot tell it apart from a
/// timeout and must re-issue the wait themselves.
///
/// # Errors
///
/// On Unix, `nfds` above [`FdSet::CAPACITY`] or below zero fails with
/// [`Os`](crate::Error::Os)`(EINVAL)` without waiting.
pub fn wait_select(
    nfds: i32,
    read: Option<&mut FdSet>,
    write: Option<&mut FdSet>,
    error: Option<&mut FdSet>,
    timeout_ms: i64,
) -> Result<usize> {
    platform::select(
        nfds,
        FdSet::as_mut_ptr(read),
        FdSet::as_mut_ptr(write),
        FdSet::as_mut_ptr(error),
        timeout_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_contains() {
        let mut set = FdSet::new();

        assert!(set.insert(3));
        assert!(set.insert(5));
        assert!(set.contains(3));
        assert!(set.contains(5));
        assert!(!set.contains(4));

        set.remove(3);
        assert!(!set.contains(3));
        assert!(set.contains(5));
    }

    #[test]
    fn test_clear_empties_set() {
        let mut set = FdSet::new();
        set.insert(1);
        set.insert(2);

        set.clear();

        assert_eq!(set.iter(FdSet::CAPACITY as i32).count(), 0);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut master = FdSet::new();
        master.insert(4);

        let mut working = master;
        working.remove(4);

        assert!(master.contains(4));
        assert!(!working.contains(4));
    }
}
