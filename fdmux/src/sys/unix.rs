use crate::error::{Error, Result};
use crate::interest::Interest;

use libc::{
    CLOCK_REALTIME, EINTR, EINVAL, FD_CLR, FD_ISSET, FD_SET, FD_SETSIZE, FD_ZERO, IP_ADD_MEMBERSHIP,
    IP_DROP_MEMBERSHIP, IP_MULTICAST_IF, IP_MULTICAST_LOOP, IP_MULTICAST_TTL, IPPROTO_IP, POLLERR,
    POLLHUP, POLLIN, POLLNVAL, POLLOUT, POLLPRI, c_int, c_short, c_void, clock_gettime, fd_set,
    in_addr, ip_mreq, nfds_t, pollfd, setsockopt, socklen_t, timespec, timeval,
};
use std::net::Ipv4Addr;
use std::os::fd::RawFd;
use std::{io, mem, ptr};

/// Native descriptor type.
pub type RawDescriptor = RawFd;

/// Native `fd_set`.
pub(crate) type NativeFdSet = fd_set;

/// Native `struct pollfd`.
pub(crate) type NativePollFd = pollfd;

/// Number of descriptors an `fd_set` can address.
pub(crate) const FD_SET_CAPACITY: usize = FD_SETSIZE as usize;

/// Interest bits that may be passed to `poll(2)`.
const POLL_REQUEST: [(Interest, c_short); 3] = [
    (Interest::READABLE, POLLIN),
    (Interest::PRIORITY, POLLPRI),
    (Interest::WRITABLE, POLLOUT),
];

/// Event bits `poll(2)` may report.
const POLL_REPORT: [(Interest, c_short); 6] = [
    (Interest::READABLE, POLLIN),
    (Interest::PRIORITY, POLLPRI),
    (Interest::WRITABLE, POLLOUT),
    (Interest::ERROR, POLLERR),
    (Interest::HANGUP, POLLHUP),
    (Interest::INVALID, POLLNVAL),
];

/// Returns the calling thread's `errno`.
pub(crate) fn last_error_code() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Converts a wait return value into a ready count.
///
/// `EINTR` is reported as zero ready descriptors.
pub(crate) fn ready_count(rc: c_int) -> Result<usize> {
    if rc >= 0 {
        return Ok(rc as usize);
    }

    match last_error_code() {
        EINTR => Ok(0),
        code => Err(Error::Os(code)),
    }
}

/// Returns an empty `fd_set`.
pub(crate) fn fd_set_new() -> fd_set {
    let mut set: fd_set = unsafe { mem::zeroed() };
    unsafe { FD_ZERO(&mut set) };
    set
}

/// Clears every descriptor from `set`.
pub(crate) fn fd_set_clear(set: &mut fd_set) {
    unsafe { FD_ZERO(set) };
}

fn in_range(fd: RawFd) -> bool {
    fd >= 0 && (fd as usize) < FD_SET_CAPACITY
}

/// Adds `fd` to `set`.
///
/// Returns `false` when `fd` cannot be represented in an `fd_set`.
pub(crate) fn fd_set_insert(set: &mut fd_set, fd: RawFd) -> bool {
    if !in_range(fd) {
        return false;
    }

    unsafe { FD_SET(fd, set) };
    true
}

/// Removes `fd` from `set`.
pub(crate) fn fd_set_remove(set: &mut fd_set, fd: RawFd) {
    if in_range(fd) {
        unsafe { FD_CLR(fd, set) };
    }
}

/// Returns `true` if `fd` is a member of `set`.
pub(crate) fn fd_set_contains(set: &fd_set, fd: RawFd) -> bool {
    in_range(fd) && unsafe { FD_ISSET(fd, set) }
}

/// Iterates over the members of `set` below `nfds`.
pub(crate) fn fd_set_iter(set: &fd_set, nfds: c_int) -> impl Iterator<Item = RawFd> + '_ {
    let bound = nfds.clamp(0, FD_SET_CAPACITY as c_int);
    (0..bound).filter(move |&fd| unsafe { FD_ISSET(fd, set) })
}

/// Calls `select(2)`.
///
/// A timeout of `-1` blocks forever. Any other negative timeout is handed
/// to the kernel, which rejects it.
///
/// `nfds` outside `0..=FD_SET_CAPACITY` is rejected with `EINVAL` before the
/// syscall, since the kernel would access that many bits of each set.
pub(crate) fn select(
    nfds: c_int,
    read: *mut fd_set,
    write: *mut fd_set,
    error: *mut fd_set,
    timeout_ms: i64,
) -> Result<usize> {
    if nfds < 0 || nfds as usize > FD_SET_CAPACITY {
        return Err(Error::Os(EINVAL));
    }

    let mut tv: timeval = unsafe { mem::zeroed() };

    let timeout = if timeout_ms == -1 {
        ptr::null_mut()
    } else {
        tv.tv_sec = (timeout_ms / 1000) as _;
        tv.tv_usec = ((timeout_ms % 1000) * 1000) as _;
        &mut tv as *mut timeval
    };

    let rc = unsafe { libc::select(nfds, read, write, error, timeout) };
    ready_count(rc)
}

/// Builds a `pollfd` requesting `interest` on `fd`.
pub(crate) fn pollfd_new(fd: RawFd, interest: Interest) -> pollfd {
    pollfd {
        fd,
        events: to_poll_events(interest),
        revents: 0,
    }
}

/// Calls `poll(2)` over `len` entries starting at `fds`.
pub(crate) fn poll(fds: *mut pollfd, len: usize, timeout_ms: i32) -> Result<usize> {
    let rc = unsafe { libc::poll(fds, len as nfds_t, timeout_ms) };
    ready_count(rc)
}

/// Translates an interest mask into `poll(2)` request bits.
pub(crate) fn to_poll_events(interest: Interest) -> c_short {
    POLL_REQUEST
        .iter()
        .filter(|(flag, _)| interest.contains(*flag))
        .fold(0, |events, (_, bit)| events | bit)
}

/// Translates `poll(2)` result bits into an interest mask.
pub(crate) fn from_poll_events(events: c_short) -> Interest {
    POLL_REPORT
        .iter()
        .filter(|(_, bit)| events & bit != 0)
        .fold(Interest::empty(), |interest, (flag, _)| interest | *flag)
}

/// Sets an `IPPROTO_IP` level option on `fd`.
fn set_ip_option<T>(fd: RawFd, name: c_int, value: &T) -> Result<()> {
    let rc = unsafe {
        setsockopt(
            fd,
            IPPROTO_IP,
            name,
            value as *const T as *const c_void,
            mem::size_of::<T>() as socklen_t,
        )
    };

    if rc < 0 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

fn to_in_addr(addr: Ipv4Addr) -> in_addr {
    in_addr {
        s_addr: u32::from(addr).to_be(),
    }
}

/// Sets `IP_MULTICAST_TTL`.
pub(crate) fn set_multicast_ttl(fd: RawFd, ttl: u8) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_TTL, &ttl)
}

/// Sets `IP_MULTICAST_LOOP`.
pub(crate) fn set_multicast_loop(fd: RawFd, enabled: bool) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_LOOP, &(enabled as u8))
}

/// Sets `IP_MULTICAST_IF`.
pub(crate) fn set_multicast_interface(fd: RawFd, interface: Ipv4Addr) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_IF, &to_in_addr(interface))
}

/// Joins or leaves a multicast group with `IP_ADD/DROP_MEMBERSHIP`.
#[cfg(not(all(feature = "igmpv3", target_os = "linux")))]
pub(crate) fn set_membership(
    fd: RawFd,
    group: Ipv4Addr,
    interface: Ipv4Addr,
    join: bool,
) -> Result<()> {
    let mreq = ip_mreq {
        imr_multiaddr: to_in_addr(group),
        imr_interface: to_in_addr(interface),
    };

    let name = if join {
        IP_ADD_MEMBERSHIP
    } else {
        IP_DROP_MEMBERSHIP
    };

    set_ip_option(fd, name, &mreq)
}

/// Joins or leaves a multicast group with source-specific membership.
///
/// The source is `INADDR_ANY`, which accepts traffic from every sender.
#[cfg(all(feature = "igmpv3", target_os = "linux"))]
pub(crate) fn set_membership(
    fd: RawFd,
    group: Ipv4Addr,
    interface: Ipv4Addr,
    join: bool,
) -> Result<()> {
    let mreq = libc::ip_mreq_source {
        imr_multiaddr: to_in_addr(group),
        imr_interface: to_in_addr(interface),
        imr_sourceaddr: to_in_addr(Ipv4Addr::UNSPECIFIED),
    };

    let name = if join {
        libc::IP_ADD_SOURCE_MEMBERSHIP
    } else {
        libc::IP_DROP_SOURCE_MEMBERSHIP
    };

    set_ip_option(fd, name, &mreq)
}

/// Returns the wall clock in microseconds since the Unix epoch.
pub(crate) fn now_micros() -> i64 {
    let mut ts: timespec = unsafe { mem::zeroed() };
    unsafe { clock_gettime(CLOCK_REALTIME, &mut ts) };

    ts.tv_sec as i64 * 1_000_000 + ts.tv_nsec as i64 / 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_request_drops_always_reported_bits() {
        let events = to_poll_events(Interest::READABLE | Interest::ERROR | Interest::HANGUP);
        assert_eq!(events, POLLIN);
    }

    #[test]
    fn test_poll_report_translation() {
        let observed = from_poll_events(POLLOUT | POLLHUP | POLLNVAL);
        assert_eq!(
            observed,
            Interest::WRITABLE | Interest::HANGUP | Interest::INVALID
        );
    }

    #[test]
    fn test_fd_set_rejects_out_of_range() {
        let mut set = fd_set_new();

        assert!(!fd_set_insert(&mut set, -1));
        assert!(!fd_set_insert(&mut set, FD_SET_CAPACITY as RawFd));
        assert!(!fd_set_contains(&set, FD_SET_CAPACITY as RawFd));
    }

    #[test]
    fn test_fd_set_iter_respects_bound() {
        let mut set = fd_set_new();
        fd_set_insert(&mut set, 2);
        fd_set_insert(&mut set, 9);

        assert_eq!(fd_set_iter(&set, 10).collect::<Vec<_>>(), vec![2, 9]);
        assert_eq!(fd_set_iter(&set, 9).collect::<Vec<_>>(), vec![2]);
    }
}
