//! Windows platform adapter.
//!
//! This module mirrors the Unix adapter on top of WinSock and exposes the
//! same function names and semantics where possible.
//!
//! Notable differences:
//! - an `FD_SET` is an array of at most 64 sockets rather than a bitmap, so
//!   its capacity is a socket count, not a descriptor number bound,
//! - `select` ignores `nfds`,
//! - the list-based wait uses `WSAPoll`, which refuses `POLLPRI` and the
//!   always-reported bits in the request mask.

use crate::error::{Error, Result};
use crate::interest::Interest;

use std::mem;
use std::net::Ipv4Addr;
use std::ptr;
use std::sync::Once;
use std::time::{SystemTime, UNIX_EPOCH};

use windows_sys::Win32::Networking::WinSock::{
    FD_SET, IN_ADDR, IN_ADDR_0, IP_ADD_MEMBERSHIP, IP_DROP_MEMBERSHIP, IP_MREQ, IP_MULTICAST_IF,
    IP_MULTICAST_LOOP, IP_MULTICAST_TTL, IPPROTO_IP, POLLERR, POLLHUP, POLLNVAL, POLLRDBAND,
    POLLRDNORM, POLLWRNORM, SOCKET, SOCKET_ERROR, TIMEVAL, WSADATA, WSAEINTR, WSAGetLastError,
    WSAPOLLFD, WSAPoll, WSAStartup, select as wsa_select, setsockopt,
};

/// Native descriptor type.
///
/// Sockets are WinSock `SOCKET`s; pipe halves resolve to their `HANDLE`.
pub type RawDescriptor = std::os::windows::io::RawSocket;

/// Native `FD_SET`.
pub(crate) type NativeFdSet = FD_SET;

/// Native `WSAPOLLFD`.
pub(crate) type NativePollFd = WSAPOLLFD;

/// Number of sockets an `FD_SET` can hold.
pub(crate) const FD_SET_CAPACITY: usize = 64;

/// Interest bits that may be passed to `WSAPoll`.
const POLL_REQUEST: [(Interest, i16); 3] = [
    (Interest::READABLE, POLLRDNORM as i16),
    (Interest::PRIORITY, POLLRDBAND as i16),
    (Interest::WRITABLE, POLLWRNORM as i16),
];

/// Event bits `WSAPoll` may report.
const POLL_REPORT: [(Interest, i16); 6] = [
    (Interest::READABLE, POLLRDNORM as i16),
    (Interest::PRIORITY, POLLRDBAND as i16),
    (Interest::WRITABLE, POLLWRNORM as i16),
    (Interest::ERROR, POLLERR as i16),
    (Interest::HANGUP, POLLHUP as i16),
    (Interest::INVALID, POLLNVAL as i16),
];

/// Creates a MAKEWORD value for Winsock version.
#[inline]
const fn makeword(low: u8, high: u8) -> u16 {
    ((high as u16) << 8) | (low as u16)
}

/// Winsock initialization guard.
static WINSOCK_INIT: Once = Once::new();

/// Initialize Winsock if not already initialized.
///
/// A failed startup is not fatal here: the following WinSock call reports
/// `WSANOTINITIALISED`, which is surfaced to the caller.
pub(crate) fn ensure_winsock() {
    WINSOCK_INIT.call_once(|| unsafe {
        let mut data: WSADATA = mem::zeroed();
        let _ = WSAStartup(makeword(2, 2), &mut data as *mut _);
    });
}

/// Returns the calling thread's last WinSock error.
pub(crate) fn last_error_code() -> i32 {
    unsafe { WSAGetLastError() as i32 }
}

/// Converts a wait return value into a ready count.
///
/// `WSAEINTR` is reported as zero ready descriptors.
pub(crate) fn ready_count(rc: i32) -> Result<usize> {
    if rc != SOCKET_ERROR {
        return Ok(rc as usize);
    }

    match last_error_code() {
        code if code == WSAEINTR as i32 => Ok(0),
        code => Err(Error::Os(code)),
    }
}

/// Returns an empty `FD_SET`.
pub(crate) fn fd_set_new() -> FD_SET {
    FD_SET {
        fd_count: 0,
        fd_array: [0; FD_SET_CAPACITY],
    }
}

/// Clears every socket from `set`.
pub(crate) fn fd_set_clear(set: &mut FD_SET) {
    set.fd_count = 0;
}

fn members(set: &FD_SET) -> &[SOCKET] {
    &set.fd_array[..(set.fd_count as usize).min(FD_SET_CAPACITY)]
}

/// Adds `fd` to `set`.
///
/// Returns `false` when the set is already full.
pub(crate) fn fd_set_insert(set: &mut FD_SET, fd: RawDescriptor) -> bool {
    if fd_set_contains(set, fd) {
        return true;
    }

    let count = set.fd_count as usize;
    if count >= FD_SET_CAPACITY {
        return false;
    }

    set.fd_array[count] = fd as SOCKET;
    set.fd_count += 1;
    true
}

/// Removes `fd` from `set`, preserving the order of the remaining sockets.
pub(crate) fn fd_set_remove(set: &mut FD_SET, fd: RawDescriptor) {
    let count = set.fd_count as usize;

    if let Some(index) = members(set).iter().position(|&s| s == fd as SOCKET) {
        set.fd_array.copy_within(index + 1..count, index);
        set.fd_count -= 1;
    }
}

/// Returns `true` if `fd` is a member of `set`.
pub(crate) fn fd_set_contains(set: &FD_SET, fd: RawDescriptor) -> bool {
    members(set).contains(&(fd as SOCKET))
}

/// Iterates over the members of `set`. `nfds` is ignored on Windows.
pub(crate) fn fd_set_iter(set: &FD_SET, _nfds: i32) -> impl Iterator<Item = RawDescriptor> + '_ {
    members(set).iter().map(|&s| s as RawDescriptor)
}

/// Calls WinSock `select`.
///
/// A timeout of `-1` blocks forever.
pub(crate) fn select(
    nfds: i32,
    read: *mut FD_SET,
    write: *mut FD_SET,
    error: *mut FD_SET,
    timeout_ms: i64,
) -> Result<usize> {
    ensure_winsock();

    let tv = TIMEVAL {
        tv_sec: (timeout_ms / 1000) as i32,
        tv_usec: ((timeout_ms % 1000) * 1000) as i32,
    };

    let timeout = if timeout_ms == -1 {
        ptr::null()
    } else {
        &tv as *const TIMEVAL
    };

    let rc = unsafe { wsa_select(nfds, read, write, error, timeout) };
    ready_count(rc)
}

/// Builds a `WSAPOLLFD` requesting `interest` on `fd`.
pub(crate) fn pollfd_new(fd: RawDescriptor, interest: Interest) -> WSAPOLLFD {
    WSAPOLLFD {
        fd: fd as SOCKET,
        events: to_poll_events(interest) as _,
        revents: 0,
    }
}

/// Calls `WSAPoll` over `len` entries starting at `fds`.
pub(crate) fn poll(fds: *mut WSAPOLLFD, len: usize, timeout_ms: i32) -> Result<usize> {
    ensure_winsock();

    let rc = unsafe { WSAPoll(fds, len as u32, timeout_ms) };
    ready_count(rc)
}

/// Translates an interest mask into `WSAPoll` request bits.
pub(crate) fn to_poll_events(interest: Interest) -> i16 {
    POLL_REQUEST
        .iter()
        .filter(|(flag, _)| interest.contains(*flag))
        .fold(0, |events, (_, bit)| events | bit)
}

/// Translates `WSAPoll` result bits into an interest mask.
pub(crate) fn from_poll_events(events: i16) -> Interest {
    POLL_REPORT
        .iter()
        .filter(|(_, bit)| events & bit != 0)
        .fold(Interest::empty(), |interest, (flag, _)| interest | *flag)
}

/// Sets an `IPPROTO_IP` level option on `fd`.
fn set_ip_option<T>(fd: RawDescriptor, name: i32, value: &T) -> Result<()> {
    ensure_winsock();

    let rc = unsafe {
        setsockopt(
            fd as SOCKET,
            IPPROTO_IP as i32,
            name,
            value as *const T as *const u8,
            mem::size_of::<T>() as i32,
        )
    };

    if rc == SOCKET_ERROR {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

fn to_in_addr(addr: Ipv4Addr) -> IN_ADDR {
    IN_ADDR {
        S_un: IN_ADDR_0 {
            S_addr: u32::from_ne_bytes(addr.octets()),
        },
    }
}

/// Sets `IP_MULTICAST_TTL`. WinSock expects a `DWORD`.
pub(crate) fn set_multicast_ttl(fd: RawDescriptor, ttl: u8) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_TTL as i32, &(ttl as u32))
}

/// Sets `IP_MULTICAST_LOOP`. WinSock expects a `DWORD`.
pub(crate) fn set_multicast_loop(fd: RawDescriptor, enabled: bool) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_LOOP as i32, &(enabled as u32))
}

/// Sets `IP_MULTICAST_IF`.
pub(crate) fn set_multicast_interface(fd: RawDescriptor, interface: Ipv4Addr) -> Result<()> {
    set_ip_option(fd, IP_MULTICAST_IF as i32, &to_in_addr(interface))
}

/// Joins or leaves a multicast group with `IP_ADD/DROP_MEMBERSHIP`.
pub(crate) fn set_membership(
    fd: RawDescriptor,
    group: Ipv4Addr,
    interface: Ipv4Addr,
    join: bool,
) -> Result<()> {
    let mreq = IP_MREQ {
        imr_multiaddr: to_in_addr(group),
        imr_interface: to_in_addr(interface),
    };

    let name = if join {
        IP_ADD_MEMBERSHIP
    } else {
        IP_DROP_MEMBERSHIP
    };

    set_ip_option(fd, name as i32, &mreq)
}

/// Returns the wall clock in microseconds since the Unix epoch.
pub(crate) fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
