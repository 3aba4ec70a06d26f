//! IPv4 multicast configuration on datagram descriptors.
//!
//! Each function issues exactly one `setsockopt` on `IPPROTO_IP` and
//! returns [`Error::Os`](crate::Error::Os) with the raw platform code on
//! failure. Nothing is retried and no state is kept.
//!
//! With the `igmpv3` feature on Linux, group membership is source-specific
//! with an any-source filter.

use crate::error::Result;
use crate::sys::{RawDescriptor, platform};

use std::net::Ipv4Addr;

/// Sets the time-to-live of outgoing multicast datagrams.
pub fn set_ttl(fd: RawDescriptor, ttl: u8) -> Result<()> {
    platform::set_multicast_ttl(fd, ttl)
}

/// Enables or disables loopback of outgoing multicast datagrams.
pub fn set_loopback(fd: RawDescriptor, enabled: bool) -> Result<()> {
    platform::set_multicast_loop(fd, enabled)
}

/// Selects the local interface used for outgoing multicast datagrams.
///
/// [`Ipv4Addr::UNSPECIFIED`] lets the system choose.
pub fn set_interface(fd: RawDescriptor, interface: Ipv4Addr) -> Result<()> {
    platform::set_multicast_interface(fd, interface)
}

/// Joins `group` on `interface`.
pub fn join_group(fd: RawDescriptor, group: Ipv4Addr, interface: Ipv4Addr) -> Result<()> {
    platform::set_membership(fd, group, interface, true)
}

/// Leaves `group` on `interface`.
pub fn leave_group(fd: RawDescriptor, group: Ipv4Addr, interface: Ipv4Addr) -> Result<()> {
    platform::set_membership(fd, group, interface, false)
}
