//! Raw syscall adapters.
//!
//! This module provides one thin adapter per platform over the native wait
//! primitives and socket options. The adapters expose identical function
//! names so the public modules never branch on the target themselves.
//!
//! Two normalizations are applied here and nowhere else:
//! - an interrupted wait returns zero ready descriptors,
//! - an operation the platform cannot perform returns
//!   [`Error::CapabilityUnavailable`](crate::Error::CapabilityUnavailable)
//!   without attempting a syscall.
//!
//! The concrete implementation is selected at compile time.

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(unix)]
pub(crate) use unix as platform;

#[cfg(windows)]
pub(crate) mod windows;

#[cfg(windows)]
pub(crate) use windows as platform;

#[cfg(target_os = "linux")]
pub(crate) mod epoll;

#[cfg(target_os = "linux")]
pub(crate) use epoll as edge;

#[cfg(not(target_os = "linux"))]
pub(crate) mod unsupported;

#[cfg(not(target_os = "linux"))]
pub(crate) use unsupported as edge;

pub use platform::RawDescriptor;

/// Returns the calling thread's last OS error code.
///
/// This is `errno` on Unix and `WSAGetLastError()` on Windows.
pub fn last_error_code() -> i32 {
    platform::last_error_code()
}
