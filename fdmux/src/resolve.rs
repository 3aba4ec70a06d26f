//! Descriptor resolution for managed handles.
//!
//! Every managed socket or channel type implements [`DescriptorSource`].
//! [`ManagedHandle`] tags one of the five supported variants and
//! [`resolve`] dispatches on that tag with a plain `match`.
//!
//! Extraction differs by platform. On Unix every variant reads its file
//! descriptor. On Windows sockets report their `SOCKET` while pipe halves
//! report their `HANDLE`.

use crate::error::{Error, Result};
use crate::sys::RawDescriptor;

use std::io::{PipeReader, PipeWriter};
use std::net::{TcpListener, TcpStream, UdpSocket};

#[cfg(unix)]
use std::os::fd::AsRawFd;

#[cfg(windows)]
use std::os::windows::io::{AsRawHandle, AsRawSocket};

/// A managed object backed by a native descriptor.
pub trait DescriptorSource {
    /// Returns the native descriptor. The object keeps ownership of it.
    fn descriptor(&self) -> RawDescriptor;
}

#[cfg(unix)]
macro_rules! descriptor_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DescriptorSource for $ty {
                fn descriptor(&self) -> RawDescriptor {
                    self.as_raw_fd()
                }
            }
        )*
    };
}

#[cfg(unix)]
descriptor_source!(TcpListener, TcpStream, UdpSocket, PipeReader, PipeWriter);

#[cfg(windows)]
macro_rules! descriptor_source {
    (sockets: $($sock:ty),*; handles: $($handle:ty),* $(,)?) => {
        $(
            impl DescriptorSource for $sock {
                fn descriptor(&self) -> RawDescriptor {
                    self.as_raw_socket()
                }
            }
        )*
        $(
            impl DescriptorSource for $handle {
                fn descriptor(&self) -> RawDescriptor {
                    self.as_raw_handle() as usize as RawDescriptor
                }
            }
        )*
    };
}

#[cfg(windows)]
descriptor_source!(
    sockets: TcpListener, TcpStream, UdpSocket;
    handles: PipeReader, PipeWriter
);

/// The managed object behind an open [`ManagedHandle`].
#[derive(Debug)]
pub enum Channel {
    /// A listening socket.
    Listener(TcpListener),
    /// A connected stream socket.
    Stream(TcpStream),
    /// A datagram socket.
    Datagram(UdpSocket),
    /// The readable half of a pipe.
    Readable(PipeReader),
    /// The writable half of a pipe.
    Writable(PipeWriter),
}

impl DescriptorSource for Channel {
    fn descriptor(&self) -> RawDescriptor {
        match self {
            Channel::Listener(listener) => listener.descriptor(),
            Channel::Stream(stream) => stream.descriptor(),
            Channel::Datagram(socket) => socket.descriptor(),
            Channel::Readable(reader) => reader.descriptor(),
            Channel::Writable(writer) => writer.descriptor(),
        }
    }
}

/// A managed handle that may have been closed.
///
/// Closing drops the underlying object, which closes its descriptor.
#[derive(Debug)]
pub struct ManagedHandle {
    channel: Option<Channel>,
}

impl ManagedHandle {
    /// Wraps an open channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// Closes the handle. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.channel = None;
    }

    /// Returns `true` once the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.channel.is_none()
    }

    /// Returns the open channel, if any.
    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }
}

impl From<Channel> for ManagedHandle {
    fn from(channel: Channel) -> Self {
        Self::new(channel)
    }
}

macro_rules! managed_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ManagedHandle {
                fn from(value: $ty) -> Self {
                    Self::new(Channel::$variant(value))
                }
            }
        )*
    };
}

managed_from!(
    TcpListener => Listener,
    TcpStream => Stream,
    UdpSocket => Datagram,
    PipeReader => Readable,
    PipeWriter => Writable,
);

/// Returns the native descriptor behind `handle`.
///
/// # Errors
///
/// [`Error::InvalidHandle`] if the handle is closed. No syscall is made.
pub fn resolve(handle: &ManagedHandle) -> Result<RawDescriptor> {
    handle
        .channel
        .as_ref()
        .map(DescriptorSource::descriptor)
        .ok_or(Error::InvalidHandle)
}
