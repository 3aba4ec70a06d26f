//! Error types returned by the multiplexing layer.
//!
//! Every fallible operation in this crate returns [`Result`]. The taxonomy is
//! small:
//!
//! - an interrupted wait is **not** an error; it is reported as zero ready
//!   descriptors,
//! - [`Error::CapabilityUnavailable`] is only produced when an edge-registration
//!   session is requested on a platform without kernel support,
//! - [`Error::InvalidRegistration`] and [`Error::InvalidHandle`] describe caller
//!   mistakes the OS (or the resolver) detected,
//! - everything else is passed through verbatim as [`Error::Os`].

use crate::sys::RawDescriptor;

use std::fmt;
use std::io;

/// Why a registration request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationFault {
    /// The descriptor is already part of the registration table.
    AlreadyRegistered,

    /// The descriptor is not part of the registration table.
    NotRegistered,

    /// The descriptor cannot be represented by the level-rescan sets.
    OutOfRange,
}

impl fmt::Display for RegistrationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RegistrationFault::AlreadyRegistered => "already registered",
            RegistrationFault::NotRegistered => "not registered",
            RegistrationFault::OutOfRange => "outside the selectable range",
        };

        f.write_str(text)
    }
}

/// Errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Kernel edge-registration polling is not available on this platform.
    #[error("edge-registration polling is not supported on this platform")]
    CapabilityUnavailable,

    /// A registration change referenced a descriptor in the wrong state.
    #[error("descriptor {descriptor} is {fault}")]
    InvalidRegistration {
        descriptor: RawDescriptor,
        fault: RegistrationFault,
    },

    /// Descriptor resolution was attempted on a closed managed handle.
    #[error("managed handle is closed")]
    InvalidHandle,

    /// Any other OS failure, carrying the raw platform error code.
    #[error("{}", describe_os(.0))]
    Os(i32),
}

impl Error {
    /// Builds an [`Error::Os`] from the calling thread's last OS error.
    pub(crate) fn last_os_error() -> Self {
        Error::Os(crate::sys::last_error_code())
    }

    /// Returns the raw platform error code, if this error carries one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os(code) => Some(*code),
            _ => None,
        }
    }
}

fn describe_os(code: &i32) -> String {
    io::Error::from_raw_os_error(*code).to_string()
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Os(code) => io::Error::from_raw_os_error(code),
            Error::CapabilityUnavailable => io::Error::new(io::ErrorKind::Unsupported, err),
            Error::InvalidRegistration { fault, .. } => {
                let kind = match fault {
                    RegistrationFault::AlreadyRegistered => io::ErrorKind::AlreadyExists,
                    RegistrationFault::NotRegistered => io::ErrorKind::NotFound,
                    RegistrationFault::OutOfRange => io::ErrorKind::InvalidInput,
                };
                io::Error::new(kind, err)
            }
            Error::InvalidHandle => io::Error::new(io::ErrorKind::InvalidInput, err),
        }
    }
}

/// A specialized `Result` type for multiplexing operations.
pub type Result<T> = std::result::Result<T, Error>;
