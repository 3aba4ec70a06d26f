//! # fdmux
//!
//! **fdmux** is the native substrate of a low-allocation networking layer.
//! It answers one question: which descriptors are ready, for what, right now.
//!
//! Three incompatible readiness primitives are exposed with one contract:
//!
//! - **Level-rescan** ([`select`]): three fixed-capacity descriptor sets,
//!   narrowed in place.
//! - **List-based** ([`poll`]): a flat slice of descriptor/interest entries,
//!   with observed events written back in place.
//! - **Edge-registration** ([`epoll`], Linux only): a kernel-held
//!   registration table, mutated incrementally.
//!
//! Every wait borrows caller-owned buffers for the duration of the call and
//! never allocates. A timeout, a wakeup with nothing ready and an interrupted
//! wait all report `Ok(0)`; callers loop and recompute their deadline with
//! [`clock::poll_timeout`].
//!
//! The [`Multiplexer`] picks one strategy at build time and dispatches
//! registration and waits to it. Thin helpers cover descriptor resolution for
//! `std` sockets and pipes ([`resolve`]) and IPv4 multicast options
//! ([`multicast`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fdmux::epoll::Event;
//! use fdmux::resolve::DescriptorSource;
//! use fdmux::{Interest, MultiplexerBuilder};
//! use std::net::UdpSocket;
//!
//! let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
//! let mut mux = MultiplexerBuilder::new().build().unwrap();
//!
//! mux.register(socket.descriptor(), Interest::READABLE).unwrap();
//!
//! let mut events = [Event::default(); 16];
//! let ready = mux.wait(&mut events, 100).unwrap();
//!
//! for event in &events[..ready] {
//!     println!("{} -> {:?}", event.descriptor(), event.observed());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`select`] - Level-rescan wait over [`FdSet`](select::FdSet)s
//! - [`poll`] - List-based wait over [`PollFd`](poll::PollFd) entries
//! - [`epoll`] - Edge-registration sessions
//! - [`mux`] - Strategy selection and the unified [`Multiplexer`]
//! - [`resolve`] - Native descriptors of managed handles
//! - [`multicast`] - IPv4 multicast socket options
//! - [`clock`] - Wall clock and timeout bookkeeping
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Strategy selection and session
//! lifetime are logged at `debug`, registration changes at `trace`. Waits are
//! never logged.

mod error;
mod interest;
mod sys;

pub mod clock;
pub mod epoll;
pub mod multicast;
pub mod mux;
pub mod poll;
pub mod resolve;
pub mod select;

pub use error::{Error, RegistrationFault, Result};
pub use interest::Interest;
pub use mux::{Multiplexer, MultiplexerBuilder, Strategy};
pub use sys::{RawDescriptor, last_error_code};
