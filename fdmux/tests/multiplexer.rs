#![cfg(unix)]

use fdmux::epoll::Event;
use fdmux::{Error, Interest, Multiplexer, MultiplexerBuilder, RegistrationFault, Strategy};

use std::io::{Write, pipe};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

fn available_strategies() -> Vec<Strategy> {
    [
        Strategy::LevelRescan,
        Strategy::ListBased,
        Strategy::EdgeRegistration,
    ]
    .into_iter()
    .filter(|s| s.is_available())
    .collect()
}

fn build(strategy: Strategy) -> Multiplexer {
    MultiplexerBuilder::new()
        .expected_descriptors(4)
        .strategy(strategy)
        .build()
        .unwrap()
}

#[test]
fn multiplexer_zero_timeout_returns_immediately() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);
        let (reader, _writer) = pipe().unwrap();
        mux.register(reader.as_raw_fd(), Interest::READABLE).unwrap();

        let mut events = [Event::default(); 4];

        assert_eq!(mux.wait(&mut events, 0).unwrap(), 0, "{:?}", strategy);
    }
}

#[test]
fn multiplexer_reports_single_writable_descriptor() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);

        let (r1, _w1) = pipe().unwrap();
        let (r2, _w2) = pipe().unwrap();
        let (_r3, w3) = pipe().unwrap();

        let interest = Interest::READABLE | Interest::WRITABLE;
        for fd in [r1.as_raw_fd(), r2.as_raw_fd(), w3.as_raw_fd()] {
            mux.register(fd, interest).unwrap();
        }

        let mut events = [Event::default(); 4];
        let ready = mux.wait(&mut events, 100).unwrap();

        assert_eq!(ready, 1, "{:?}", strategy);
        assert_eq!(events[0].descriptor(), w3.as_raw_fd());
        assert_eq!(events[0].observed(), Interest::WRITABLE);
    }
}

#[test]
fn multiplexer_stream_pair_scenario() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);
        let (mut left, right) = UnixStream::pair().unwrap();

        let interest = Interest::READABLE | Interest::WRITABLE;
        mux.register(left.as_raw_fd(), interest).unwrap();
        mux.register(right.as_raw_fd(), interest).unwrap();

        let mut events = [Event::default(); 4];
        let ready = mux.wait(&mut events, 100).unwrap();

        assert!(ready >= 1, "{:?}", strategy);
        for event in &events[..ready] {
            assert!(event.observed().is_writable());
            assert!(!event.observed().is_readable());
        }

        left.write_all(b"x").unwrap();

        let ready = mux.wait(&mut events, 100).unwrap();
        let peer = events[..ready]
            .iter()
            .find(|e| e.descriptor() == right.as_raw_fd())
            .unwrap();

        assert!(peer.observed().is_readable(), "{:?}", strategy);
    }
}

#[test]
fn multiplexer_reregister_narrows_interest() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);
        let (_reader, writer) = pipe().unwrap();
        let fd = writer.as_raw_fd();

        mux.register(fd, Interest::WRITABLE).unwrap();
        mux.reregister(fd, Interest::READABLE).unwrap();

        let mut events = [Event::default(); 4];

        assert_eq!(mux.wait(&mut events, 0).unwrap(), 0, "{:?}", strategy);
    }
}

#[test]
fn multiplexer_registration_faults() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);
        let (reader, _writer) = pipe().unwrap();
        let fd = reader.as_raw_fd();

        mux.register(fd, Interest::READABLE).unwrap();

        assert_eq!(
            mux.register(fd, Interest::READABLE),
            Err(Error::InvalidRegistration {
                descriptor: fd,
                fault: RegistrationFault::AlreadyRegistered,
            }),
            "{:?}",
            strategy
        );

        mux.deregister(fd).unwrap();

        assert_eq!(
            mux.deregister(fd),
            Err(Error::InvalidRegistration {
                descriptor: fd,
                fault: RegistrationFault::NotRegistered,
            }),
            "{:?}",
            strategy
        );

        mux.register(fd, Interest::READABLE).unwrap();
    }
}

#[test]
fn multiplexer_empty_buffer_returns_zero() {
    for strategy in available_strategies() {
        let mut mux = build(strategy);
        let (_reader, writer) = pipe().unwrap();
        mux.register(writer.as_raw_fd(), Interest::WRITABLE).unwrap();

        assert_eq!(mux.wait(&mut [], 0), Ok(0), "{:?}", strategy);
    }
}

#[test]
fn multiplexer_builder_defaults_to_list_based() {
    let mux = Multiplexer::builder().build().unwrap();

    assert_eq!(mux.strategy(), Strategy::ListBased);
}
