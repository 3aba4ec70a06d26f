#![cfg(unix)]

use fdmux::Interest;
use fdmux::poll::{PollFd, wait_poll};
use fdmux::select::{FdSet, INFINITE, wait_select};

use std::io::pipe;
use std::mem;
use std::os::fd::AsRawFd;
use std::ptr;
use std::sync::Once;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

extern "C" fn on_signal(_: libc::c_int) {}

/// Installs a no-op `SIGUSR1` handler without `SA_RESTART`.
fn install_handler() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);

        assert_eq!(libc::sigaction(libc::SIGUSR1, &action, ptr::null_mut()), 0);
    });
}

struct Target(libc::pthread_t);

unsafe impl Send for Target {}

/// Runs `wait` on its own thread and signals that thread until the wait
/// returns.
fn interrupted<F>(wait: F) -> fdmux::Result<usize>
where
    F: FnOnce() -> fdmux::Result<usize> + Send + 'static,
{
    install_handler();

    let (target_tx, target_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        target_tx
            .send(Target(unsafe { libc::pthread_self() }))
            .unwrap();
        result_tx.send(wait()).unwrap();
    });

    let target = target_rx.recv().unwrap();

    let result = loop {
        unsafe { libc::pthread_kill(target.0, libc::SIGUSR1) };

        match result_rx.recv_timeout(Duration::from_millis(20)) {
            Ok(result) => break result,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => panic!("waiting thread exited early"),
        }
    };

    handle.join().unwrap();
    result
}

#[test]
fn interrupted_poll_returns_zero() {
    let result = interrupted(|| {
        let (reader, _writer) = pipe().unwrap();
        let mut entries = [PollFd::new(reader.as_raw_fd(), Interest::READABLE)];

        wait_poll(&mut entries, -1)
    });

    assert_eq!(result, Ok(0));
}

#[test]
fn interrupted_select_returns_zero() {
    let result = interrupted(|| {
        let (reader, _writer) = pipe().unwrap();
        let fd = reader.as_raw_fd();

        let mut read = FdSet::new();
        read.insert(fd);

        wait_select(fd + 1, Some(&mut read), None, None, INFINITE)
    });

    assert_eq!(result, Ok(0));
}

#[cfg(target_os = "linux")]
#[test]
fn interrupted_session_wait_returns_zero() {
    use fdmux::epoll::{Event, Session};

    let result = interrupted(|| {
        let session = Session::create(1).unwrap();
        let (reader, _writer) = pipe().unwrap();
        session.add(reader.as_raw_fd(), Interest::READABLE).unwrap();

        let mut events = [Event::default(); 1];
        session.wait(&mut events, -1)
    });

    assert_eq!(result, Ok(0));
}
