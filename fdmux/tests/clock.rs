use fdmux::clock::{self, CLOCK_GRANULARITY_MS};

#[test]
fn clock_now_micros_is_non_decreasing() {
    let mut last = clock::now_micros();

    for _ in 0..1_000 {
        let now = clock::now_micros();
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn clock_is_past_the_epoch() {
    // 2020-01-01T00:00:00Z
    assert!(clock::now_micros() > 1_577_836_800_000_000);
}

#[test]
fn clock_deadline_loop_reaches_zero() {
    let deadline = clock::now_millis() + 3 * CLOCK_GRANULARITY_MS;

    loop {
        let timeout = clock::poll_timeout(Some(deadline), clock::now_millis());
        if timeout == 0 {
            break;
        }

        assert!(timeout > 0);
        std::thread::sleep(std::time::Duration::from_millis(timeout as u64));
    }

    assert!(clock::now_millis() + CLOCK_GRANULARITY_MS >= deadline);
}
