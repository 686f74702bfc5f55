// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_after_2020() {
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::at(1_000);
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), 61_000);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.epoch_ms();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.epoch_ms() - t1, 30_000);
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::default();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
