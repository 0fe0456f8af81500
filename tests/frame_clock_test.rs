mod common;

use common::test_utils::water;
use instant::{Duration, Instant};
use pagoda_viewer::viewer::frame_clock::FrameClock;

#[test]
fn clock_starts_at_the_first_tick() {
    let mut clock = FrameClock::new();
    let start = Instant::now();

    assert_eq!(clock.tick_at(start, None), 0.0);
    assert_eq!(clock.tick_at(start + Duration::from_millis(1500), None), 1.5);
}

#[test]
fn clock_drives_the_water_time() {
    let water = water();
    let mut clock = FrameClock::new();
    let start = Instant::now();

    clock.tick_at(start, Some(&water));
    assert_eq!(water.time(), 0.0);
    clock.tick_at(start + Duration::from_secs(2), Some(&water));
    assert_eq!(water.time(), 2.0);
}

#[test]
fn water_time_never_goes_back() {
    let water = water();
    let mut clock = FrameClock::new();
    let start = Instant::now();
    clock.tick_at(start, Some(&water));

    let mut last = 0.0;
    for millis in [16, 33, 20, 50, 0, 100] {
        let time = clock.tick_at(start + Duration::from_millis(millis), Some(&water));
        assert!(time >= last, "{} after {}", time, last);
        assert_eq!(water.time(), time);
        last = time;
    }
    assert!((clock.elapsed() - 0.1).abs() < 1e-6);
}

#[test]
fn ticking_without_water_keeps_time() {
    let mut clock = FrameClock::new();
    let start = Instant::now();
    clock.tick_at(start, None);
    clock.tick_at(start + Duration::from_secs(1), None);
    assert_eq!(clock.elapsed(), 1.0);
}
