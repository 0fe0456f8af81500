use instant::{Duration, Instant};
use pagoda_viewer::{
    config::{OVERLAY, PROGRESS, ProgressConfig},
    viewer::{
        overlay::ProgressOverlay,
        progress::{LoadTracker, LoadingProgress, ramp},
    },
};

fn close(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 1e-3
}

#[test]
fn ramp_follows_the_nominal_duration() {
    assert_eq!(ramp(&PROGRESS, Duration::ZERO), 0.0);
    let at_ten = ramp(&PROGRESS, Duration::from_secs(10));
    assert!(close(at_ten, 10.0 / 60.0 * 95.0), "got {}", at_ten);
    assert!(close(ramp(&PROGRESS, Duration::from_secs(30)), 47.5));
}

#[test]
fn ramp_stops_at_the_cap() {
    assert_eq!(ramp(&PROGRESS, Duration::from_secs(60)), 95.0);
    assert_eq!(ramp(&PROGRESS, Duration::from_secs(600)), 95.0);
}

#[test]
fn progress_ramps_while_loading_and_completes_afterwards() {
    let start = Instant::now();
    let mut progress = LoadingProgress::new(PROGRESS);

    assert_eq!(progress.observe(true, start), 0.0);
    assert!(progress.is_visible());
    let value = progress.observe(true, start + Duration::from_secs(10));
    assert!(close(value, 15.833), "got {}", value);
    assert_eq!(progress.observe(true, start + Duration::from_secs(120)), 95.0);
    assert!(progress.is_visible());

    assert_eq!(progress.observe(false, start + Duration::from_secs(121)), 100.0);
    assert!(!progress.is_visible());
    assert!(!progress.is_ramping());
}

#[test]
fn progress_stays_in_range() {
    let start = Instant::now();
    let mut progress = LoadingProgress::new(PROGRESS);
    for seconds in [0, 1, 5, 59, 60, 61, 3600] {
        let value = progress.observe(true, start + Duration::from_secs(seconds));
        assert!((0.0..=95.0).contains(&value), "{} at {}s", value, seconds);
    }
    assert_eq!(progress.observe(false, start), 100.0);
}

#[test]
fn new_load_restarts_the_ramp() {
    let start = Instant::now();
    let mut progress = LoadingProgress::new(PROGRESS);
    progress.observe(true, start);
    progress.observe(false, start + Duration::from_secs(30));

    let later = start + Duration::from_secs(100);
    assert_eq!(progress.observe(true, later), 0.0);
    assert!(progress.is_visible());
    let value = progress.observe(true, later + Duration::from_secs(6));
    assert!(close(value, 9.5), "got {}", value);
}

#[test]
fn idle_progress_is_hidden_from_the_start() {
    let mut progress = LoadingProgress::new(PROGRESS);
    assert_eq!(progress.observe(false, Instant::now()), 100.0);
    assert!(!progress.is_visible());
    assert!(!progress.is_active());
}

#[test]
fn custom_durations_scale_the_ramp() {
    let quick = ProgressConfig {
        nominal_duration_secs: 2.0,
        cap: 90.0,
    };
    assert!(close(ramp(&quick, Duration::from_secs(1)), 45.0));
    assert_eq!(ramp(&quick, Duration::from_secs(3)), 90.0);
}

#[test]
fn tracker_counts_pending_loads() {
    let tracker = LoadTracker::default();
    let shared = tracker.clone();
    assert!(!tracker.is_active());

    tracker.begin();
    shared.begin();
    assert_eq!(tracker.pending(), 2);

    shared.finish();
    assert!(tracker.is_active());
    tracker.finish();
    assert!(!shared.is_active());

    // Unbalanced finishes never underflow
    tracker.finish();
    assert_eq!(tracker.pending(), 0);
}

#[test]
fn overlay_uniform_follows_the_progress() {
    let mut overlay = ProgressOverlay::new(&PROGRESS, &OVERLAY).expect("overlay colours are valid");
    let start = Instant::now();

    overlay.observe(true, start, (800, 600), 1.0);
    overlay.observe(true, start + Duration::from_secs(30), (800, 600), 1.0);
    assert!(close(overlay.uniform().progress(), 0.475));
    assert!(overlay.progress().is_visible());

    overlay.observe(false, start + Duration::from_secs(31), (800, 600), 1.0);
    assert_eq!(overlay.uniform().progress(), 1.0);
    assert!(!overlay.progress().is_visible());
}

#[test]
fn overlay_bar_follows_the_scale_factor() {
    let mut overlay = ProgressOverlay::new(&PROGRESS, &OVERLAY).expect("overlay colours are valid");
    let start = Instant::now();

    overlay.observe(true, start, (1600, 1200), 2.0);
    assert_eq!(
        overlay.uniform().bar_size(),
        [OVERLAY.bar_size[0] * 2.0, OVERLAY.bar_size[1] * 2.0]
    );

    overlay.observe(true, start, (800, 600), 1.0);
    assert_eq!(overlay.uniform().bar_size(), OVERLAY.bar_size);
}
