//! Time-based loading progress.
//!
//! The value is an estimate: it ramps linearly towards a cap over a nominal
//! load duration while anything is loading and jumps to 100 when loading
//! ends. It never measures transferred bytes.

use std::{cell::Cell, rc::Rc};

use instant::{Duration, Instant};

use crate::config::ProgressConfig;

/// Counts asset loads that are still in flight. Clones share the count.
#[derive(Clone, Debug, Default)]
pub struct LoadTracker {
    pending: Rc<Cell<usize>>,
}

impl LoadTracker {
    pub fn begin(&self) {
        self.pending.set(self.pending.get() + 1);
    }

    pub fn finish(&self) {
        match self.pending.get() {
            0 => log::warn!("A load finished that was never started"),
            n => self.pending.set(n - 1),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// True while at least one load is pending.
    pub fn is_active(&self) -> bool {
        self.pending.get() > 0
    }
}

/// Progress after `elapsed` loading time: `min(cap, elapsed / nominal * cap)`.
pub fn ramp(config: &ProgressConfig, elapsed: Duration) -> f32 {
    let nominal = config.nominal_duration_secs.max(f32::EPSILON);
    (elapsed.as_secs_f32() / nominal * config.cap).min(config.cap)
}

#[derive(Clone, Debug)]
pub struct LoadingProgress {
    config: ProgressConfig,
    value: f32,
    active: bool,
    ramp_start: Option<Instant>,
}

impl LoadingProgress {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            value: 0.0,
            active: false,
            ramp_start: None,
        }
    }

    /**
     * Feeds the current loading state, once per frame.
     *
     * Becoming active starts a new ramp at `now`. Becoming inactive sets the
     * value to 100 and drops the ramp, so inactive frames do no further work.
     */
    pub fn observe(&mut self, active: bool, now: Instant) -> f32 {
        if active {
            let start = *self.ramp_start.get_or_insert(now);
            let elapsed = if now > start {
                now - start
            } else {
                Duration::ZERO
            };
            self.value = ramp(&self.config, elapsed);
        } else {
            self.ramp_start = None;
            self.value = 100.0;
        }
        self.active = active;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True while a ramp is running.
    pub fn is_ramping(&self) -> bool {
        self.ramp_start.is_some()
    }

    /// Nothing is shown once loading is over and the bar is full.
    pub fn is_visible(&self) -> bool {
        self.active || self.value < 100.0
    }
}
