use instant::{Duration, Instant};

use crate::data_structures::material::WaterMaterial;

/// Drives the water time with the seconds elapsed since the first frame.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    elapsed: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, water: Option<&WaterMaterial>) -> f32 {
        self.tick_at(Instant::now(), water)
    }

    /// The first tick starts the clock. The result never decreases.
    pub fn tick_at(&mut self, now: Instant, water: Option<&WaterMaterial>) -> f32 {
        let start = *self.start.get_or_insert(now);
        let since_start = if now > start {
            now - start
        } else {
            Duration::ZERO
        };
        self.elapsed = self.elapsed.max(since_start.as_secs_f32());
        if let Some(water) = water {
            water.set_time(self.elapsed);
        }
        self.elapsed
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
