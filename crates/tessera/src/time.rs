//! Frame timing and delta time.
//!
//! The [`Game`](crate::game::Game) ticks [`Time`] at the start of each frame.
//! Systems read it through their [`UpdateContext`](crate::ecs::UpdateContext).
//! Tests and tools drive it with [`Time::advance`] for deterministic steps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When the current frame started.
    frame_start: Instant,
    /// Duration of the previous frame.
    delta: Duration,
    /// Sum of all deltas so far.
    elapsed: Duration,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the last tick and advance by it.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let delta = now - self.frame_start;
        self.frame_start = now;
        self.advance(delta);
    }

    /// Advance by a fixed step without looking at the clock.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
