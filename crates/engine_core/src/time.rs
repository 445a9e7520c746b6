//! Simulated time for the frame-stepped game loop.

use std::time::Duration;

/// Tracks simulated time. Advanced explicitly by the host once per step,
/// so replays with the same deltas see the same clock.
#[derive(Debug, Clone)]
pub struct Time {
    /// Duration of the last step.
    delta: Duration,
    /// Total simulated time since start.
    elapsed: Duration,
    /// Step count since start.
    frame_count: u64,
    /// Longest step the simulation will integrate in one go.
    max_step: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a clock at zero with a 100 ms step ceiling.
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_step: Duration::from_millis(100),
        }
    }

    /// Create a clock with a custom step ceiling in seconds.
    pub fn with_max_step(seconds: f32) -> Self {
        Self {
            max_step: Duration::from_secs_f32(seconds.max(0.0)),
            ..Self::new()
        }
    }

    /// Advance by `dt` seconds and return the delta actually applied.
    ///
    /// Negative or non-finite deltas advance by zero; deltas above the
    /// step ceiling are clamped to it.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let max = self.max_step.as_secs_f32();
        if dt > max {
            log::debug!("Step of {:.3}s clamped to {:.3}s", dt, max);
            self.delta = self.max_step;
        } else {
            self.delta = Duration::from_secs_f32(dt);
        }
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current step count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the step ceiling in seconds.
    pub fn max_step_seconds(&self) -> f32 {
        self.max_step.as_secs_f32()
    }
}
