use std::time::{Duration, Instant};

/// Caps a loop at a target frame duration.
///
/// Call [`begin`](Self::begin) at the top of the frame and [`wait`](Self::wait)
/// at the end; `wait` sleeps for whatever is left of the target duration.
/// A frame that already overran returns immediately.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    target: Duration,
    frame_start: Instant,
}

impl FrameLimiter {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            frame_start: Instant::now(),
        }
    }

    /// Limiter for a frame rate in frames per second.
    ///
    /// Non-positive or non-finite rates disable limiting.
    pub fn from_fps(fps: f32) -> Self {
        let target = if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f32(1.0 / fps)
        } else {
            Duration::ZERO
        };
        Self::new(target)
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Marks the start of a frame.
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Time left in the current frame budget.
    pub fn remaining(&self) -> Duration {
        self.target.saturating_sub(self.frame_start.elapsed())
    }

    /// Sleeps until the target frame duration has passed since `begin`.
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}
