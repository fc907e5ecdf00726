use std::time::{Duration, Instant};

/// Counts presented frames and reports a rate once per window.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    window: Duration,
}

impl FpsCounter {
    pub fn starting_at(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            window: Duration::from_secs(1),
        }
    }

    /// Count one frame; returns the average rate when a full window has elapsed.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}
