use std::{
    thread::sleep,
    time::{Duration, Instant},
};

/// Keeps each drawn frame on screen for at least `min_frametime`.
pub struct FpsLimiter {
    min_frametime: Duration,
    frame_timer: Option<Instant>,
}

impl FpsLimiter {
    pub fn new(min_frametime: Duration) -> Self {
        Self {
            min_frametime,
            frame_timer: None,
        }
    }

    /// Sleeps until the previous frame has been shown long enough, then
    /// starts timing the next one.
    pub fn delay(&mut self) {
        if let Some(timer) = self.frame_timer {
            let shown = timer.elapsed();
            if self.min_frametime > shown {
                sleep(self.min_frametime - shown);
            }
        }
        self.frame_timer = Some(Instant::now());
    }
}
