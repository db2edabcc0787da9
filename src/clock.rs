use std::time::Instant;

/// Seconds between FPS reports
pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Longest simulation step handed to the viewer after a stall
pub const MAX_STEP: f32 = 0.1;

/// Wall time of one frame and the step the scene advances by
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameDelta {
    pub elapsed: f32,
    pub step: f32,
}

/// Frame timer for the render loop
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    max_step: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::with_max_step(MAX_STEP)
    }

    pub fn with_max_step(max_step: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            max_step,
        }
    }

    pub fn tick(&mut self) -> FrameDelta {
        self.advance(Instant::now())
    }

    /// Moves the clock to `now`; a window drag or a slow model upload
    /// shows up in `elapsed` but not in `step`
    pub fn advance(&mut self, now: Instant) -> FrameDelta {
        let elapsed = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        FrameDelta {
            elapsed,
            step: elapsed.min(self.max_step),
        }
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame rate over `FPS_UPDATE_INTERVAL` windows
#[derive(Debug, Default, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    /// Counts one frame; returns the new average when a window completes
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;

        if self.elapsed >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
