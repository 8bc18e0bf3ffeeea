use glam::Quat;
use std::time::{Duration, Instant};

/// Frame delta used before a second frame has been seen.
const FIRST_FRAME: Duration = Duration::from_millis(16);

pub struct FrameClock {
    last_frame_time: Option<Instant>,
    last_fps_time: Option<Instant>,
    frame_count: u32,
    pub frame_dt: f32,
    fps: Option<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: None,
            frame_count: 0,
            frame_dt: FIRST_FRAME.as_secs_f32(),
            fps: None,
        }
    }

    /// Frames per second over the last reporting window.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    /// Record a frame at `now` and return its delta in seconds.
    pub fn update(&mut self, now: Instant) -> f32 {
        let dt_duration = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => FIRST_FRAME,
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let window_start = *self.last_fps_time.get_or_insert(now);
        let elapsed = now.saturating_duration_since(window_start);
        if elapsed.as_secs_f32() >= 0.5 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            log::trace!("{:.1} fps (cadence {:.2} ms)", fps, self.frame_dt * 1000.0);
            self.fps = Some(fps);
            self.frame_count = 0;
            self.last_fps_time = Some(now);
        }
        self.frame_dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Turntable spin of the model root about +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRotate {
    pub degrees_per_sec: f32,
    angle: f32,
}

impl AutoRotate {
    pub fn new(degrees_per_sec: f32) -> Self {
        Self {
            degrees_per_sec,
            angle: 0.0,
        }
    }

    /// Accumulated angle in radians, wrapped to one turn.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advance by `dt` seconds and return the spin to compose onto the
    /// root's base rotation.
    pub fn advance(&mut self, dt: f32) -> Quat {
        if dt.is_finite() && dt > 0.0 {
            self.angle = (self.angle + self.degrees_per_sec.to_radians() * dt)
                .rem_euclid(std::f32::consts::TAU);
        }
        Quat::from_rotation_y(self.angle)
    }
}
