use glam::Vec3;

/// Where the viewer camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CameraPlacement {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPlacement {
    /// Diagonal view from the front-right, slightly above the target.
    pub fn diagonal(distance: f32, look_at: Vec3) -> Self {
        Self {
            position: Vec3::new(distance * 0.8, distance * 0.4, distance * 0.8),
            look_at,
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }
}

/// Distance at which a box of `max_dim` fills a vertical field of view of
/// `fov_deg`, widened by `margin`. Degenerate input yields `fallback`.
pub fn fit_distance(max_dim: f32, fov_deg: f32, margin: f32, fallback: f32) -> f32 {
    let half_fov = fov_deg.to_radians() / 2.0;
    let distance = (max_dim / half_fov.sin()).abs() * margin;
    if max_dim > 0.0 && distance.is_finite() {
        distance
    } else {
        fallback
    }
}

/// Eases the camera from a pulled-back start onto its framed placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFlyIn {
    from: Vec3,
    to: CameraPlacement,
    duration: f32,
    elapsed: f32,
}

impl CameraFlyIn {
    /// Start `pull_back` times farther from the target along the final view
    /// direction.
    pub fn new(to: CameraPlacement, pull_back: f32, duration: f32) -> Self {
        let from = to.look_at + (to.position - to.look_at) * pull_back.max(1.0);
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Placement at the current progress.
    pub fn current(&self) -> CameraPlacement {
        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t >= 1.0 {
            return self.to;
        }
        CameraPlacement {
            position: self.from.lerp(self.to.position, ease_out_cubic(t)),
            look_at: self.to.look_at,
        }
    }

    pub fn advance(&mut self, dt: f32) -> CameraPlacement {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.current()
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
