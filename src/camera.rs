use glam::Vec2;

/// Stage camera. `position` is the world point shown at the viewport center; screen
/// and world y both grow downward.
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    zoom_limits: (f32, f32),
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera2D {
    pub fn new() -> Self {
        Self { position: Vec2::ZERO, zoom: 1.0, zoom_limits: (0.05, 10.0) }
    }

    /// Limits must be finite with `0 < min < max`; anything else is rejected and the
    /// current limits stay in place.
    pub fn set_zoom_limits(&mut self, min: f32, max: f32) -> bool {
        if !valid_zoom_limits(min, max) {
            return false;
        }
        self.zoom_limits = (min, max);
        self.zoom = self.zoom.clamp(min, max);
        true
    }

    pub fn zoom_limits(&self) -> (f32, f32) {
        self.zoom_limits
    }

    /// Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.zoom_limits.0, self.zoom_limits.1);
        }
    }

    pub fn set_position(&mut self, position: Vec2) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn screen_to_world(&self, screen: Vec2, viewport: Vec2) -> Vec2 {
        self.position + (screen - viewport / 2.0) / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2, viewport: Vec2) -> Vec2 {
        (world - self.position) * self.zoom + viewport / 2.0
    }
}

pub fn valid_zoom_limits(min: f32, max: f32) -> bool {
    min.is_finite() && max.is_finite() && min > 0.0 && max > min
}
