use glam::{Mat4, Vec2};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 8.0;

/// Size of the drawable area in physical pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

/// Orthographic 2D camera driven by pan and pinch gestures.
///
/// `zoom` is world units per pixel (larger shows more of the world); gestures work in
/// "scale" space, the inverse of `zoom`, clamped to `min_scale..=max_scale`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    /// Scale at the end of the previous pinch, the baseline for the next one.
    pub last_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_limits(MIN_SCALE, MAX_SCALE)
    }
}

impl Camera {
    pub fn with_limits(min_scale: f32, max_scale: f32) -> Self {
        let min_scale = min_scale.max(f32::EPSILON);
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            last_scale: 1.0,
            min_scale,
            max_scale: max_scale.max(min_scale),
        }
    }

    /// Back to the origin at 1:1.
    pub fn reset(&mut self) {
        self.last_scale = 1.0;
        self.zoom = 1.0 / self.last_scale;
        self.position = Vec2::ZERO;
    }

    /// Moves the camera by a screen-space drag; screen y grows downwards.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.position.x -= delta_x * self.zoom;
        self.position.y += delta_y * self.zoom;
    }

    pub fn zoom_gesture(&mut self, initial_distance: f32, distance: f32) {
        if initial_distance <= 0.0 || !initial_distance.is_finite() || !distance.is_finite() {
            return;
        }
        let scale = (self.last_scale * distance / initial_distance)
            .clamp(self.min_scale, self.max_scale);
        self.zoom = 1.0 / scale;
    }

    pub fn pinch_stop(&mut self) {
        self.last_scale = 1.0 / self.zoom;
    }

    /// World-space extent visible in `viewport`.
    pub fn visible_size(&self, viewport: Viewport) -> Vec2 {
        Vec2::new(viewport.width, viewport.height) * self.zoom
    }

    pub fn clip_from_world(&self, viewport: Viewport) -> Mat4 {
        let half = self.visible_size(viewport) * 0.5;
        Mat4::orthographic_rh(
            self.position.x - half.x,
            self.position.x + half.x,
            self.position.y - half.y,
            self.position.y + half.y,
            -1.0,
            1.0,
        )
    }

    /// Maps a pixel position (origin top-left, y down) to world coordinates.
    pub fn screen_to_world(&self, viewport: Viewport, screen: Vec2) -> Vec2 {
        let centered = Vec2::new(
            screen.x - viewport.width * 0.5,
            viewport.height * 0.5 - screen.y,
        );
        self.position + centered * self.zoom
    }
}
