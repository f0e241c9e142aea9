//! Orbiting fly camera and the perspective/orthographic projection toggle.
//!
//! The camera is a plain value owned by the renderer and mutated only through
//! the explicit input-event methods below; the window layer forwards SDL2
//! events into it and nothing else touches its state.

use glam::{Mat4, Vec3};

const MOVE_SPEED: f32 = 2.5;
const LOOK_SENSITIVITY: f32 = 0.1;
const ZOOM_MIN: f32 = 1.0;
const ZOOM_MAX: f32 = 45.0;
const PITCH_LIMIT: f32 = 89.0;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;
const ORTHO_EXTENT: f32 = 15.0;

/// The six discrete movement commands driven by the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Which projection the scene is rendered with. Selected by one-shot
/// key-release events; the last event wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

impl Projection {
    /// Builds the projection matrix. `zoom_deg` is the camera's current
    /// field of view in degrees and only affects the perspective branch.
    pub fn matrix(self, zoom_deg: f32, aspect: f32) -> Mat4 {
        match self {
            Projection::Perspective => {
                Mat4::perspective_rh_gl(zoom_deg.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
            }
            Projection::Orthographic => Mat4::orthographic_rh_gl(
                -ORTHO_EXTENT,
                ORTHO_EXTENT,
                -ORTHO_EXTENT,
                ORTHO_EXTENT,
                NEAR_PLANE,
                FAR_PLANE,
            ),
        }
    }
}

/// Free-look camera state: a position plus yaw/pitch angles in degrees and a
/// zoom (field of view) in degrees.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    last_cursor: Option<(f32, f32)>,
}

impl Camera {
    /// Creates a camera at `position` looking down negative Z.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            last_cursor: None,
        }
    }

    /// The unit front vector derived from yaw and pitch.
    pub fn front(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// The view matrix for the current camera state, recomputed every frame.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    /// Applies one movement command, scaling displacement by the elapsed time.
    pub fn process_movement(&mut self, movement: CameraMovement, delta_time: f32) {
        let velocity = MOVE_SPEED * delta_time;
        let front = self.front();
        let right = front.cross(Vec3::Y).normalize();
        match movement {
            CameraMovement::Forward => self.position += front * velocity,
            CameraMovement::Backward => self.position -= front * velocity,
            CameraMovement::Left => self.position -= right * velocity,
            CameraMovement::Right => self.position += right * velocity,
            CameraMovement::Up => self.position += Vec3::Y * velocity,
            CameraMovement::Down => self.position -= Vec3::Y * velocity,
        }
    }

    /// Mouse-look from an absolute cursor position. The first sample after
    /// activation only seeds the reference position so the view does not jump.
    pub fn on_cursor_move(&mut self, x: f32, y: f32) {
        let Some((last_x, last_y)) = self.last_cursor else {
            self.last_cursor = Some((x, y));
            return;
        };
        // y offset reversed: screen coordinates grow downwards
        let dx = x - last_x;
        let dy = last_y - y;
        self.last_cursor = Some((x, y));

        self.yaw += dx * LOOK_SENSITIVITY;
        self.pitch = (self.pitch + dy * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scroll-wheel zoom, clamped to a bounded field-of-view range.
    pub fn on_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_MIN, ZOOM_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_front_is_negative_z() {
        let camera = Camera::new(Vec3::ZERO);
        let front = camera.front();
        assert!((front - Vec3::NEG_Z).length() < 1e-6, "front = {front}");
    }

    #[test]
    fn test_first_cursor_sample_does_not_rotate() {
        let mut camera = Camera::new(Vec3::ZERO);
        let (yaw, pitch) = (camera.yaw, camera.pitch);
        camera.on_cursor_move(600.0, 400.0);
        assert_eq!((camera.yaw, camera.pitch), (yaw, pitch));

        // the second sample rotates relative to the seeded reference
        camera.on_cursor_move(610.0, 400.0);
        assert!((camera.yaw - (yaw + 1.0)).abs() < 1e-6);
        assert_eq!(camera.pitch, pitch);
    }

    #[test]
    fn test_pitch_clamps_at_limit() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.on_cursor_move(0.0, 0.0);
        camera.on_cursor_move(0.0, -10000.0);
        assert_eq!(camera.pitch, 89.0);
        camera.on_cursor_move(0.0, 10000.0);
        camera.on_cursor_move(0.0, 20000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_zoom_clamps_to_bounds() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.on_scroll(100.0);
        assert_eq!(camera.zoom, 1.0);
        camera.on_scroll(-100.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn test_movement_scales_with_delta_time() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_movement(CameraMovement::Up, 0.5);
        assert!((camera.position.y - 1.25).abs() < 1e-6);

        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_movement(CameraMovement::Forward, 1.0);
        assert!((camera.position - Vec3::NEG_Z * 2.5).length() < 1e-5);
    }

    #[test]
    fn test_view_matrix_matches_look_at() {
        let camera = Camera::new(Vec3::new(-3.5, 5.0, 15.0));
        let expected = Mat4::look_at_rh(
            camera.position,
            camera.position + camera.front(),
            Vec3::Y,
        );
        assert_eq!(camera.view_matrix(), expected);
    }

    #[test]
    fn test_projection_toggle_matrices() {
        let ortho = Projection::Orthographic.matrix(45.0, 1.0);
        assert_eq!(
            ortho,
            Mat4::orthographic_rh_gl(-15.0, 15.0, -15.0, 15.0, 0.1, 100.0)
        );

        let perspective = Projection::Perspective.matrix(30.0, 4.0 / 3.0);
        assert_eq!(
            perspective,
            Mat4::perspective_rh_gl(30.0f32.to_radians(), 4.0 / 3.0, 0.1, 100.0)
        );
    }
}
