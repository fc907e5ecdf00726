//! Fly camera driven by keyboard and relative mouse motion.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::{Camera, Mat4, Vec2, Vec3, vec3};

/// Input gathered over one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Relative cursor motion in pixels since the previous frame.
    pub mouse_delta: Vec2,
    /// Wheel motion in lines since the previous frame (positive = away from user).
    pub scroll: f32,
}

impl CameraInput {
    /// Drops per-frame deltas, keeps held keys.
    pub fn clear_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

/// Tunables for [`CameraController`].
#[derive(Clone, Copy, Debug)]
pub struct ControllerSettings {
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_speed: f32,
    pub initial_fov_deg: f32,
    /// Degrees of fov removed per scrolled line.
    pub zoom_step_deg: f32,
    pub min_fov_deg: f32,
    pub max_fov_deg: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            speed: 3.0,
            mouse_speed: 0.005,
            initial_fov_deg: 45.0,
            zoom_step_deg: 5.0,
            min_fov_deg: 1.0,
            max_fov_deg: 90.0,
            aspect: 4.0 / 3.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

/// Accumulates position and orientation across frames.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub position: Vec3,
    /// Yaw in radians. `PI` looks down -Z.
    pub horizontal_angle: f32,
    /// Pitch in radians.
    pub vertical_angle: f32,
    scroll_total: f32,
    settings: ControllerSettings,
}

impl CameraController {
    pub fn new(position: Vec3, settings: ControllerSettings) -> Self {
        Self {
            position,
            horizontal_angle: PI,
            vertical_angle: 0.0,
            scroll_total: 0.0,
            settings,
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Apply one frame of input. `dt` is in seconds.
    pub fn update(&mut self, input: &CameraInput, dt: f32) {
        let s = self.settings;

        self.horizontal_angle -= s.mouse_speed * input.mouse_delta.x;
        self.vertical_angle -= s.mouse_speed * input.mouse_delta.y;
        self.scroll_total += input.scroll;

        let direction = self.direction();
        let right = self.right();
        let step = dt * s.speed;

        if input.forward {
            self.position += direction * step;
        }
        if input.backward {
            self.position -= direction * step;
        }
        if input.right {
            self.position += right * step;
        }
        if input.left {
            self.position -= right * step;
        }
    }

    /// Unit look direction from the current angles.
    pub fn direction(&self) -> Vec3 {
        let (h, v) = (self.horizontal_angle, self.vertical_angle);
        vec3(v.cos() * h.sin(), v.sin(), v.cos() * h.cos())
    }

    /// Horizontal right vector; never has a Y component.
    pub fn right(&self) -> Vec3 {
        let h = self.horizontal_angle - FRAC_PI_2;
        vec3(h.sin(), 0.0, h.cos())
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn fov_deg(&self) -> f32 {
        let s = &self.settings;
        (s.initial_fov_deg - s.zoom_step_deg * self.scroll_total)
            .clamp(s.min_fov_deg, s.max_fov_deg)
    }

    pub fn camera(&self) -> Camera {
        let s = &self.settings;
        Camera::new_perspective(
            self.position,
            self.position + self.direction(),
            self.up(),
            self.fov_deg().to_radians(),
            s.z_near,
            s.z_far,
            s.aspect,
        )
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.camera().view()
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.camera().proj()
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(vec3(0.0, 0.0, 5.0), ControllerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn idle_frames_change_nothing() {
        let mut ctl = CameraController::default();
        let (p, h, v) = (ctl.position, ctl.horizontal_angle, ctl.vertical_angle);
        ctl.update(&CameraInput::default(), 0.016);
        ctl.update(&CameraInput::default(), 0.5);
        assert_eq!(ctl.position, p);
        assert_eq!(ctl.horizontal_angle, h);
        assert_eq!(ctl.vertical_angle, v);
    }

    #[test]
    fn forward_moves_along_direction() {
        let mut ctl = CameraController::default();
        let start = ctl.position;
        let dir = ctl.direction();
        let input = CameraInput {
            forward: true,
            ..Default::default()
        };
        ctl.update(&input, 0.5);
        let expected = start + dir * 0.5 * ctl.settings().speed;
        assert!(approx(ctl.position, expected));
        // default yaw looks down -Z
        assert!(approx(dir, vec3(0.0, 0.0, -1.0)));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut ctl = CameraController::default();
        let start = ctl.position;
        let input = CameraInput {
            forward: true,
            backward: true,
            left: true,
            right: true,
            ..Default::default()
        };
        ctl.update(&input, 1.0);
        assert!(approx(ctl.position, start));
    }

    #[test]
    fn strafe_is_horizontal() {
        let mut ctl = CameraController::default();
        ctl.vertical_angle = 0.7;
        let start = ctl.position;
        let input = CameraInput {
            right: true,
            ..Default::default()
        };
        ctl.update(&input, 1.0);
        assert!((ctl.position.y - start.y).abs() < 1e-6);
        assert!(approx(ctl.position - start, ctl.right() * ctl.settings().speed));
    }

    #[test]
    fn mouse_motion_turns_camera() {
        let mut ctl = CameraController::default();
        let h = ctl.horizontal_angle;
        let input = CameraInput {
            mouse_delta: vec2(10.0, -4.0),
            ..Default::default()
        };
        ctl.update(&input, 0.016);
        let ms = ctl.settings().mouse_speed;
        assert!((ctl.horizontal_angle - (h - 10.0 * ms)).abs() < 1e-6);
        assert!((ctl.vertical_angle - 4.0 * ms).abs() < 1e-6);
    }

    #[test]
    fn scroll_narrows_fov_and_clamps() {
        let mut ctl = CameraController::default();
        assert_eq!(ctl.fov_deg(), 45.0);
        let zoom_in = CameraInput {
            scroll: 2.0,
            ..Default::default()
        };
        ctl.update(&zoom_in, 0.016);
        assert!((ctl.fov_deg() - 35.0).abs() < 1e-5);

        let far = CameraInput {
            scroll: 100.0,
            ..Default::default()
        };
        ctl.update(&far, 0.016);
        assert_eq!(ctl.fov_deg(), ctl.settings().min_fov_deg);
    }

    #[test]
    fn up_is_orthogonal_to_basis() {
        let mut ctl = CameraController::default();
        ctl.horizontal_angle = 0.3;
        ctl.vertical_angle = -0.4;
        let up = ctl.up();
        assert!(up.dot(ctl.direction()).abs() < 1e-5);
        assert!(up.dot(ctl.right()).abs() < 1e-5);
        assert!(up.y > 0.0);
    }

    #[test]
    fn clear_deltas_keeps_held_keys() {
        let mut input = CameraInput {
            forward: true,
            mouse_delta: vec2(3.0, 1.0),
            scroll: 1.0,
            ..Default::default()
        };
        input.clear_deltas();
        assert!(input.forward);
        assert_eq!(input.mouse_delta, Vec2::ZERO);
        assert_eq!(input.scroll, 0.0);
    }
}
