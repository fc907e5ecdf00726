//! Core types: math re-exports, Camera, fly-camera controller, frame timing.

pub use glam::{Mat4, Vec2, Vec3, vec2, vec3};

pub mod camera;
pub mod controller;
pub mod matrix;
pub mod time;

pub use camera::Camera;
pub use controller::{CameraController, CameraInput};
pub use matrix::MatrixSet;
pub use time::{FrameClock, FrameTime};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_pv_is_finite() {
        let cam = camera::Camera::new_perspective(
            vec3(0.0, 0.0, 4.0),
            vec3(0.0, 0.0, 0.0),
            Vec3::Y,
            60f32.to_radians(),
            0.1,
            100.0,
            4.0 / 3.0,
        );
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn controller_camera_looks_along_direction() {
        let ctl = CameraController::default();
        let cam = ctl.camera();
        let dir = (cam.target - cam.eye).normalize();
        assert!((dir - ctl.direction()).length() < 1e-5);
    }
}
