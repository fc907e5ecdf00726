use crate::{Camera, Mat4};

/// Per-frame transform set. Nothing here outlives the frame it was built for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixSet {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// `projection * view * model`.
    pub mvp: Mat4,
}

impl MatrixSet {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
            mvp: projection * view * model,
        }
    }

    /// Identity model matrix with the camera's view and projection.
    pub fn from_camera(camera: &Camera) -> Self {
        Self::new(Mat4::IDENTITY, camera.view(), camera.proj())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Vec3, vec3};

    #[test]
    fn mvp_is_projection_view_model() {
        let model = Mat4::from_translation(vec3(1.0, -2.0, 0.5));
        let view = Mat4::look_at_rh(vec3(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(45f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        let set = MatrixSet::new(model, view, projection);
        assert_eq!(set.mvp, projection * view * model);
    }

    #[test]
    fn from_camera_uses_identity_model() {
        let cam = Camera::new_perspective(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            45f32.to_radians(),
            0.1,
            100.0,
            4.0 / 3.0,
        );
        let set = MatrixSet::from_camera(&cam);
        assert_eq!(set.model, Mat4::IDENTITY);
        assert!(set.mvp.abs_diff_eq(cam.proj_view(), 1e-6));
    }
}
