use alg;
use components::transform::Transform;

pub const DEFAULT_FOV: f64 = 90.0; // Horizontal, degrees
pub const DEFAULT_ASPECT: f64 = 16.0 / 9.0;
pub const DEFAULT_NEAR: f64 = 0.1;
pub const DEFAULT_FAR: f64 = 100.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Camera {
    pub transform: Transform,
    pub fov_horizontal: f64, // Full angle, radians
    pub aspect_ratio: f64,   // Width / height
    pub near_plane: f64,
    pub far_plane: f64,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            transform: Transform::default(),
            fov_horizontal: DEFAULT_FOV.to_radians(),
            aspect_ratio: DEFAULT_ASPECT,
            near_plane: DEFAULT_NEAR,
            far_plane: DEFAULT_FAR,
        }
    }
}

impl Camera {
    /// Inverse of the camera's local matrix. \
    /// Only rotation and translation are inverted; a scaled camera
    /// transform produces an incorrect view.
    pub fn view_matrix(&self) -> Result<alg::Mat, alg::AffineError> {
        if !self.transform.is_unscaled(1e-9) {
            warn!(
                "Camera transform has scale {}; view matrix will be distorted",
                self.transform.scale,
            );
        }

        self.transform.local_matrix().inverse_tr()
    }

    /// Symmetric frustum from the horizontal field of view
    pub fn projection_matrix(&self) -> alg::Mat {
        let half_width = self.near_plane * (0.5 * self.fov_horizontal).tan();
        let half_height = half_width / self.aspect_ratio;

        alg::Mat::perspective(
            -half_width,
             half_width,
            -half_height,
             half_height,
            self.near_plane,
            self.far_plane,
        )
    }

    /// Ignored for a zero height (minimized window)
    pub fn set_aspect_from_size(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }

        self.aspect_ratio = width as f64 / height as f64;
    }
}

#[cfg(test)]
mod tests {
    use std;
    use alg;
    use components::camera::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn defaults() {
        let camera = Camera::default();

        assert!((camera.fov_horizontal - std::f64::consts::FRAC_PI_2).abs() < EPSILON);
        assert!(camera.near_plane == DEFAULT_NEAR);
        assert!(camera.far_plane == DEFAULT_FAR);
    }

    #[test]
    fn projection_near_plane() {
        let camera = Camera {
            fov_horizontal: 90f64.to_radians(),
            aspect_ratio: 1.,
            near_plane: 1.,
            far_plane: 10.,
            ..Camera::default()
        };

        let clip = camera.projection_matrix() * alg::Vec4::new(0., 0., -1., 1.);

        assert!(clip.x.abs() <= 1. && clip.y.abs() <= 1.);
        assert!((clip.w - camera.near_plane).abs() < EPSILON);
        assert!((clip.z / clip.w + 1.).abs() < EPSILON);

        // Frustum edge at the near plane lands on the clip boundary
        let edge = camera.projection_matrix() * alg::Vec4::new(1., 1., -1., 1.);
        assert!((edge.x / edge.w - 1.).abs() < EPSILON);
        assert!((edge.y / edge.w - 1.).abs() < EPSILON);
    }

    #[test]
    fn projection_uses_aspect() {
        let camera = Camera {
            aspect_ratio: 2.,
            ..Camera::default()
        };

        let projection = camera.projection_matrix();

        // Vertical extent is half the horizontal one
        assert!((projection.at(1, 1) - 2. * projection.at(0, 0)).abs() < EPSILON);
    }

    #[test]
    fn view_inverts_transform() {
        let mut camera = Camera::default();
        camera.transform.position = alg::Vec3::new(0., 2., 6.);
        camera.transform.set_euler_rotation(alg::Vec3::new(0.3, -0.1, 0.));

        let view = camera.view_matrix().unwrap();

        // Camera position maps to the eye-space origin
        let eye = view.transform_point(camera.transform.position);
        assert!(eye.approx_eq(alg::Vec3::zero(), EPSILON));

        let product = view * camera.transform.local_matrix();
        assert!(product.approx_eq(&alg::Mat::identity(), EPSILON));
    }

    #[test]
    fn aspect_from_size() {
        let mut camera = Camera::default();

        camera.set_aspect_from_size(1280, 720);
        assert!((camera.aspect_ratio - 1280. / 720.).abs() < EPSILON);

        camera.set_aspect_from_size(800, 0);
        assert!((camera.aspect_ratio - 1280. / 720.).abs() < EPSILON);
    }
}
