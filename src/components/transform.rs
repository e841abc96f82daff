use alg;

/// Local pose of a scene node or camera, relative to its parent. \
/// Rotation is stored twice: as a quaternion and as cached Euler angles
/// (x = yaw, y = pitch, z = roll, radians, ZYX order). Both setters write
/// both representations, so they never disagree.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transform {
    pub position: alg::Vec3,
    pub scale:    alg::Vec3,
    rotation: alg::Quat,
    euler:    alg::Vec3,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            position: alg::Vec3::zero(),
            scale:    alg::Vec3::one(),
            rotation: alg::Quat::identity(),
            euler:    alg::Vec3::zero(),
        }
    }
}

impl Transform {
    pub fn new(
        position: alg::Vec3,
        rotation: alg::Quat,
        scale:    alg::Vec3,
    ) -> Transform {
        let mut transform = Transform {
            position,
            scale,
            ..Transform::default()
        };

        transform.set_rotation(rotation);
        transform
    }

    pub fn from_position(position: alg::Vec3) -> Transform {
        Transform {
            position,
            ..Transform::default()
        }
    }

    /// Decompose an affine matrix into position, rotation and scale. \
    /// A reflection ends up as a negative X scale.
    pub fn from_matrix(matrix: &alg::Mat) -> Result<Transform, alg::AffineError> {
        if !matrix.is_affine() {
            return Err(alg::AffineError::NotAffine);
        }

        let rotation = matrix.get_rotation_quat()?;

        Ok(Transform::new(
            matrix.get_translation(),
            rotation,
            matrix.get_scale(),
        ))
    }

    pub fn local_matrix(&self) -> alg::Mat {
        alg::Mat::from_trs_quat(self.position, self.rotation, self.scale)
    }

    #[inline]
    pub fn rotation(&self) -> alg::Quat {
        self.rotation
    }

    #[inline]
    pub fn euler_rotation(&self) -> alg::Vec3 {
        self.euler
    }

    /// Angles are kept exactly as given
    pub fn set_euler_rotation(&mut self, euler: alg::Vec3) {
        self.euler = euler;
        self.rotation = alg::Quat::from_euler_zyx(euler.x, euler.y, euler.z);
    }

    /// Euler cache is recomputed from the quaternion
    pub fn set_rotation(&mut self, rotation: alg::Quat) {
        self.rotation = rotation;
        self.euler = rotation.to_euler_zyx();
    }

    /// True when scale is (1, 1, 1) within `epsilon`
    pub fn is_unscaled(&self, epsilon: f64) -> bool {
        self.scale.approx_eq(alg::Vec3::one(), epsilon)
    }
}

#[cfg(test)]
mod tests {
    use alg;
    use components::transform::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn identity_local_matrix() {
        let transform = Transform::default();
        assert!(transform.local_matrix() == alg::Mat::identity());
    }

    #[test]
    fn local_matrix_is_trs() {
        let mut transform = Transform::from_position(alg::Vec3::new(1., 2., 3.));
        transform.scale = alg::Vec3::new(2., 1., 0.5);
        transform.set_euler_rotation(alg::Vec3::new(0.3, 0.2, 0.1));

        let expected = alg::Mat::translation(1., 2., 3.)
            * alg::Mat::rotation_quat(alg::Quat::from_euler_zyx(0.3, 0.2, 0.1))
            * alg::Mat::scale(2., 1., 0.5);

        assert!(transform.local_matrix().approx_eq(&expected, EPSILON));
    }

    #[test]
    fn euler_setter_updates_quaternion() {
        let mut transform = Transform::default();
        let euler = alg::Vec3::new(1.2, -0.3, 0.7);

        transform.set_euler_rotation(euler);

        assert!(transform.euler_rotation() == euler);
        assert!(transform.rotation().same_rotation(
            alg::Quat::from_euler_zyx(1.2, -0.3, 0.7),
            EPSILON,
        ));
    }

    #[test]
    fn quaternion_setter_updates_euler() {
        let mut transform = Transform::default();
        transform.set_euler_rotation(alg::Vec3::new(0.5, 0., 0.));

        let rotation = alg::Quat::angle_axis(0.4, alg::Vec3::right());
        transform.set_rotation(rotation);

        // Cache follows the quaternion instead of going stale
        assert!(transform.euler_rotation()
            .approx_eq(alg::Vec3::new(0., 0., 0.4), EPSILON));
    }

    #[test]
    fn decompose_matrix() {
        let original = Transform::new(
            alg::Vec3::new(-3., 4., 0.5),
            alg::Quat::from_euler_zyx(0.9, 0.1, -1.4),
            alg::Vec3::new(1.5, 2., 0.25),
        );

        let recovered = Transform::from_matrix(&original.local_matrix()).unwrap();

        assert!(recovered.position.approx_eq(original.position, EPSILON));
        assert!(recovered.scale.approx_eq(original.scale, EPSILON));
        assert!(recovered.rotation().same_rotation(original.rotation(), EPSILON));
        assert!(recovered.local_matrix()
            .approx_eq(&original.local_matrix(), EPSILON));
    }

    #[test]
    fn decompose_rejects_bad_input() {
        let mut projective = alg::Mat::identity();
        projective[(3, 2)] = -1.;

        match Transform::from_matrix(&projective) {
            Err(alg::AffineError::NotAffine) => (),
            other => panic!("expected NotAffine, got {:?}", other),
        }

        let flat = alg::Mat::scale(1., 1., 0.);

        match Transform::from_matrix(&flat) {
            Err(alg::AffineError::DegenerateScale(_)) => (),
            other => panic!("expected DegenerateScale, got {:?}", other),
        }
    }
}
