use std;

/// Smallest scale magnitude accepted when decomposing a matrix
pub const SCALE_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AffineError {
    /// Bottom row is not exactly [0, 0, 0, 1]
    NotAffine,
    /// At least one axis has collapsed to (near) zero scale
    DegenerateScale(Vec3),
}

impl std::fmt::Display for AffineError {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            AffineError::NotAffine => write!(
                out,
                "matrix is not affine (bottom row must be [0, 0, 0, 1])",
            ),
            AffineError::DegenerateScale(scale) => write!(
                out,
                "degenerate scale {}; axis cannot be inverted",
                scale,
            ),
        }
    }
}

impl std::error::Error for AffineError {}

fn nondegenerate(scale: Vec3) -> Result<Vec3, AffineError> {
    let degenerate = |s: f64| !s.is_finite() || s.abs() < SCALE_EPSILON;

    if degenerate(scale.x) || degenerate(scale.y) || degenerate(scale.z) {
        return Err(AffineError::DegenerateScale(scale));
    }

    Ok(scale)
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3 { x, y, z }
    }

    #[inline]
    pub fn right() -> Vec3 {
        Vec3::new(1., 0., 0.)
    }

    #[inline]
    pub fn up() -> Vec3 {
        Vec3::new(0., 1., 0.)
    }

    #[inline]
    pub fn fwd() -> Vec3 {
        Vec3::new(0., 0., 1.)
    }

    #[inline]
    pub fn zero() -> Vec3 {
        Vec3::new(0., 0., 0.)
    }

    #[inline]
    pub fn one() -> Vec3 {
        Vec3::new(1., 1., 1.)
    }

    /// Returns the zero vector unchanged
    pub fn norm(self) -> Vec3 {
        let mag = self.mag();

        if mag == 0. {
            return self;
        }

        self / mag
    }

    pub fn mag_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn mag(self) -> f64 {
        self.mag_squared().sqrt()
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Component-wise reciprocal
    pub fn recip(self) -> Vec3 {
        Vec3::new(1. / self.x, 1. / self.y, 1. / self.z)
    }

    pub fn approx_eq(self, other: Vec3, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
        )
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
        )
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, scalar: f64) -> Vec3 {
        Vec3::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
        )
    }
}

impl std::ops::Div<f64> for Vec3 {
    type Output = Vec3;

    fn div(self, scalar: f64) -> Vec3 {
        Vec3::new(
            self.x / scalar,
            self.y / scalar,
            self.z / scalar,
        )
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            out,
            "( {}, {}, {} )",
            self.x, self.y, self.z,
        )
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Vec4 {
        Vec4 { x, y, z, w }
    }

    /// Homogeneous position (w = 1)
    pub fn point(vec: Vec3) -> Vec4 {
        Vec4::new(vec.x, vec.y, vec.z, 1.)
    }

    /// Homogeneous direction (w = 0)
    pub fn direction(vec: Vec3) -> Vec4 {
        Vec4::new(vec.x, vec.y, vec.z, 0.)
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl std::fmt::Display for Vec4 {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            out,
            "( {}, {}, {}, {} )",
            self.x, self.y, self.z, self.w,
        )
    }
}

/// General 3x3 matrix, row-major. \
/// As the upper-left block of an affine matrix this is the combined
/// rotation and scale ("linear part"); see `Rot3` for pure rotations.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Mat3 {
    m: [[f64; 3]; 3],
}

impl Mat3 {
    pub fn new(
        x0: f64, x1: f64, x2: f64,
        y0: f64, y1: f64, y2: f64,
        z0: f64, z1: f64, z2: f64,
    ) -> Mat3 {
        Mat3 {
            m: [
                [x0, x1, x2],
                [y0, y1, y2],
                [z0, z1, z2],
            ],
        }
    }

    #[inline]
    pub fn zero() -> Mat3 {
        Mat3::default()
    }

    #[inline]
    pub fn identity() -> Mat3 {
        Mat3::diagonal(Vec3::one())
    }

    pub fn diagonal(vec: Vec3) -> Mat3 {
        Mat3::new(
            vec.x,    0.,    0.,
               0., vec.y,    0.,
               0.,    0., vec.z,
        )
    }

    pub fn from_columns(c0: Vec3, c1: Vec3, c2: Vec3) -> Mat3 {
        Mat3::new(
            c0.x, c1.x, c2.x,
            c0.y, c1.y, c2.y,
            c0.z, c1.z, c2.z,
        )
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row][col]
    }

    pub fn column(&self, col: usize) -> Vec3 {
        Vec3::new(self.m[0][col], self.m[1][col], self.m[2][col])
    }

    /// Multiplies each column by the matching component of `scale`,
    /// equivalent to `self * Mat3::diagonal(scale)`
    pub fn scale_columns(self, scale: Vec3) -> Mat3 {
        Mat3::from_columns(
            self.column(0) * scale.x,
            self.column(1) * scale.y,
            self.column(2) * scale.z,
        )
    }

    pub fn transpose(self) -> Mat3 {
        Mat3::from_columns(
            Vec3::new(self.m[0][0], self.m[0][1], self.m[0][2]),
            Vec3::new(self.m[1][0], self.m[1][1], self.m[1][2]),
            Vec3::new(self.m[2][0], self.m[2][1], self.m[2][2]),
        )
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;

        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    pub fn approx_eq(&self, other: &Mat3, epsilon: f64) -> bool {
        for i in 0..3 {
            for j in 0..3 {
                if (self.m[i][j] - other.m[i][j]).abs() > epsilon {
                    return false;
                }
            }
        }

        true
    }
}

impl std::ops::Index<(usize, usize)> for Mat3 {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.m[row][col]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Mat3 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.m[row][col]
    }
}

impl std::ops::Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, other: Mat3) -> Mat3 {
        let mut result = Mat3::zero();

        for i in 0..3 {
            for j in 0..3 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }

        result
    }
}

impl std::ops::Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, vec: Vec3) -> Vec3 {
        let m = &self.m;

        Vec3::new(
            m[0][0] * vec.x + m[0][1] * vec.y + m[0][2] * vec.z,
            m[1][0] * vec.x + m[1][1] * vec.y + m[1][2] * vec.z,
            m[2][0] * vec.x + m[2][1] * vec.y + m[2][2] * vec.z,
        )
    }
}

impl std::fmt::Display for Mat3 {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        let m = &self.m;

        write!(
            out,
            "[ {}, {}, {} ]\n[ {}, {}, {} ]\n[ {}, {}, {} ]",
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        )
    }
}

/// Pure rotation matrix. \
/// Invariant (documented, not checked): orthonormal with determinant +1,
/// so the transpose is the inverse.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rot3 {
    m: Mat3,
}

impl Default for Rot3 {
    fn default() -> Rot3 {
        Rot3::identity()
    }
}

impl Rot3 {
    #[inline]
    pub fn identity() -> Rot3 {
        Rot3 { m: Mat3::identity() }
    }

    /// Caller guarantees that `m` is a proper rotation
    pub fn from_mat3_unchecked(m: Mat3) -> Rot3 {
        Rot3 { m }
    }

    pub fn about_x(rad: f64) -> Rot3 {
        let (sin, cos) = rad.sin_cos();

        Rot3::from_mat3_unchecked(Mat3::new(
            1.,  0.,   0.,
            0., cos, -sin,
            0., sin,  cos,
        ))
    }

    pub fn about_y(rad: f64) -> Rot3 {
        let (sin, cos) = rad.sin_cos();

        Rot3::from_mat3_unchecked(Mat3::new(
             cos, 0., sin,
              0., 1.,  0.,
            -sin, 0., cos,
        ))
    }

    pub fn about_z(rad: f64) -> Rot3 {
        let (sin, cos) = rad.sin_cos();

        Rot3::from_mat3_unchecked(Mat3::new(
            cos, -sin, 0.,
            sin,  cos, 0.,
             0.,   0., 1.,
        ))
    }

    #[inline]
    pub fn matrix(&self) -> Mat3 {
        self.m
    }

    /// Transpose
    pub fn inverse(self) -> Rot3 {
        Rot3 { m: self.m.transpose() }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rot3(self)
    }
}

impl std::ops::Mul for Rot3 {
    type Output = Rot3;

    fn mul(self, other: Rot3) -> Rot3 {
        Rot3 { m: self.m * other.m }
    }
}

impl std::ops::Mul<Vec3> for Rot3 {
    type Output = Vec3;

    fn mul(self, vec: Vec3) -> Vec3 {
        self.m * vec
    }
}

impl std::fmt::Display for Rot3 {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.m, out)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quat {
    fn default() -> Quat {
        Quat::identity()
    }
}

impl Quat {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Quat {
        Quat { x, y, z, w }
    }

    #[inline]
    pub fn identity() -> Quat {
        Quat::new(0., 0., 0., 1.)
    }

    pub fn angle_axis(rad: f64, axis: Vec3) -> Quat {
        let axis = axis.norm();
        let (sin, cos) = (0.5 * rad).sin_cos();

        Quat::new(
            axis.x * sin,
            axis.y * sin,
            axis.z * sin,
            cos,
        )
    }

    /// Intrinsic rotation about Z (yaw), then Y (pitch), then X (roll),
    /// i.e. `Rz(yaw) * Ry(pitch) * Rx(roll)`. Angles in radians.
    pub fn from_euler_zyx(yaw: f64, pitch: f64, roll: f64) -> Quat {
        let (sy, cy) = (0.5 * yaw).sin_cos();
        let (sp, cp) = (0.5 * pitch).sin_cos();
        let (sr, cr) = (0.5 * roll).sin_cos();

        Quat::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
    }

    /// Inverse of `from_euler_zyx`: returns (yaw, pitch, roll) as (x, y, z). \
    /// At gimbal lock (pitch = +/- pi/2) only yaw - roll (or yaw + roll)
    /// is defined; roll is reported as zero.
    pub fn to_euler_zyx(self) -> Vec3 {
        let q = self.norm();
        let sin_pitch = 2. * (q.w * q.y - q.z * q.x);

        if sin_pitch.abs() >= 1. - 1e-12 {
            let sign = sin_pitch.signum();
            let yaw = -2. * sign * q.x.atan2(q.w);

            return Vec3::new(
                yaw,
                std::f64::consts::FRAC_PI_2 * sign,
                0.,
            );
        }

        let roll = (2. * (q.w * q.x + q.y * q.z))
            .atan2(1. - 2. * (q.x * q.x + q.y * q.y));

        let pitch = sin_pitch.asin();

        let yaw = (2. * (q.w * q.z + q.x * q.y))
            .atan2(1. - 2. * (q.y * q.y + q.z * q.z));

        Vec3::new(yaw, pitch, roll)
    }

    /// Branches on the trace and the largest diagonal entry
    /// so the divisor never approaches zero
    pub fn from_rot3(rotation: Rot3) -> Quat {
        let m = rotation.matrix();
        let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];

        if trace > 0. {
            let s = (trace + 1.).sqrt() * 2.;

            Quat::new(
                (m[(2, 1)] - m[(1, 2)]) / s,
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(1, 0)] - m[(0, 1)]) / s,
                0.25 * s,
            )
        } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
            let s = (1. + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.;

            Quat::new(
                0.25 * s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(2, 1)] - m[(1, 2)]) / s,
            )
        } else if m[(1, 1)] > m[(2, 2)] {
            let s = (1. + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.;

            Quat::new(
                (m[(0, 1)] + m[(1, 0)]) / s,
                0.25 * s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                (m[(0, 2)] - m[(2, 0)]) / s,
            )
        } else {
            let s = (1. + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.;

            Quat::new(
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                0.25 * s,
                (m[(1, 0)] - m[(0, 1)]) / s,
            )
        }
    }

    /// Normalizes first; the zero quaternion maps to the identity
    pub fn to_rot3(self) -> Rot3 {
        if self.mag_squared() == 0. {
            return Rot3::identity();
        }

        let q = self.norm();

        let (xx, yy, zz) = (q.x * q.x, q.y * q.y, q.z * q.z);
        let (xy, xz, yz) = (q.x * q.y, q.x * q.z, q.y * q.z);
        let (wx, wy, wz) = (q.w * q.x, q.w * q.y, q.w * q.z);

        Rot3::from_mat3_unchecked(Mat3::new(
            1. - 2. * (yy + zz),      2. * (xy - wz),      2. * (xz + wy),
                 2. * (xy + wz), 1. - 2. * (xx + zz),      2. * (yz - wx),
                 2. * (xz - wy),      2. * (yz + wx), 1. - 2. * (xx + yy),
        ))
    }

    pub fn conjugate(self) -> Quat {
        Quat::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn dot(self, other: Quat) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn mag_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn mag(self) -> f64 {
        self.mag_squared().sqrt()
    }

    pub fn norm(self) -> Quat {
        let mag = self.mag();

        if mag == 0. {
            return self;
        }

        self * (1. / mag)
    }

    /// True when both quaternions describe the same rotation
    /// (q and -q are equivalent)
    pub fn same_rotation(self, other: Quat, epsilon: f64) -> bool {
        let (a, b) = (self.norm(), other.norm());
        let close = |sign: f64| {
            (a.x - sign * b.x).abs() <= epsilon
                && (a.y - sign * b.y).abs() <= epsilon
                && (a.z - sign * b.z).abs() <= epsilon
                && (a.w - sign * b.w).abs() <= epsilon
        };

        close(1.) || close(-1.)
    }
}

impl std::ops::Mul for Quat {
    type Output = Quat;

    // Hamilton product
    fn mul(self, q: Quat) -> Quat {
        Quat::new(
            self.w * q.x + self.x * q.w + self.y * q.z - self.z * q.y,
            self.w * q.y - self.x * q.z + self.y * q.w + self.z * q.x,
            self.w * q.z + self.x * q.y - self.y * q.x + self.z * q.w,
            self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
        )
    }
}

impl std::ops::Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, vec: Vec3) -> Vec3 {
        self.to_rot3() * vec
    }
}

impl std::ops::Mul<f64> for Quat {
    type Output = Quat;

    fn mul(self, scalar: f64) -> Quat {
        Quat::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
            self.w * scalar,
        )
    }
}

impl std::ops::Neg for Quat {
    type Output = Quat;

    fn neg(self) -> Quat {
        self * -1.
    }
}

impl std::fmt::Display for Quat {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            out,
            "( {}, {}, {}; {} )",
            self.x, self.y, self.z, self.w,
        )
    }
}

/// 4x4 homogeneous matrix. \
/// Calculations are row-major; use `to_cols_f32()` for GLSL upload,
/// which expects column-major order. \
/// The default value is the zero matrix, not the identity.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Mat {
    m: [[f64; 4]; 4],
}

impl Mat {
    pub fn new(
        x0: f64, x1: f64, x2: f64, x3: f64,
        y0: f64, y1: f64, y2: f64, y3: f64,
        z0: f64, z1: f64, z2: f64, z3: f64,
        w0: f64, w1: f64, w2: f64, w3: f64,
    ) -> Mat {
        Mat {
            m: [
                [x0, x1, x2, x3],
                [y0, y1, y2, y3],
                [z0, z1, z2, z3],
                [w0, w1, w2, w3],
            ],
        }
    }

    #[inline]
    pub fn zero() -> Mat {
        Mat::default()
    }

    #[inline]
    pub fn identity() -> Mat {
        Mat::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Affine matrix from a linear part and a translation
    fn affine(linear: Mat3, translation: Vec3) -> Mat {
        let mut result = Mat::identity();
        result.set_linear(linear);
        result.set_translation(translation);
        result
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row][col]
    }

    pub fn is_affine(&self) -> bool {
        // Exact comparison
        self.m[3] == [0., 0., 0., 1.]
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (*self * Vec4::point(point)).xyz()
    }

    pub fn transform_vector(&self, vec: Vec3) -> Vec3 {
        (*self * Vec4::direction(vec)).xyz()
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Mat {
        Mat::new(
            1.0, 0.0, 0.0,   x,
            0.0, 1.0, 0.0,   y,
            0.0, 0.0, 1.0,   z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn translation_vec(translation: Vec3) -> Mat {
        Mat::translation(translation.x, translation.y, translation.z)
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Mat {
        Mat::new(
              x, 0.0, 0.0, 0.0,
            0.0,   y, 0.0, 0.0,
            0.0, 0.0,   z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    pub fn scale_vec(scale: Vec3) -> Mat {
        Mat::scale(scale.x, scale.y, scale.z)
    }

    pub fn rotation(rotation: Rot3) -> Mat {
        Mat::affine(rotation.matrix(), Vec3::zero())
    }

    pub fn rotation_quat(rotation: Quat) -> Mat {
        Mat::rotation(rotation.to_rot3())
    }

    /// `T * R * S` in one step: each rotation column is scaled by the
    /// matching scale component, translation goes in the last column
    pub fn from_trs(translation: Vec3, rotation: Rot3, scale: Vec3) -> Mat {
        Mat::affine(rotation.matrix().scale_columns(scale), translation)
    }

    pub fn from_trs_quat(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat {
        Mat::from_trs(translation, rotation.to_rot3(), scale)
    }

    /// Inverse of a rotation + translation matrix. \
    /// Any scale in the linear part is not detected and yields a wrong
    /// result; use `inverse_trs()` for scaled matrices.
    pub fn inverse_tr(&self) -> Result<Mat, AffineError> {
        if !self.is_affine() {
            return Err(AffineError::NotAffine);
        }

        let inverse = Rot3::from_mat3_unchecked(self.get_linear()).inverse();
        let translation = inverse * -self.get_translation();

        Ok(Mat::affine(inverse.matrix(), translation))
    }

    /// General affine inverse, supporting non-uniform and negative scale
    pub fn inverse_trs(&self) -> Result<Mat, AffineError> {
        if !self.is_affine() {
            return Err(AffineError::NotAffine);
        }

        let scale = nondegenerate(self.get_scale())?;
        let inverse_scale = Mat3::diagonal(scale.recip());

        // R = RS * S^-1
        let rotation = Rot3::from_mat3_unchecked(
            self.get_linear() * inverse_scale,
        );

        // (RS)^-1 = S^-1 * R^T
        let linear = inverse_scale * rotation.inverse().matrix();
        let translation = linear * -self.get_translation();

        Ok(Mat::affine(linear, translation))
    }

    pub fn get_translation(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Upper-left 3x3 block (rotation combined with scale)
    pub fn get_linear(&self) -> Mat3 {
        let m = &self.m;

        Mat3::new(
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        )
    }

    /// Column norms of the linear part. \
    /// A reflection (negative determinant) is reported as a negative X
    /// component, so that `get_rotation()` stays a proper rotation.
    pub fn get_scale(&self) -> Vec3 {
        let linear = self.get_linear();

        let mut scale = Vec3::new(
            linear.column(0).mag(),
            linear.column(1).mag(),
            linear.column(2).mag(),
        );

        // Same sign as the determinant of the unit-column candidate
        if linear.determinant() < 0. {
            scale.x = -scale.x;
        }

        scale
    }

    pub fn get_rotation(&self) -> Result<Rot3, AffineError> {
        let scale = nondegenerate(self.get_scale())?;

        Ok(Rot3::from_mat3_unchecked(
            self.get_linear().scale_columns(scale.recip()),
        ))
    }

    pub fn get_rotation_quat(&self) -> Result<Quat, AffineError> {
        self.get_rotation().map(Quat::from_rot3)
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.m[0][3] = translation.x;
        self.m[1][3] = translation.y;
        self.m[2][3] = translation.z;
    }

    pub fn set_linear(&mut self, linear: Mat3) {
        for i in 0..3 {
            for j in 0..3 {
                self.m[i][j] = linear[(i, j)];
            }
        }
    }

    /// Replaces the scale, keeping the rotation currently decomposed from
    /// the linear part. Fails if that rotation cannot be recovered.
    pub fn set_scale(&mut self, scale: Vec3) -> Result<(), AffineError> {
        let rotation = self.get_rotation()?;
        self.set_linear(rotation.matrix().scale_columns(scale));

        Ok(())
    }

    /// Replaces the rotation, keeping the scale (and reflection sign)
    /// currently decomposed from the linear part
    pub fn set_rotation(&mut self, rotation: Rot3) {
        let scale = self.get_scale();
        self.set_linear(rotation.matrix().scale_columns(scale));
    }

    pub fn set_rotation_quat(&mut self, rotation: Quat) {
        self.set_rotation(rotation.to_rot3());
    }

    /// Rebuilds translation and linear part together,
    /// independent of the previous contents
    pub fn set_trs(&mut self, translation: Vec3, rotation: Rot3, scale: Vec3) {
        self.set_linear(rotation.matrix().scale_columns(scale));
        self.set_translation(translation);
    }

    /// Asymmetric frustum, OpenGL convention
    /// (right-handed, clip-space z in [-1, 1])
    pub fn perspective(
        left:   f64,
        right:  f64,
        bottom: f64,
        top:    f64,
        near:   f64,
        far:    f64,
    ) -> Mat {
        let mut result = Mat::zero();

        result.m[0][0] = (2. * near) / (right - left);
        result.m[1][1] = (2. * near) / (top - bottom);

        result.m[0][2] = (right + left) / (right - left);
        result.m[1][2] = (top + bottom) / (top - bottom);

        result.m[2][2] = -(far + near) / (far - near);
        result.m[2][3] = -(2. * far * near) / (far - near);

        result.m[3][2] = -1.;

        result
    }

    pub fn transpose(self) -> Mat {
        let mut result = Mat::zero();

        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[j][i];
            }
        }

        result
    }

    /// Column-major single precision, as expected by GLSL
    pub fn to_cols_f32(&self) -> [f32; 16] {
        let mut result = [0f32; 16];

        for col in 0..4 {
            for row in 0..4 {
                result[col * 4 + row] = self.m[row][col] as f32;
            }
        }

        result
    }

    pub fn approx_eq(&self, other: &Mat, epsilon: f64) -> bool {
        for i in 0..4 {
            for j in 0..4 {
                if (self.m[i][j] - other.m[i][j]).abs() > epsilon {
                    return false;
                }
            }
        }

        true
    }
}

impl std::ops::Index<(usize, usize)> for Mat {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.m[row][col]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Mat {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.m[row][col]
    }
}

impl std::ops::Mul for Mat {
    type Output = Mat;

    // Naive matrix multiply
    fn mul(self, other: Mat) -> Mat {
        let mut result = Mat::zero();

        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.;

                for k in 0..4 {
                    sum += self.m[i][k] * other.m[k][j];
                }

                result.m[i][j] = sum;
            }
        }

        result
    }
}

impl std::ops::Mul<Vec4> for Mat {
    type Output = Vec4;

    fn mul(self, vec: Vec4) -> Vec4 {
        let row = |i: usize| {
            self.m[i][0] * vec.x
                + self.m[i][1] * vec.y
                + self.m[i][2] * vec.z
                + self.m[i][3] * vec.w
        };

        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

impl std::fmt::Display for Mat {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        let m = &self.m;

        write!(
            out,
            "[ {}, {}, {}, {} ]\n[ {}, {}, {}, {} ]\n\
            [ {}, {}, {}, {} ]\n[ {}, {}, {}, {} ]",
            m[0][0], m[0][1], m[0][2], m[0][3],
            m[1][0], m[1][1], m[1][2], m[1][3],
            m[2][0], m[2][1], m[2][2], m[2][3],
            m[3][0], m[3][1], m[3][2], m[3][3],
        )
    }
}
