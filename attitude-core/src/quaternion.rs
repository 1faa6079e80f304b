/// Quaternion algebra for 3D orientation
///
/// Components follow the `a + b·i + c·j + d·k` convention: `a` is the scalar
/// part and `(b, c, d)` the imaginary part. Rotations act on column vectors as
/// `q ⊗ v ⊗ q*`, which matches the rotation matrices produced by
/// [`Quaternion::to_matrix`] and by `nalgebra::UnitQuaternion`.
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

use crate::error::{MathError, Result};

/// Magnitude below which vectors and quaternions count as zero
pub const EPSILON: f32 = 1e-6;

/// Allowed deviation from orthonormality / unit determinant in `from_matrix`
pub const ROTATION_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Pure quaternion `(0, v)`, used for vectors and angular velocities
    pub fn pure(v: &Vector3<f32>) -> Self {
        Self::new(0.0, v.x, v.y, v.z)
    }

    pub fn scalar(&self) -> f32 {
        self.a
    }

    /// Imaginary part as a vector
    pub fn vector(&self) -> Vector3<f32> {
        Vector3::new(self.b, self.c, self.d)
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis must already be unit length; it is not renormalized here.
    pub fn rotation(angle: f32, axis: &Vector3<f32>) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(c, s * axis.x, s * axis.y, s * axis.z)
    }

    /// Rotation from a rotation vector (unit axis scaled by the angle).
    ///
    /// Vectors shorter than [`EPSILON`] yield the identity.
    pub fn from_rotation_vector(v: &Vector3<f32>) -> Self {
        let angle = v.norm();
        if angle < EPSILON {
            log::trace!("rotation vector {:?} below epsilon, using identity", v);
            return Self::IDENTITY;
        }
        Self::rotation(angle, &(v / angle))
    }

    /// Extract the rotation held in the top-left 3x3 block of `m`.
    ///
    /// The block is validated first: it must be orthonormal with a determinant
    /// of +1 within [`ROTATION_TOLERANCE`].
    pub fn from_matrix(m: &Matrix4<f32>) -> Result<Self> {
        let r = m.fixed_view::<3, 3>(0, 0).into_owned();
        Self::from_rotation_matrix3(&r)
    }

    /// Like [`Quaternion::from_matrix`] but for a bare 3x3 matrix
    pub fn from_rotation_matrix3(m: &Matrix3<f32>) -> Result<Self> {
        if !m.iter().all(|v| v.is_finite()) {
            return Err(MathError::NonFinite("rotation matrix"));
        }

        let orthogonality_error = (m.transpose() * m - Matrix3::identity()).amax();
        let determinant = m.determinant();
        if orthogonality_error > ROTATION_TOLERANCE
            || (determinant - 1.0).abs() > ROTATION_TOLERANCE
        {
            log::debug!(
                "rejecting rotation matrix: det={}, orthogonality error={}",
                determinant,
                orthogonality_error
            );
            return Err(MathError::MalformedRotationMatrix {
                determinant,
                orthogonality_error,
            });
        }

        Ok(Self::from_rotation_matrix3_unchecked(m))
    }

    /// Extract a rotation from a 4x4 matrix without validating it.
    ///
    /// The result is unspecified when the top-left block is not in SO(3).
    pub fn from_matrix_unchecked(m: &Matrix4<f32>) -> Self {
        let r = m.fixed_view::<3, 3>(0, 0).into_owned();
        Self::from_rotation_matrix3_unchecked(&r)
    }

    /// Trace-based extraction; picks the branch with the largest denominator.
    pub fn from_rotation_matrix3_unchecked(m: &Matrix3<f32>) -> Self {
        let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new(
                0.25 / s,
                (m[(2, 1)] - m[(1, 2)]) * s,
                (m[(0, 2)] - m[(2, 0)]) * s,
                (m[(1, 0)] - m[(0, 1)]) * s,
            )
        } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
            let s = 2.0 * (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt();
            Self::new(
                (m[(2, 1)] - m[(1, 2)]) / s,
                0.25 * s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
            )
        } else if m[(1, 1)] > m[(2, 2)] {
            let s = 2.0 * (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt();
            Self::new(
                (m[(0, 2)] - m[(2, 0)]) / s,
                (m[(0, 1)] + m[(1, 0)]) / s,
                0.25 * s,
                (m[(1, 2)] + m[(2, 1)]) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt();
            Self::new(
                (m[(1, 0)] - m[(0, 1)]) / s,
                (m[(0, 2)] + m[(2, 0)]) / s,
                (m[(1, 2)] + m[(2, 1)]) / s,
                0.25 * s,
            )
        }
    }

    /// 3x3 rotation matrix for a unit quaternion
    #[rustfmt::skip]
    pub fn to_rotation_matrix3(&self) -> Matrix3<f32> {
        let Self { a, b, c, d } = *self;
        Matrix3::new(
            1.0 - 2.0 * (c * c + d * d), 2.0 * (b * c - a * d),       2.0 * (b * d + a * c),
            2.0 * (b * c + a * d),       1.0 - 2.0 * (b * b + d * d), 2.0 * (c * d - a * b),
            2.0 * (b * d - a * c),       2.0 * (c * d + a * b),       1.0 - 2.0 * (b * b + c * c),
        )
    }

    /// Rotation embedded in the top-left of a 4x4 identity
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&self.to_rotation_matrix3());
        m
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.a, -self.b, -self.c, -self.d)
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.a * other.a + self.b * other.b + self.c * other.c + self.d * other.d
    }

    pub fn norm_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    /// Scale to unit length in place. A zero quaternion becomes the identity.
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n < EPSILON {
            log::trace!("normalizing a zero quaternion, resetting to identity");
            *self = Self::IDENTITY;
            return;
        }
        *self /= n;
    }

    pub fn normalized(&self) -> Self {
        let mut q = *self;
        q.normalize();
        q
    }

    /// Multiplicative inverse; equals the conjugate for unit quaternions
    pub fn inverse(&self) -> Self {
        let n2 = self.norm_squared();
        if n2 < EPSILON * EPSILON {
            return Self::IDENTITY;
        }
        self.conjugate() / n2
    }

    /// Rotate a pure quaternion: `q ⊗ v ⊗ q*`
    pub fn transform(&self, v: &Quaternion) -> Quaternion {
        *self * *v * self.conjugate()
    }

    /// Rotate a 3D vector by this (unit) quaternion
    pub fn rotate_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.transform(&Self::pure(v)).vector()
    }

    /// Rotation angle in radians, in `[0, 2π]`
    pub fn angle(&self) -> f32 {
        2.0 * self.a.clamp(-1.0, 1.0).acos()
    }

    /// Unit rotation axis; `+Z` when the rotation is (near-)identity
    pub fn axis(&self) -> Vector3<f32> {
        let v = self.vector();
        let n = v.norm();
        if n < EPSILON {
            log::trace!("axis of identity rotation requested, defaulting to +Z");
            return Vector3::z();
        }
        v / n
    }

    /// Rotation vector (axis scaled by angle) along the shortest arc
    pub fn to_rotation_vector(&self) -> Vector3<f32> {
        let q = if self.a < 0.0 { -*self } else { *self };
        let v = q.vector();
        if v.norm() < EPSILON {
            return Vector3::zeros();
        }
        q.axis() * q.angle()
    }

    /// Spherical interpolation along the shortest arc
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let mut cos_half_theta = self.dot(other);
        let mut other = *other;
        if cos_half_theta < 0.0 {
            other = -other;
            cos_half_theta = -cos_half_theta;
        }

        // Nearly parallel: fall back to normalized lerp
        if cos_half_theta > 0.9995 {
            return (*self + (other - *self) * t).normalized();
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();
        let wa = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let wb = (t * half_theta).sin() / sin_half_theta;
        *self * wa + other * wb
    }

    /// Time derivative `½ q ⊗ w` for a body-frame angular velocity `w`
    pub fn derivative(&self, angular_velocity: &Quaternion) -> Self {
        *self * *angular_velocity * 0.5
    }

    /// Advance by one explicit Euler step of `dq/dt = ½ q ⊗ w`
    pub fn integrate_euler(&mut self, angular_velocity: &Quaternion, dt: f32, normalize: bool) {
        *self += self.derivative(angular_velocity) * dt;
        if normalize {
            self.normalize();
        }
    }

    /// Advance by one classic fourth-order Runge-Kutta step of `dq/dt = ½ q ⊗ w`
    pub fn integrate_runge_kutta4(
        &mut self,
        angular_velocity: &Quaternion,
        dt: f32,
        normalize: bool,
    ) {
        let half = dt * 0.5;
        let k1 = self.derivative(angular_velocity);
        let k2 = (*self + k1 * half).derivative(angular_velocity);
        let k3 = (*self + k2 * half).derivative(angular_velocity);
        let k4 = (*self + k3 * dt).derivative(angular_velocity);

        *self += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
        if normalize {
            self.normalize();
        }
    }
}

/// Hamilton product
impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.a * rhs.a - self.b * rhs.b - self.c * rhs.c - self.d * rhs.d,
            self.a * rhs.b + self.b * rhs.a + self.c * rhs.d - self.d * rhs.c,
            self.a * rhs.c - self.b * rhs.d + self.c * rhs.a + self.d * rhs.b,
            self.a * rhs.d + self.b * rhs.c - self.c * rhs.b + self.d * rhs.a,
        )
    }
}

/// `q *= r` is `q = q ⊗ r`
impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Quaternion) {
        *self = *self * rhs;
    }
}

impl Mul<f32> for Quaternion {
    type Output = Quaternion;

    fn mul(self, s: f32) -> Quaternion {
        Quaternion::new(self.a * s, self.b * s, self.c * s, self.d * s)
    }
}

impl Mul<Quaternion> for f32 {
    type Output = Quaternion;

    fn mul(self, q: Quaternion) -> Quaternion {
        q * self
    }
}

impl MulAssign<f32> for Quaternion {
    fn mul_assign(&mut self, s: f32) {
        *self = *self * s;
    }
}

impl Div<f32> for Quaternion {
    type Output = Quaternion;

    fn div(self, s: f32) -> Quaternion {
        Quaternion::new(self.a / s, self.b / s, self.c / s, self.d / s)
    }
}

impl DivAssign<f32> for Quaternion {
    fn div_assign(&mut self, s: f32) {
        *self = *self / s;
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(self.a + rhs.a, self.b + rhs.b, self.c + rhs.c, self.d + rhs.d)
    }
}

impl AddAssign for Quaternion {
    fn add_assign(&mut self, rhs: Quaternion) {
        *self = *self + rhs;
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    fn sub(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(self.a - rhs.a, self.b - rhs.b, self.c - rhs.c, self.d - rhs.d)
    }
}

impl SubAssign for Quaternion {
    fn sub_assign(&mut self, rhs: Quaternion) {
        *self = *self - rhs;
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    fn neg(self) -> Quaternion {
        Quaternion::new(-self.a, -self.b, -self.c, -self.d)
    }
}

impl From<Quaternion> for UnitQuaternion<f32> {
    fn from(q: Quaternion) -> Self {
        // nalgebra: Quaternion::new(w, i, j, k)
        UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(q.a, q.b, q.c, q.d))
    }
}

impl From<UnitQuaternion<f32>> for Quaternion {
    fn from(uq: UnitQuaternion<f32>) -> Self {
        let q = uq.into_inner();
        Quaternion::new(q.w, q.i, q.j, q.k)
    }
}
