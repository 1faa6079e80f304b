/// Transformable objects: position, attitude and scale with world/local mutation
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::camera::View;
use crate::quaternion::{Quaternion, EPSILON};

/// Frame of reference for a translation or rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Space {
    /// The object's own axes, as given by its current attitude
    #[default]
    Local,
    /// Fixed world axes, regardless of orientation
    World,
}

/// Position, orientation and scale of a node or camera rig.
///
/// The world position is derived: `position = origin + local_position`.
/// Moving the origin drags the object along while its local position stays
/// put; setting the world position rewrites the local position instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformable {
    local_position: Vector3<f32>,
    origin: Vector3<f32>,
    attitude: Quaternion,
    scale: Vector3<f32>,
}

impl Default for Transformable {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformable {
    pub fn new() -> Self {
        Self {
            local_position: Vector3::zeros(),
            origin: Vector3::zeros(),
            attitude: Quaternion::IDENTITY,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            local_position: position,
            ..Self::new()
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.origin + self.local_position
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.local_position = position - self.origin;
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    /// Move the reference frame; the local position is kept
    pub fn set_origin(&mut self, origin: Vector3<f32>) {
        self.origin = origin;
    }

    pub fn local_position(&self) -> Vector3<f32> {
        self.local_position
    }

    pub fn set_local_position(&mut self, local_position: Vector3<f32>) {
        self.local_position = local_position;
    }

    pub fn attitude(&self) -> Quaternion {
        self.attitude
    }

    pub fn set_attitude(&mut self, attitude: Quaternion) {
        self.attitude = attitude.normalized();
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    /// Multiply the current scale component-wise
    pub fn scale_by(&mut self, factor: Vector3<f32>) {
        self.scale.component_mul_assign(&factor);
    }

    /// Move by `delta`. In local space the delta is first rotated by the
    /// current attitude, so `-Z` always means "forward".
    pub fn translate(&mut self, delta: Vector3<f32>, space: Space) {
        let delta = match space {
            Space::Local => self.attitude.rotate_vector(&delta),
            Space::World => delta,
        };
        self.local_position += delta;
    }

    /// Compose a rotation of `angle` radians about `axis`.
    ///
    /// Local rotations post-multiply (`attitude ⊗ r`, intrinsic), world
    /// rotations pre-multiply (`r ⊗ attitude`, extrinsic).
    pub fn rotate(&mut self, angle: f32, axis: &Vector3<f32>, space: Space) {
        let n = axis.norm();
        if n < EPSILON {
            log::trace!("ignoring rotation about degenerate axis {:?}", axis);
            return;
        }
        let r = Quaternion::rotation(angle, &(axis / n));
        self.attitude = match space {
            Space::Local => self.attitude * r,
            Space::World => r * self.attitude,
        };
        self.attitude.normalize();
    }

    /// Rotate about the up axis
    pub fn yaw(&mut self, angle: f32, space: Space) {
        self.rotate(angle, &Vector3::y(), space);
    }

    /// Rotate about the right axis
    pub fn pitch(&mut self, angle: f32, space: Space) {
        self.rotate(angle, &Vector3::x(), space);
    }

    /// Rotate about the forward axis
    pub fn roll(&mut self, angle: f32, space: Space) {
        self.rotate(angle, &-Vector3::z(), space);
    }

    pub fn up(&self) -> Vector3<f32> {
        self.attitude.rotate_vector(&Vector3::y())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.attitude.rotate_vector(&Vector3::x())
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.attitude.rotate_vector(&-Vector3::z())
    }

    /// Facing direction; same as [`Transformable::forward`]
    pub fn direction(&self) -> Vector3<f32> {
        self.forward()
    }

    /// Turn to face `target`, keeping `up` as close to the up axis as possible.
    ///
    /// Does nothing when the target coincides with the position or lies
    /// straight along `up`.
    pub fn look_at(&mut self, target: &Vector3<f32>, up: &Vector3<f32>) {
        let to_target = target - self.position();
        if to_target.norm() < EPSILON {
            return;
        }
        let back = -to_target.normalize();
        let right = up.cross(&back);
        if right.norm() < EPSILON {
            log::debug!("look_at target is parallel to up, keeping attitude");
            return;
        }
        let right = right.normalize();
        let true_up = back.cross(&right);

        let basis = Matrix3::from_columns(&[right, true_up, back]);
        self.attitude = Quaternion::from_rotation_matrix3_unchecked(&basis).normalized();
    }

    /// Model matrix `T · R · S`
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position())
            * self.attitude.to_matrix()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a point from object space into world space
    pub fn to_world(&self, point: &Point3<f32>) -> Point3<f32> {
        let scaled = point.coords.component_mul(&self.scale);
        Point3::from(self.position() + self.attitude.rotate_vector(&scaled))
    }

    /// Map a world-space point into object space.
    ///
    /// Zero scale components produce non-finite coordinates.
    pub fn to_local(&self, point: &Point3<f32>) -> Point3<f32> {
        let offset = point.coords - self.position();
        let unrotated = self.attitude.conjugate().rotate_vector(&offset);
        Point3::from(unrotated.component_div(&self.scale))
    }
}

impl View for Transformable {
    fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from(self.position());
        Matrix4::look_at_rh(&eye, &(eye + self.forward()), &self.up())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: &Vector3<f32>, b: &Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_default_basis() {
        let t = Transformable::new();
        assert!(close(&t.up(), &Vector3::y()));
        assert!(close(&t.right(), &Vector3::x()));
        assert!(close(&t.forward(), &-Vector3::z()));
        assert_eq!(t.direction(), t.forward());
    }

    #[test]
    fn test_origin_moves_position_not_local() {
        let mut t = Transformable::from_position(Vector3::new(1.0, 0.0, 0.0));
        t.set_origin(Vector3::new(0.0, 5.0, 0.0));
        assert!(close(&t.local_position(), &Vector3::new(1.0, 0.0, 0.0)));
        assert!(close(&t.position(), &Vector3::new(1.0, 5.0, 0.0)));

        t.set_position(Vector3::new(2.0, 2.0, 2.0));
        assert!(close(&t.origin(), &Vector3::new(0.0, 5.0, 0.0)));
        assert!(close(&t.local_position(), &Vector3::new(2.0, -3.0, 2.0)));
    }

    #[test]
    fn test_translate_local_vs_world() {
        let mut local = Transformable::new();
        local.yaw(FRAC_PI_2, Space::World);
        let mut world = local;

        local.translate(Vector3::new(1.0, 0.0, 0.0), Space::Local);
        world.translate(Vector3::new(1.0, 0.0, 0.0), Space::World);

        assert!(close(&local.position(), &Vector3::new(0.0, 0.0, -1.0)));
        assert!(close(&world.position(), &Vector3::new(1.0, 0.0, 0.0)));
        assert!(!close(&local.position(), &world.position()));
    }

    #[test]
    fn test_local_rotation_is_intrinsic() {
        let mut intrinsic = Transformable::new();
        intrinsic.pitch(FRAC_PI_2, Space::Local);
        let mut extrinsic = intrinsic;
        assert!(close(&intrinsic.forward(), &Vector3::y()));

        // Local yaw turns about the object's up, which now points along +Z
        intrinsic.yaw(FRAC_PI_2, Space::Local);
        // World yaw turns about +Y, the current forward, so forward is unchanged
        extrinsic.yaw(FRAC_PI_2, Space::World);

        assert!(close(&intrinsic.forward(), &Vector3::new(-1.0, 0.0, 0.0)));
        assert!(close(&extrinsic.forward(), &Vector3::y()));
    }

    #[test]
    fn test_roll_keeps_forward() {
        let mut t = Transformable::new();
        t.roll(0.8, Space::Local);
        assert!(close(&t.forward(), &-Vector3::z()));
        assert!(!close(&t.up(), &Vector3::y()));
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut t = Transformable::new();
        for i in 0..500 {
            let angle = 0.01 * (i % 7) as f32 + 0.003;
            t.yaw(angle, Space::Local);
            t.pitch(angle * 0.7, Space::World);
            t.roll(-angle * 1.3, Space::Local);
        }
        let (u, r, f) = (t.up(), t.right(), t.forward());
        assert!((t.attitude().norm() - 1.0).abs() < 1e-5);
        assert!(u.dot(&r).abs() < 1e-4);
        assert!(u.dot(&f).abs() < 1e-4);
        assert!(r.dot(&f).abs() < 1e-4);
        assert!((u.norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_ignores_zero_axis() {
        let mut t = Transformable::new();
        t.rotate(1.0, &Vector3::zeros(), Space::World);
        assert_eq!(t.attitude(), Quaternion::IDENTITY);
    }

    #[test]
    fn test_world_local_point_roundtrip() {
        let mut t = Transformable::from_position(Vector3::new(3.0, -1.0, 2.0));
        t.rotate(0.9, &Vector3::new(1.0, 1.0, 0.0), Space::World);
        t.set_scale(Vector3::new(2.0, 1.0, 0.5));

        let p = Point3::new(0.5, -2.0, 4.0);
        let back = t.to_local(&t.to_world(&p));
        assert!((back - p).norm() < 1e-4);

        let via_matrix = t.matrix().transform_point(&p);
        assert!((via_matrix - t.to_world(&p)).norm() < 1e-4);
    }

    #[test]
    fn test_scale_by() {
        let mut t = Transformable::new();
        t.set_scale(Vector3::new(2.0, 3.0, 4.0));
        t.scale_by(Vector3::new(0.5, 2.0, 1.0));
        assert!(close(&t.scale(), &Vector3::new(1.0, 6.0, 4.0)));
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut t = Transformable::from_position(Vector3::new(0.0, 2.0, 5.0));
        let target = Vector3::new(1.0, 0.0, -3.0);
        t.look_at(&target, &Vector3::y());
        let expected = (target - t.position()).normalize();
        assert!(close(&t.forward(), &expected));
        assert!(t.right().y.abs() < 1e-5);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let mut t = Transformable::from_position(Vector3::new(4.0, 1.0, -2.0));
        t.yaw(0.6, Space::Local);
        let view = t.view_matrix();
        let eye = view.transform_point(&Point3::from(t.position()));
        assert!(eye.coords.norm() < 1e-4);

        let ahead = view.transform_point(&Point3::from(t.position() + t.forward()));
        assert!((ahead.coords - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
    }
}
