use attitude_core::{CameraConfig, FlyCamera, Quaternion, Space, Transformable};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_axis(rng: &mut StdRng) -> Vector3<f32> {
    loop {
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.norm() > 0.1 {
            return v.normalize();
        }
    }
}

fn random_rotation(rng: &mut StdRng) -> Quaternion {
    let axis = random_axis(rng);
    let angle = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
    Quaternion::rotation(angle, &axis)
}

#[test]
fn axis_angle_rotations_are_unit() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let q = random_rotation(&mut rng);
        assert!((q.norm() - 1.0).abs() < 1e-5, "{:?}", q);
    }
}

#[test]
fn matrix_roundtrip_recovers_rotation() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..1000 {
        let q = random_rotation(&mut rng);
        let back = Quaternion::from_matrix(&q.to_matrix()).expect("rotation matrix is valid");
        let err = (back - q).norm().min((back + q).norm());
        assert!(err < 1e-4, "{:?} -> {:?}", q, back);
    }
}

#[test]
fn conjugate_cancels_rotation() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..1000 {
        let q = random_rotation(&mut rng);
        let product = q * q.conjugate();
        assert!((product - Quaternion::IDENTITY).norm() < 1e-5);
    }
}

#[test]
fn composition_is_not_commutative_but_matches_matrices() {
    let mut rng = StdRng::seed_from_u64(17);
    let p = random_rotation(&mut rng);
    let q = random_rotation(&mut rng);

    let composed = (p * q).to_rotation_matrix3();
    let product = p.to_rotation_matrix3() * q.to_rotation_matrix3();
    assert!((composed - product).amax() < 1e-5);

    let v = random_axis(&mut rng);
    let a = (p * q).rotate_vector(&v);
    let b = (q * p).rotate_vector(&v);
    assert!((a - p.rotate_vector(&q.rotate_vector(&v))).norm() < 1e-5);
    assert!((a - b).norm() > 1e-4);
}

/// Integrates a constant body rate from `start` for `duration` seconds and
/// returns the distance to the closed-form answer.
fn integration_error(
    step: fn(&mut Quaternion, &Quaternion, f32, bool),
    dt: f32,
    normalize: bool,
) -> f32 {
    let start = Quaternion::rotation(0.4, &Vector3::new(1.0, 0.0, 0.0));
    let rate = Vector3::new(0.0, 0.0, 4.0);
    let w = Quaternion::pure(&rate);
    let duration = 2.0;
    let steps = (duration / dt).round() as usize;

    let mut q = start;
    for _ in 0..steps {
        step(&mut q, &w, dt, normalize);
    }

    let exact = start * Quaternion::from_rotation_vector(&(rate * duration));
    (q - exact).norm()
}

#[test]
fn runge_kutta_converges_faster_than_euler() {
    let euler_coarse = integration_error(Quaternion::integrate_euler, 0.2, false);
    let euler_fine = integration_error(Quaternion::integrate_euler, 0.1, false);
    let rk4_coarse = integration_error(Quaternion::integrate_runge_kutta4, 0.2, false);
    let rk4_fine = integration_error(Quaternion::integrate_runge_kutta4, 0.1, false);

    assert!(rk4_coarse < euler_coarse);
    assert!(rk4_fine < euler_fine);
    assert!(rk4_fine < 1e-3, "rk4 error {}", rk4_fine);

    let euler_ratio = euler_coarse / euler_fine;
    let rk4_ratio = rk4_coarse / rk4_fine;
    assert!(rk4_ratio > 8.0, "rk4 ratio {}", rk4_ratio);
    assert!(rk4_ratio > euler_ratio, "{} <= {}", rk4_ratio, euler_ratio);
}

#[test]
fn integrators_converge_as_step_shrinks() {
    let euler = integration_error(Quaternion::integrate_euler, 0.001, true);
    let rk4 = integration_error(Quaternion::integrate_runge_kutta4, 0.001, true);
    assert!(euler < 1e-2, "euler error {}", euler);
    assert!(rk4 < 1e-2, "rk4 error {}", rk4);
}

#[test]
fn normalized_integration_stays_unit() {
    let mut q = Quaternion::IDENTITY;
    let w = Quaternion::pure(&Vector3::new(1.5, -0.5, 3.0));
    for _ in 0..1000 {
        q.integrate_euler(&w, 0.05, true);
        assert!((q.norm() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn local_and_world_translation_diverge_once_rotated() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..100 {
        let mut object = Transformable::new();
        object.set_attitude(random_rotation(&mut rng));
        let mut world = object;

        object.translate(Vector3::x(), Space::Local);
        world.translate(Vector3::x(), Space::World);

        assert!((world.position() - Vector3::x()).norm() < 1e-5);
        assert!((object.position() - object.right()).norm() < 1e-5);
    }
}

#[test]
fn camera_stays_orthonormal_under_random_input() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut camera = FlyCamera::new(Point3::origin(), CameraConfig::default());
    for _ in 0..2000 {
        camera.process_mouse_movement(
            rng.random_range(-400.0..400.0),
            rng.random_range(-400.0..400.0),
            true,
        );
        camera.process_mouse_scroll(rng.random_range(-5.0..5.0));

        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        assert!(f.dot(&r).abs() < 1e-4);
        assert!(f.dot(&u).abs() < 1e-4);
        assert!(r.dot(&u).abs() < 1e-4);
        assert!((-89.0..=89.0).contains(&camera.pitch()));
        assert!((1.0..=45.0).contains(&camera.zoom()));
    }
}
