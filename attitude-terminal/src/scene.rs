/// Wireframe scene driven by the core transform math
use attitude_core::{Quaternion, Space, Transformable};
use nalgebra::{Point3, Vector3};

use crate::config::Integrator;

/// Vertices plus index pairs for the edges between them
#[derive(Debug, Clone)]
pub struct WireMesh {
    pub vertices: Vec<Point3<f32>>,
    pub edges: Vec<(usize, usize)>,
}

impl WireMesh {
    /// Axis-aligned cube centered on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = (0..8)
            .map(|i| {
                let x = if i & 1 == 0 { -h } else { h };
                let y = if i & 2 == 0 { -h } else { h };
                let z = if i & 4 == 0 { -h } else { h };
                Point3::new(x, y, z)
            })
            .collect();

        // Corners that differ in exactly one bit share an edge
        let mut edges = Vec::with_capacity(12);
        for a in 0..8usize {
            for bit in [1, 2, 4] {
                let b = a | bit;
                if b != a {
                    edges.push((a, b));
                }
            }
        }

        Self { vertices, edges }
    }

    /// Square pyramid whose apex points along `-Z`, the forward axis
    pub fn arrow(length: f32) -> Self {
        let w = length * 0.3;
        let vertices = vec![
            Point3::new(0.0, 0.0, -length),
            Point3::new(-w, -w, 0.0),
            Point3::new(w, -w, 0.0),
            Point3::new(w, w, 0.0),
            Point3::new(-w, w, 0.0),
        ];
        let edges = vec![(0, 1), (0, 2), (0, 3), (0, 4), (1, 2), (2, 3), (3, 4), (4, 1)];
        Self { vertices, edges }
    }

    /// Flat grid in the XZ plane
    pub fn grid(half_extent: i32, spacing: f32) -> Self {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        let extent = half_extent as f32 * spacing;
        for i in -half_extent..=half_extent {
            let t = i as f32 * spacing;
            let base = vertices.len();
            vertices.push(Point3::new(t, 0.0, -extent));
            vertices.push(Point3::new(t, 0.0, extent));
            vertices.push(Point3::new(-extent, 0.0, t));
            vertices.push(Point3::new(extent, 0.0, t));
            edges.push((base, base + 1));
            edges.push((base + 2, base + 3));
        }
        Self { vertices, edges }
    }
}

/// How a scene object moves each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    Still,
    /// Constant body-frame angular velocity, as a pure quaternion
    Spin(Quaternion),
    /// Turns about world up while its origin bobs vertically
    Bob,
    /// Steers in a circle using local-space yaw and translation
    Wander,
}

/// A mesh placed in the world with its per-frame animation
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: WireMesh,
    pub transform: Transformable,
    pub animation: Animation,
}

impl SceneObject {
    pub fn new(mesh: WireMesh, transform: Transformable) -> Self {
        Self {
            mesh,
            transform,
            animation: Animation::Still,
        }
    }

    pub fn spinning(self, angular_velocity: Vector3<f32>) -> Self {
        self.animated(Animation::Spin(Quaternion::pure(&angular_velocity)))
    }

    pub fn animated(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    fn step(&mut self, integrator: Integrator, elapsed: f32, dt: f32) {
        match self.animation {
            Animation::Still => {}
            Animation::Spin(w) => {
                let mut attitude = self.transform.attitude();
                match integrator {
                    Integrator::Euler => attitude.integrate_euler(&w, dt, true),
                    Integrator::RungeKutta4 => attitude.integrate_runge_kutta4(&w, dt, true),
                }
                self.transform.set_attitude(attitude);
            }
            Animation::Bob => {
                let bob = (elapsed * 1.5).sin() * 0.75;
                self.transform.set_origin(Vector3::new(0.0, bob, 0.0));
                self.transform.yaw(dt * 0.8, Space::World);
            }
            Animation::Wander => {
                self.transform.yaw(dt * 0.6, Space::Local);
                self.transform
                    .translate(Vector3::new(0.0, 0.0, -dt * 0.6), Space::Local);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DemoScene {
    pub objects: Vec<SceneObject>,
    pub integrator: Integrator,
    elapsed: f32,
}

impl DemoScene {
    pub fn new(spin: Vector3<f32>, integrator: Integrator) -> Self {
        let mut satellite = Transformable::from_position(Vector3::new(3.5, 0.0, 0.0));
        satellite.set_scale(Vector3::new(0.5, 0.5, 0.5));

        let mut pointer = Transformable::from_position(Vector3::new(-3.5, 0.5, 0.0));
        pointer.yaw(std::f32::consts::FRAC_PI_2, Space::World);

        let objects = vec![
            SceneObject::new(
                WireMesh::grid(6, 1.0),
                Transformable::from_position(Vector3::new(0.0, -1.5, 0.0)),
            ),
            SceneObject::new(WireMesh::cube(2.0), Transformable::new()).spinning(spin),
            // Positioned relative to a moving origin
            SceneObject::new(WireMesh::cube(2.0), satellite).animated(Animation::Bob),
            SceneObject::new(WireMesh::arrow(1.5), pointer).animated(Animation::Wander),
        ];

        Self {
            objects,
            integrator,
            elapsed: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        for object in &mut self.objects {
            object.step(self.integrator, self.elapsed, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_topology() {
        let cube = WireMesh::cube(2.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.edges.len(), 12);
        for (a, b) in &cube.edges {
            let d = cube.vertices[*a] - cube.vertices[*b];
            assert!((d.norm() - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_grid_edges_in_range() {
        let grid = WireMesh::grid(3, 0.5);
        assert!(grid.edges.iter().all(|(a, b)| *a < grid.vertices.len() && *b < grid.vertices.len()));
    }

    fn find(scene: &DemoScene, matches: fn(&Animation) -> bool) -> &SceneObject {
        scene
            .objects
            .iter()
            .find(|o| matches(&o.animation))
            .unwrap()
    }

    #[test]
    fn test_spinning_cube_stays_normalized() {
        let mut scene = DemoScene::new(Vector3::new(0.3, 2.0, -1.0), Integrator::Euler);
        for _ in 0..300 {
            scene.update(1.0 / 30.0);
        }
        let cube = find(&scene, |a| matches!(a, Animation::Spin(_)));
        let attitude = cube.transform.attitude();
        assert!((attitude.norm() - 1.0).abs() < 1e-5);
        assert_ne!(attitude, Quaternion::IDENTITY);
    }

    #[test]
    fn test_satellite_follows_origin() {
        let mut scene = DemoScene::new(Vector3::zeros(), Integrator::RungeKutta4);
        scene.update(0.5);
        let satellite = &find(&scene, |a| *a == Animation::Bob).transform;
        assert_eq!(satellite.local_position(), Vector3::new(3.5, 0.0, 0.0));
        assert!((satellite.position().y - satellite.origin().y).abs() < 1e-6);
        assert!(satellite.origin().y.abs() > 0.0);
    }

    #[test]
    fn test_animation_follows_role_not_order() {
        let mut scene = DemoScene::new(Vector3::zeros(), Integrator::Euler);
        scene.objects.reverse();
        let start = find(&scene, |a| *a == Animation::Wander).transform.position();
        scene.update(0.5);

        let pointer = &find(&scene, |a| *a == Animation::Wander).transform;
        assert!((pointer.position() - start).norm() > 0.1);
        assert_eq!(pointer.origin(), Vector3::zeros());

        let grid = find(&scene, |a| *a == Animation::Still);
        assert_eq!(grid.transform.position(), Vector3::new(0.0, -1.5, 0.0));
    }
}
