//! Euler-angle fly camera driven by keyboard and mouse deltas.
//!
//! [`FlyCamera`] keeps `yaw`/`pitch` in degrees and re-derives its
//! `front`/`right`/`up` basis from scratch after every change, so the basis
//! never drifts no matter how many small updates are applied.
//!
//! ```
//! use attitude_core::{CameraConfig, CameraMovement, FlyCamera, View};
//! use nalgebra::Point3;
//!
//! let mut camera = FlyCamera::new(Point3::new(0.0, 0.0, 3.0), CameraConfig::default());
//! camera.process_keyboard(CameraMovement::Forward, 0.016);
//! camera.process_mouse_movement(12.0, -4.0, true);
//! let _view = camera.view_matrix();
//! ```

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::quaternion::Quaternion;

/// Anything that can produce a view matrix for a renderer
pub trait View {
    fn view_matrix(&self) -> Matrix4<f32>;
}

/// Movement directions understood by [`FlyCamera::process_keyboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Construction-time settings for a [`FlyCamera`]. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view
    pub zoom: f32,
    pub world_up: [f32; 3],
    /// Constrained pitch stays within `[-pitch_limit, pitch_limit]`
    pub pitch_limit: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            world_up: [0.0, 1.0, 0.0],
            pitch_limit: 89.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
    pitch_limit: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Point3::origin(), CameraConfig::default())
    }
}

impl FlyCamera {
    pub fn new(position: Point3<f32>, config: CameraConfig) -> Self {
        let world_up = Vector3::from(config.world_up);
        let world_up = world_up.try_normalize(f32::EPSILON).unwrap_or_else(|| {
            log::warn!("camera world up {:?} is degenerate, using +Y", config.world_up);
            Vector3::y()
        });
        let (pitch_limit, min_zoom, max_zoom) = checked_limits(&config);

        let mut camera = Self {
            position,
            front: -Vector3::z(),
            up: Vector3::y(),
            right: Vector3::x(),
            world_up,
            yaw: config.yaw,
            pitch: config.pitch,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom: config.zoom.clamp(min_zoom, max_zoom),
            pitch_limit,
            min_zoom,
            max_zoom,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn world_up(&self) -> Vector3<f32> {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set both angles (degrees) and rebuild the basis. Pitch is clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self.update_camera_vectors();
    }

    /// Move along the camera basis by `movement_speed * dt`
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        let offset = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Left => -self.right,
            CameraMovement::Right => self.right,
            CameraMovement::Up => self.up,
            CameraMovement::Down => -self.up,
        };
        self.position += offset * velocity;
    }

    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        if constrain_pitch {
            let clamped = self.pitch.clamp(-self.pitch_limit, self.pitch_limit);
            if clamped != self.pitch {
                log::trace!("pitch {} clamped to {}", self.pitch, clamped);
            }
            self.pitch = clamped;
        }

        self.update_camera_vectors();
    }

    /// Scrolling up narrows the field of view
    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = (self.zoom - yoffset).clamp(self.min_zoom, self.max_zoom);
    }

    /// Perspective projection using `zoom` as the vertical field of view
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, self.zoom.to_radians(), near, far)
    }

    /// Current basis as an orientation: right, up and back become the
    /// rotated `+X`, `+Y` and `+Z` axes.
    pub fn attitude(&self) -> Quaternion {
        let basis = Matrix3::from_columns(&[self.right, self.up, -self.front]);
        Quaternion::from_rotation_matrix3_unchecked(&basis).normalized()
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        )
        .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

/// Pitch limit and zoom range usable as `clamp` bounds.
///
/// A negative pitch limit is mirrored and a reversed zoom range is swapped.
/// Non-finite values fall back to the defaults.
fn checked_limits(config: &CameraConfig) -> (f32, f32, f32) {
    let defaults = CameraConfig::default();

    let pitch_limit = if config.pitch_limit.is_finite() {
        config.pitch_limit.abs()
    } else {
        log::warn!("camera pitch limit {} is not finite, using {}", config.pitch_limit, defaults.pitch_limit);
        defaults.pitch_limit
    };

    let (min_zoom, max_zoom) = if !config.min_zoom.is_finite() || !config.max_zoom.is_finite() {
        log::warn!(
            "camera zoom range [{}, {}] is not finite, using [{}, {}]",
            config.min_zoom, config.max_zoom, defaults.min_zoom, defaults.max_zoom
        );
        (defaults.min_zoom, defaults.max_zoom)
    } else if config.min_zoom > config.max_zoom {
        log::warn!("camera zoom range [{}, {}] is reversed", config.min_zoom, config.max_zoom);
        (config.max_zoom, config.min_zoom)
    } else {
        (config.min_zoom, config.max_zoom)
    };

    (pitch_limit, min_zoom, max_zoom)
}

impl View for FlyCamera {
    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &(self.position + self.front), &self.up)
    }
}
