/// Attitude Web - WASM bindings for the camera and orientation math
///
/// Matrices cross the boundary as column-major `Float32Array`s, ready to be
/// uploaded as WebGL/WebGPU uniforms.

use attitude_core::{CameraConfig, CameraMovement, FlyCamera, Quaternion, View};
use nalgebra::{Matrix4, Point3, Vector3};
use wasm_bindgen::prelude::*;

fn to_column_major(m: &Matrix4<f32>) -> Vec<f32> {
    m.as_slice().to_vec()
}

fn parse_movement(direction: &str) -> Result<CameraMovement, JsValue> {
    match direction {
        "forward" => Ok(CameraMovement::Forward),
        "backward" => Ok(CameraMovement::Backward),
        "left" => Ok(CameraMovement::Left),
        "right" => Ok(CameraMovement::Right),
        "up" => Ok(CameraMovement::Up),
        "down" => Ok(CameraMovement::Down),
        other => Err(JsValue::from_str(&format!(
            "unknown camera movement {other:?}"
        ))),
    }
}

/// Fly camera driven from JS input handlers
#[wasm_bindgen]
pub struct WebCamera {
    camera: FlyCamera,
}

#[wasm_bindgen]
impl WebCamera {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f32, y: f32, z: f32) -> WebCamera {
        WebCamera {
            camera: FlyCamera::new(Point3::new(x, y, z), CameraConfig::default()),
        }
    }

    /// Move in `direction` ("forward", "backward", "left", "right", "up", "down")
    pub fn process_keyboard(&mut self, direction: &str, dt: f32) -> Result<(), JsValue> {
        let movement = parse_movement(direction)?;
        self.camera.process_keyboard(movement, dt);
        Ok(())
    }

    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.camera
            .process_mouse_movement(xoffset, yoffset, constrain_pitch);
    }

    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.camera.process_mouse_scroll(yoffset);
    }

    pub fn view_matrix(&self) -> Vec<f32> {
        to_column_major(&self.camera.view_matrix())
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Result<Vec<f32>, JsValue> {
        if !(aspect > 0.0 && near > 0.0 && far > near) {
            return Err(JsValue::from_str(
                "projection needs aspect > 0 and 0 < near < far",
            ));
        }
        Ok(to_column_major(
            &self.camera.projection_matrix(aspect, near, far),
        ))
    }

    /// Camera position as `[x, y, z]`
    pub fn position(&self) -> Vec<f32> {
        self.camera.position().coords.as_slice().to_vec()
    }

    pub fn yaw(&self) -> f32 {
        self.camera.yaw()
    }

    pub fn pitch(&self) -> f32 {
        self.camera.pitch()
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom()
    }
}

/// Orientation advanced by a constant body rate, for spinning models
#[wasm_bindgen]
pub struct WebOrientation {
    attitude: Quaternion,
    angular_velocity: Quaternion,
}

#[wasm_bindgen]
impl WebOrientation {
    /// Start at identity spinning at `(wx, wy, wz)` rad/s in the body frame
    #[wasm_bindgen(constructor)]
    pub fn new(wx: f32, wy: f32, wz: f32) -> WebOrientation {
        WebOrientation {
            attitude: Quaternion::IDENTITY,
            angular_velocity: Quaternion::pure(&Vector3::new(wx, wy, wz)),
        }
    }

    pub fn set_angular_velocity(&mut self, wx: f32, wy: f32, wz: f32) {
        self.angular_velocity = Quaternion::pure(&Vector3::new(wx, wy, wz));
    }

    /// Advance one RK4 step of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.attitude
            .integrate_runge_kutta4(&self.angular_velocity, dt, true);
    }

    /// Rotate about a (not necessarily unit) world axis by `angle` radians
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        let Some(axis) = Vector3::new(x, y, z).try_normalize(f32::EPSILON) else {
            return;
        };
        let q = Quaternion::rotation(angle, &axis);
        self.attitude = (q * self.attitude).normalized();
    }

    /// Quaternion as `[a, b, c, d]` (scalar first)
    pub fn quaternion(&self) -> Vec<f32> {
        let q = self.attitude;
        vec![q.a, q.b, q.c, q.d]
    }

    /// Rotation as a column-major 4x4 model matrix
    pub fn matrix(&self) -> Vec<f32> {
        to_column_major(&self.attitude.to_matrix())
    }

    /// Replace the orientation from a column-major 4x4 rotation matrix
    pub fn set_matrix(&mut self, values: &[f32]) -> Result<(), JsValue> {
        if values.len() != 16 {
            return Err(JsValue::from_str("expected 16 matrix elements"));
        }
        let m = Matrix4::from_column_slice(values);
        self.attitude =
            Quaternion::from_matrix(&m).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_names() {
        assert_eq!(parse_movement("left").ok(), Some(CameraMovement::Left));
        assert_eq!(parse_movement("down").ok(), Some(CameraMovement::Down));
    }

    #[test]
    fn test_camera_view_is_column_major() {
        let camera = WebCamera::new(1.0, 2.0, 3.0);
        let view = camera.view_matrix();
        assert_eq!(view.len(), 16);
        // Translation lives in the last column
        let m = camera.camera.view_matrix();
        assert_eq!(view[12], m[(0, 3)]);
        assert_eq!(view[13], m[(1, 3)]);
    }

    #[test]
    fn test_orientation_matrix_roundtrip() {
        let mut orientation = WebOrientation::new(0.0, 1.0, 0.0);
        for _ in 0..10 {
            orientation.step(0.1);
        }
        let before = orientation.quaternion();
        let m = orientation.matrix();
        orientation.set_matrix(&m).ok();
        let after = orientation.quaternion();

        let same: f32 = before.iter().zip(&after).map(|(a, b)| (a - b).abs()).sum();
        let flipped: f32 = before.iter().zip(&after).map(|(a, b)| (a + b).abs()).sum();
        assert!(same.min(flipped) < 1e-4);
    }

    #[test]
    fn test_rotate_about_world_axis() {
        let mut orientation = WebOrientation::new(0.0, 0.0, 0.0);
        orientation.rotate(std::f32::consts::PI, 0.0, 0.0, 2.0);
        let q = orientation.quaternion();
        assert!(q[0].abs() < 1e-5);
        assert!((q[3].abs() - 1.0).abs() < 1e-5);
    }
}
