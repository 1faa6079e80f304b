/// Attitude Core Library - orientation, transform and camera math
///
/// This library provides the value-type math used to drive cameras and scene
/// nodes: a Hamilton quaternion with matrix conversions and integrators, a
/// transformable with world/local mutation, and an Euler-angle fly camera.

pub mod camera;
pub mod error;
pub mod projection;
pub mod quaternion;
pub mod transform;

// Re-export commonly used types
pub use camera::{CameraConfig, CameraMovement, FlyCamera, View};
pub use error::{MathError, Result};
pub use projection::{Projection, ProjectionMode};
pub use quaternion::Quaternion;
pub use transform::{Space, Transformable};
