/// Projection matrices and screen mapping for a view
use nalgebra::{Matrix4, Point3};

use crate::quaternion::EPSILON;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Perspective,
}

/// Viewport-side projection settings; the field of view comes from the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Visible height of the orthographic volume
    pub ortho_height: f32,
    pub mode: ProjectionMode,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            near: 0.1,
            far: 100.0,
            ortho_height: 10.0,
            mode: ProjectionMode::Perspective,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Projection matrix for a vertical field of view in degrees
    pub fn matrix(&self, fovy_degrees: f32) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, fovy_degrees.to_radians(), self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = self.ortho_height;
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a point through a model-view-projection matrix to screen space.
    ///
    /// Returns `(x, y, depth)` with `y` growing downwards, or `None` for points
    /// behind the eye or outside the clip volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        mvp: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w < EPSILON {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&ndc_x)
            || !(-1.0..=1.0).contains(&ndc_y)
            || !(-1.0..=1.0).contains(&depth)
        {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
