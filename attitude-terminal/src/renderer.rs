/// ASCII wireframe rasterizer for terminal rendering
use attitude_core::Projection;
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use std::io::Write;

use crate::scene::WireMesh;

/// Depth bands, nearest first, used to tint edges
const DEPTH_COLORS: &[Color] = &[Color::White, Color::Cyan, Color::Grey, Color::DarkGrey];

/// ASCII renderer that converts wire meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Draw every edge of `mesh` through the model-view-projection matrix.
    ///
    /// Edges with an endpoint outside the clip volume are skipped.
    pub fn render_mesh(&mut self, mesh: &WireMesh, mvp: &Matrix4<f32>, projection: &Projection) {
        let projected: Vec<_> = mesh
            .vertices
            .iter()
            .map(|v| {
                projection.project_to_screen(v, mvp, self.width as u32, self.height as u32)
            })
            .collect();

        for &(a, b) in &mesh.edges {
            if let (Some(Some(p0)), Some(Some(p1))) = (projected.get(a), projected.get(b)) {
                self.draw_line(*p0, *p1);
            }
        }
    }

    /// Depth-tested line between two screen points, stepped along the longer axis
    fn draw_line(&mut self, p0: (f32, f32, f32), p1: (f32, f32, f32)) {
        let dx = p1.0 - p0.0;
        let dy = p1.1 - p0.1;
        let character = edge_char(dx, dy);

        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (p0.0 + dx * t).floor();
            let y = (p0.1 + dy * t).floor();
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }

            let depth = p0.2 + (p1.2 - p0.2) * t;
            let idx = y * self.width + x;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = character;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];
                writer.queue(SetForegroundColor(depth_color(self.depth_buffer[idx])))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pick a glyph that follows the on-screen slope of an edge.
///
/// Terminal cells are about twice as tall as wide, which the thresholds
/// account for.
fn edge_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs() * 2.0);
    if ay < ax * 0.4 {
        '-'
    } else if ax < ay * 0.4 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn depth_color(depth: f32) -> Color {
    if !depth.is_finite() {
        return Color::Reset;
    }
    // Perspective depth crowds toward 1.0, so spread the upper range
    let t = ((depth.clamp(-1.0, 1.0) + 1.0) * 0.5).powi(8);
    let band = (t * DEPTH_COLORS.len() as f32) as usize;
    DEPTH_COLORS[band.min(DEPTH_COLORS.len() - 1)]
}
