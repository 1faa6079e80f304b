/// Terminal front end: feeds key and mouse deltas into the camera math and
/// draws the resulting view as ASCII wireframe
use anyhow::Context;
use attitude_core::{CameraMovement, FlyCamera, Projection, Transformable, View};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;
pub mod scene;

pub use config::{Args, DemoConfig, Integrator};
pub use renderer::AsciiRenderer;
pub use scene::{DemoScene, SceneObject, WireMesh};

/// Degrees turned per arrow key press
const ARROW_LOOK_STEP: f32 = 5.0;
/// Rows reserved for the status line
const HUD_ROWS: u16 = 1;

/// Which view drives the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Keyboard/mouse controlled fly camera
    Fly,
    /// Transformable rig circling the scene and looking at its center
    Orbit,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    config: DemoConfig,
    scene: DemoScene,
    camera: FlyCamera,
    rig: Transformable,
    orbit_angle: f32,
    mode: ViewMode,
    projection: Projection,
    renderer: AsciiRenderer,
    running: bool,
    last_mouse: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: DemoConfig) -> anyhow::Result<Self> {
        let (width, height) = terminal::size().context("Failed to query terminal size")?;
        Ok(Self::with_size(config, width, height))
    }

    /// Build the app for a terminal of `width` x `height` cells
    pub fn with_size(config: DemoConfig, width: u16, height: u16) -> Self {
        let rows = height.saturating_sub(HUD_ROWS).max(1);

        let camera = FlyCamera::new(Point3::from(config.start), config.camera);
        let scene = DemoScene::new(Vector3::from(config.spin), config.integrator);

        let mut rig = Transformable::from_position(Vector3::new(0.0, 3.0, 9.0));
        rig.look_at(&Vector3::zeros(), &Vector3::y());

        Self {
            config,
            scene,
            camera,
            rig,
            orbit_angle: 0.0,
            mode: ViewMode::Fly,
            // Cells are roughly twice as tall as wide
            projection: Projection::new(width as u32, rows as u32 * 2),
            renderer: AsciiRenderer::new(width as usize, rows as usize),
            running: true,
            last_mouse: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.fps.max(1) as u64);
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();
            let dt = (frame_start - previous).as_secs_f32();
            previous = frame_start;

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event, dt.max(target_frame_time.as_secs_f32()));
            }

            self.update(dt);
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Translate one terminal event into camera input
    pub fn handle_event(&mut self, event: Event, dt: f32) {
        match event {
            Event::Key(key) => self.handle_key(key, dt),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent, dt: f32) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') => self.camera.process_keyboard(CameraMovement::Forward, dt),
            KeyCode::Char('s') => self.camera.process_keyboard(CameraMovement::Backward, dt),
            KeyCode::Char('a') => self.camera.process_keyboard(CameraMovement::Left, dt),
            KeyCode::Char('d') => self.camera.process_keyboard(CameraMovement::Right, dt),
            KeyCode::Char(' ') => self.camera.process_keyboard(CameraMovement::Up, dt),
            KeyCode::Char('c') => self.camera.process_keyboard(CameraMovement::Down, dt),
            KeyCode::Left => self.look(-ARROW_LOOK_STEP, 0.0),
            KeyCode::Right => self.look(ARROW_LOOK_STEP, 0.0),
            KeyCode::Up => self.look(0.0, ARROW_LOOK_STEP),
            KeyCode::Down => self.look(0.0, -ARROW_LOOK_STEP),
            KeyCode::Char('+') => self.camera.process_mouse_scroll(1.0),
            KeyCode::Char('-') => self.camera.process_mouse_scroll(-1.0),
            KeyCode::Char('v') => {
                self.mode = match self.mode {
                    ViewMode::Fly => ViewMode::Orbit,
                    ViewMode::Orbit => ViewMode::Fly,
                };
                log::info!("switched view to {:?}", self.mode);
            }
            KeyCode::Char('r') => {
                self.camera = FlyCamera::new(Point3::from(self.config.start), self.config.camera);
            }
            _ => {}
        }
    }

    /// Arrow keys look around in degrees regardless of mouse sensitivity
    fn look(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        let sensitivity = self.camera.mouse_sensitivity;
        if sensitivity.abs() < f32::EPSILON {
            return;
        }
        self.camera
            .process_mouse_movement(yaw_degrees / sensitivity, pitch_degrees / sensitivity, true);
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.last_mouse = Some((column, row)),
            MouseEventKind::Up(MouseButton::Left) => self.last_mouse = None,
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((x, y)) = self.last_mouse {
                    let xoffset = column as f32 - x as f32;
                    // Rows grow downwards
                    let yoffset = y as f32 - row as f32;
                    self.camera.process_mouse_movement(xoffset, yoffset, true);
                }
                self.last_mouse = Some((column, row));
            }
            MouseEventKind::ScrollUp => self.camera.process_mouse_scroll(1.0),
            MouseEventKind::ScrollDown => self.camera.process_mouse_scroll(-1.0),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(HUD_ROWS).max(1);
        self.renderer.resize(width as usize, rows as usize);
        self.projection.resize(width as u32, rows as u32 * 2);
    }

    fn update(&mut self, dt: f32) {
        self.scene.update(dt);

        // Circle the rig around the scene center
        self.orbit_angle += dt * 0.3;
        let radius = 9.0;
        self.rig.set_local_position(Vector3::new(
            self.orbit_angle.sin() * radius,
            3.0,
            self.orbit_angle.cos() * radius,
        ));
        let center = self.rig.origin();
        self.rig.look_at(&center, &Vector3::y());
    }

    /// View and projection for the active mode
    pub fn view_projection(&self) -> Matrix4<f32> {
        let view = match self.mode {
            ViewMode::Fly => self.camera.view_matrix(),
            ViewMode::Orbit => self.rig.view_matrix(),
        };
        self.projection.matrix(self.camera.zoom()) * view
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let view_projection = self.view_projection();

        self.renderer.clear();
        for object in &self.scene.objects {
            let mvp = view_projection * object.transform.matrix();
            self.renderer.render_mesh(&object.mesh, &mvp, &self.projection);
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, HUD_ROWS))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let position = self.camera.position();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{:?} | FPS {:.1} | pos ({:.1}, {:.1}, {:.1}) yaw {:.0} pitch {:.0} fov {:.0} | WASD/Space/C move, drag/arrows look, scroll zoom, V view, R reset, Q quit",
                self.mode,
                self.fps,
                position.x,
                position.y,
                position.z,
                self.camera.yaw(),
                self.camera.pitch(),
                self.camera.zoom(),
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn app() -> TerminalApp {
        TerminalApp::with_size(DemoConfig::default(), 80, 25)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_forward_key_moves_camera() {
        let mut app = app();
        let start = app.camera().position();
        app.handle_event(key('w'), 0.5);
        let moved = app.camera().position() - start;
        assert!((moved - app.camera().front() * 1.25).norm() < 1e-5);
    }

    #[test]
    fn test_drag_turns_camera() {
        let mut app = app();
        let yaw = app.camera().yaw();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10), 0.0);
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 13, 9), 0.0);

        let sensitivity = DemoConfig::default().camera.mouse_sensitivity;
        assert!((app.camera().yaw() - (yaw + 3.0 * sensitivity)).abs() < 1e-4);
        assert!((app.camera().pitch() - sensitivity).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_zooms_within_bounds() {
        let mut app = app();
        for _ in 0..100 {
            app.handle_event(mouse(MouseEventKind::ScrollUp, 0, 0), 0.0);
        }
        assert_eq!(app.camera().zoom(), 1.0);
    }

    #[test]
    fn test_view_toggle_and_quit() {
        let mut app = app();
        assert_eq!(app.mode(), ViewMode::Fly);
        app.handle_event(key('v'), 0.0);
        assert_eq!(app.mode(), ViewMode::Orbit);
        app.update(0.1);
        assert!(app.view_projection().iter().all(|v| v.is_finite()));

        app.handle_event(key('q'), 0.0);
        assert!(!app.running);
    }

    #[test]
    fn test_resize_rebuilds_buffers() {
        let mut app = app();
        app.handle_event(Event::Resize(40, 11), 0.0);
        assert_eq!(app.renderer.width(), 40);
        assert_eq!(app.renderer.height(), 10);
    }
}
