/// Attitude Terminal Demo - Fly Camera
///
/// Flies an Euler-angle camera through a small wireframe scene.
/// Controls:
///   - WASD: Move, Space/C: Up/Down
///   - Mouse drag / Arrow Keys: Look around
///   - Scroll / +/-: Zoom
///   - V: Toggle orbiting rig view, R: Reset camera
///   - Q/ESC: Quit

use attitude_terminal::{Args, DemoConfig, TerminalApp};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Warning: Could not initialize logger: {}", e);
    }

    let args = Args::parse();
    let config = DemoConfig::from_args(&args)?;
    log::info!(
        "starting at {:?} with {:?} integration at {} fps",
        config.start,
        config.integrator,
        config.fps
    );

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_millis(500));

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    println!("Thank you for using the Attitude terminal demo!");
    Ok(())
}
