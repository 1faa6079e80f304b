/// Command line and TOML configuration for the terminal demo
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use attitude_core::CameraConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Default)]
#[command(name = "attitude-terminal", version, about = "Fly through a wireframe scene in the terminal")]
pub struct Args {
    /// TOML file with a `[camera]` table and demo settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Camera movement speed in units per second
    #[arg(long)]
    pub speed: Option<f32>,

    /// Degrees of turn per mouse cell
    #[arg(long)]
    pub sensitivity: Option<f32>,

    /// Spin the cube with explicit Euler steps instead of RK4
    #[arg(long)]
    pub euler: bool,
}

/// Integration scheme for spinning objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    Euler,
    #[default]
    RungeKutta4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub fps: u32,
    /// Initial camera position
    pub start: [f32; 3],
    /// Body-frame angular velocity of the spinning cube, rad/s
    pub spin: [f32; 3],
    pub integrator: Integrator,
    pub camera: CameraConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            start: [0.0, 1.0, 8.0],
            spin: [0.4, 1.1, 0.2],
            integrator: Integrator::RungeKutta4,
            camera: CameraConfig {
                // Terminal mouse deltas are whole cells, much coarser than pixels
                mouse_sensitivity: 2.0,
                ..CameraConfig::default()
            },
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = toml::from_str(text)?;
        anyhow::ensure!(config.fps > 0, "fps must be positive");
        anyhow::ensure!(
            config.camera.pitch_limit.is_finite() && config.camera.pitch_limit >= 0.0,
            "camera.pitch_limit must be a non-negative number of degrees"
        );
        anyhow::ensure!(
            config.camera.min_zoom <= config.camera.max_zoom,
            "camera.min_zoom must not exceed camera.max_zoom"
        );
        Ok(config)
    }

    /// Load the file named by `--config` (if any), then apply flag overrides
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(fps) = args.fps {
            anyhow::ensure!(fps > 0, "--fps must be positive");
            config.fps = fps;
        }
        if let Some(speed) = args.speed {
            config.camera.movement_speed = speed;
        }
        if let Some(sensitivity) = args.sensitivity {
            config.camera.mouse_sensitivity = sensitivity;
        }
        if args.euler {
            config.integrator = Integrator::Euler;
        }

        log::debug!("demo config: {:?}", config);
        Ok(config)
    }
}
