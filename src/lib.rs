pub mod capture;
pub mod display;
pub mod error;
pub mod frame;
pub mod params;
pub mod pipeline;
pub mod process;
pub mod utils;

use std::path::{Path, PathBuf};
use std::time::Duration;

use capture::frame::PixelFormat;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use frame::Frame;
pub use params::ToneParameters;
pub use pipeline::{PipelineDriver, RunSummary, StopReason};
pub use process::overlay::BlendMode;

use crate::utils::FoundDevice;

/// Name of the optional configuration file looked up in the working directory
pub const CONFIG_BASENAME: &str = "vidtone";

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub capture: CaptureConfig,
    pub display: DisplayConfig,
    pub overlay: OverlayConfig,
    pub params: ParamsConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub device: FoundDevice,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub buffer_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub blend: BlendMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bounded key-poll wait per iteration, also paces the loop
    pub frame_wait_ms: u64,
    pub exit_key: i32,
    /// Stop after this many presented frames (unbounded when unset)
    pub max_frames: Option<u64>,
}

impl PipelineConfig {
    pub fn frame_wait(&self) -> Duration {
        Duration::from_millis(self.frame_wait_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                device: FoundDevice::new("/dev/video0".into(), PixelFormat::Mjpeg),
                width: 800,
                height: 480,
                fps: 30,
                buffer_count: 4,
            },
            display: DisplayConfig {
                title: "Live Output Image".into(),
                width: 800,
                height: 480,
                vsync: false,
            },
            overlay: OverlayConfig {
                path: "Assg05_image.png".into(),
                width: 800,
                height: 480,
                blend: BlendMode::default(),
            },
            params: ParamsConfig {
                path: "Assg05_values.txt".into(),
            },
            pipeline: PipelineConfig {
                frame_wait_ms: 10,
                exit_key: display::ESCAPE_KEY,
                max_frames: None,
            },
        }
    }
}

impl Config {
    /// Layer an optional TOML file over the built-in defaults.
    ///
    /// With no explicit path, `vidtone.toml` in the working directory is used
    /// when present. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_BASENAME).required(false),
        };

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(file)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}
