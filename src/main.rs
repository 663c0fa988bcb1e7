//! vidtone: live tone-adjusted camera view with overlay and FPS readout

use std::sync::Arc;

use color_eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use vidtone::capture::V4l2Capture;
use vidtone::display::Sdl2Display;
use vidtone::params::{FileParamReader, ParameterSource};
use vidtone::process::fps::MonotonicClock;
use vidtone::process::overlay::Overlay;
use vidtone::{utils, Config, PipelineDriver};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidtone=info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_timer(fmt::time::uptime()));

    #[cfg(feature = "profiling")]
    let registry = registry.with(tracing_tracy::TracyLayer::default());

    registry.init();
}

fn main() -> Result<()> {
    // Initialize error handling and logging
    color_eyre::install()?;
    init_tracing();

    info!("vidtone launching...");

    let mut config = Config::load(None)?;

    // Auto-detect capture device if needed
    if config.capture.device.path.is_empty() {
        config.capture.device = utils::auto_detect_device()?;
    }
    info!("Using capture device: {:?}", config.capture.device);

    // Fatal: no partial run without a device
    let capture = V4l2Capture::open(config.capture.clone())?;

    // Degraded: the run continues without compositing
    let overlay_size = (config.overlay.width, config.overlay.height);
    let overlay = match Overlay::load(&config.overlay.path, overlay_size) {
        Ok(overlay) => Some(Arc::new(overlay)),
        Err(e) => {
            warn!(
                "Overlay image {} not loaded: {}",
                config.overlay.path.display(),
                e
            );
            None
        }
    };

    let display = Sdl2Display::new(&config.display)?;
    let params = ParameterSource::new(FileParamReader::new(&config.params.path));

    let driver = PipelineDriver::new(
        capture,
        display,
        params,
        overlay,
        config.overlay.blend,
        MonotonicClock::new(),
        config.pipeline.clone(),
    )?;
    let summary = driver.run()?;

    info!(
        "vidtone shutting down after {} frames ({:?})",
        summary.frames_presented, summary.stop_reason
    );
    Ok(())
}
