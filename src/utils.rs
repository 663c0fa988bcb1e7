use crate::capture::frame::PixelFormat;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use v4l::{capability::Flags, video::Capture, Device};

// Detected capture device info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundDevice {
    pub path: String,
    pub format: PixelFormat,
}

impl FoundDevice {
    pub fn new(path: String, format: PixelFormat) -> Self {
        Self { path, format }
    }
}

/// Auto-detect the first capture device offering a format we can decode
pub fn auto_detect_device() -> Result<FoundDevice> {
    use std::path::Path;

    info!("Auto-detecting capture devices...");

    for i in 0..10 {
        let path = format!("/dev/video{}", i);
        if !Path::new(&path).exists() {
            continue;
        }

        let Ok(dev) = Device::with_path(&path) else {
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            continue;
        }

        if let Ok(formats) = dev.enum_formats() {
            // Formats are listed in driver preference order
            for fmt in formats {
                if let Some(format) = PixelFormat::from_fourcc(&fmt.fourcc.repr) {
                    info!("Found {:?} device: {} - {}", format, path, caps.card);
                    return Ok(FoundDevice { path, format });
                }
            }
        }
    }

    Err(Error::DeviceNotOpened("no suitable capture device found".into()))
}
