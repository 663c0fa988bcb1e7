//! V4L2 capture with memory-mapped buffers

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info, instrument};
use v4l::buffer::Type;
use v4l::capability::Flags as CapFlags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::capture::Parameters;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::decoder;
use super::frame::{FrameMetadata, PixelFormat, RawFrame};
use super::FrameSource;
use crate::{CaptureConfig, Error, Frame, Result};

/// V4L2 capture device.
///
/// The stream is declared before the device so it is unmapped first on drop.
pub struct V4l2Capture {
    stream: Option<MmapStream<'static>>,
    device: Box<Device>,
    config: CaptureConfig,
    width: u32,
    height: u32,
    format: PixelFormat,
    sequence: u64,
}

impl V4l2Capture {
    /// Open the device, negotiate format and start streaming
    #[instrument(skip(config), fields(device = %config.device.path))]
    pub fn open(config: CaptureConfig) -> Result<Self> {
        let not_opened =
            |e: std::io::Error| Error::DeviceNotOpened(format!("{}: {}", config.device.path, e));

        let device = Device::with_path(&config.device.path).map_err(not_opened)?;

        let caps = device.query_caps().map_err(not_opened)?;
        info!("Device: {} ({})", caps.card, caps.driver);

        if !caps.capabilities.contains(CapFlags::VIDEO_CAPTURE) {
            return Err(Error::DeviceNotOpened(format!(
                "{} doesn't support video capture",
                config.device.path
            )));
        }

        let mut fmt = device.format().map_err(not_opened)?;
        fmt.width = config.width;
        fmt.height = config.height;
        fmt.fourcc = FourCC::new(&config.device.format.fourcc());
        let fmt = device.set_format(&fmt).map_err(not_opened)?;

        // The driver may round geometry or substitute a format it prefers
        let format = PixelFormat::from_fourcc(&fmt.fourcc.repr).ok_or_else(|| {
            Error::DeviceNotOpened(format!("driver selected unsupported format {}", fmt.fourcc))
        })?;
        info!(
            "Negotiated {}x{} {:?} (requested {}x{} {:?})",
            fmt.width, fmt.height, format, config.width, config.height, config.device.format
        );

        if let Err(e) = device.set_params(&Parameters::with_fps(config.fps)) {
            debug!("Driver rejected frame interval: {}", e);
        }

        let mut capture = Self {
            stream: None,
            device: Box::new(device),
            width: fmt.width,
            height: fmt.height,
            format,
            config,
            sequence: 0,
        };
        capture.start_stream()?;
        Ok(capture)
    }

    /// Start streaming with memory-mapped buffers
    fn start_stream(&mut self) -> Result<()> {
        let stream =
            MmapStream::with_buffers(&self.device, Type::VideoCapture, self.config.buffer_count)
                .map_err(|e| Error::DeviceNotOpened(format!("stream setup failed: {}", e)))?;

        self.stream = Some(stream);
        info!(
            "Capture stream started with {} buffers",
            self.config.buffer_count
        );
        Ok(())
    }

    /// Dequeue one raw device buffer
    pub fn capture_raw(&mut self) -> Result<RawFrame> {
        let timestamp = Instant::now();

        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::Capture("stream not started".into()))?;

        let (buf, meta) = stream.next().map_err(|e| Error::Capture(e.to_string()))?;
        let used = (meta.bytesused as usize).min(buf.len());
        let data = Bytes::copy_from_slice(&buf[..used]);

        self.sequence += 1;

        let frame_meta = Arc::new(FrameMetadata {
            sequence: self.sequence,
            width: self.width,
            height: self.height,
            format: self.format,
        });

        Ok(RawFrame {
            data,
            meta: frame_meta,
            timestamp,
        })
    }
}

impl FrameSource for V4l2Capture {
    fn is_opened(&self) -> bool {
        self.stream.is_some()
    }

    fn geometry(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read(&mut self) -> Result<Frame> {
        let raw = self.capture_raw()?;
        let image = decoder::decode_frame(&raw)?;
        Ok(Frame {
            image,
            sequence: raw.meta.sequence,
            captured_at: raw.timestamp,
        })
    }
}

impl Drop for V4l2Capture {
    fn drop(&mut self) {
        self.stream.take();
        info!("Released capture device {}", self.config.device.path);
    }
}
