//! Single-threaded capture → process → present loop

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, trace};

use crate::capture::FrameSource;
use crate::display::FrameSink;
use crate::params::{ParamReader, ParameterSource};
use crate::process::annotate::annotate_fps;
use crate::process::fps::{Clock, FrameRateMeter};
use crate::process::overlay::{BlendMode, Overlay, OverlayCompositor};
use crate::process::tone;
use crate::{Error, Frame, PipelineConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Running,
    Capturing,
    Processing,
    Presenting,
    Terminating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The exit key was pressed
    ExitKey,
    /// The source failed to deliver a frame
    CaptureFailed,
    /// `max_frames` frames were presented
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames_presented: u64,
    pub stop_reason: StopReason,
    pub last_fps: f64,
}

/// Owns the device and display for the lifetime of the run.
///
/// Field order matters: on drop the source is released before the sink.
pub struct PipelineDriver<S, D, R, C> {
    source: S,
    sink: D,
    params: ParameterSource<R>,
    compositor: OverlayCompositor,
    meter: FrameRateMeter<C>,
    config: PipelineConfig,
    state: PipelineState,
}

impl<S, D, R, C> PipelineDriver<S, D, R, C>
where
    S: FrameSource,
    D: FrameSink,
    R: ParamReader,
    C: Clock,
{
    /// Validate the source and the overlay fit once, and start the frame clock
    pub fn new(
        source: S,
        sink: D,
        params: ParameterSource<R>,
        overlay: Option<Arc<Overlay>>,
        blend: BlendMode,
        clock: C,
        config: PipelineConfig,
    ) -> Result<Self> {
        if !source.is_opened() {
            drop(source);
            drop(sink);
            return Err(Error::DeviceNotOpened("source reports closed".into()));
        }

        let geometry = source.geometry();
        let compositor = OverlayCompositor::new(overlay, geometry, blend);
        info!(
            "Pipeline ready: {}x{} frames, overlay {}, key wait {:?}",
            geometry.0,
            geometry.1,
            if compositor.is_enabled() { "on" } else { "off" },
            config.frame_wait()
        );

        Ok(Self {
            source,
            sink,
            params,
            compositor,
            meter: FrameRateMeter::new(clock),
            config,
            state: PipelineState::Initializing,
        })
    }

    pub fn compositor(&self) -> &OverlayCompositor {
        &self.compositor
    }

    /// Run until the exit key, a capture failure or the frame limit, then
    /// release the source and the sink in that order on every path.
    pub fn run(mut self) -> Result<RunSummary> {
        self.transition(PipelineState::Running);
        let outcome = self.run_loop();
        self.shutdown();
        outcome
    }

    fn run_loop(&mut self) -> Result<RunSummary> {
        let mut frames_presented = 0u64;

        let stop_reason = loop {
            if self
                .config
                .max_frames
                .is_some_and(|limit| frames_presented >= limit)
            {
                break StopReason::FrameLimit;
            }

            self.transition(PipelineState::Capturing);
            let captured = match self.source.read() {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Failed to read from capture source: {}", e);
                    break StopReason::CaptureFailed;
                }
            };

            self.transition(PipelineState::Processing);
            let started = Instant::now();
            let output = self.process(&captured);
            metrics::histogram!("frame_process_time_us")
                .record(started.elapsed().as_micros() as f64);

            self.transition(PipelineState::Presenting);
            self.sink.present(&output)?;
            frames_presented += 1;
            metrics::counter!("frames_presented").increment(1);

            if let Some(key) = self.sink.poll_key(self.config.frame_wait())? {
                debug!("Key {} pressed", key);
                if key == self.config.exit_key {
                    break StopReason::ExitKey;
                }
            }
            self.transition(PipelineState::Running);
        };

        info!(
            "Loop finished after {} frames: {:?}",
            frames_presented, stop_reason
        );

        Ok(RunSummary {
            frames_presented,
            stop_reason,
            last_fps: self.meter.current(),
        })
    }

    /// Refresh parameters, tone-adjust a copy, composite, measure and annotate
    pub fn process(&mut self, captured: &Frame) -> Frame {
        let params = self.params.refresh();
        let mut output = tone::apply(captured, params);
        self.compositor.composite(&mut output);

        let fps = self.meter.tick();
        metrics::gauge!("pipeline_fps").set(fps);
        annotate_fps(&mut output, fps);

        trace!(
            "frame {} brightness={} contrast={} fps={:.2}",
            output.sequence,
            params.brightness,
            params.contrast,
            fps
        );
        output
    }

    fn transition(&mut self, next: PipelineState) {
        trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn shutdown(mut self) {
        self.transition(PipelineState::Terminating);
        let Self { source, sink, .. } = self;
        drop(source);
        drop(sink);
        info!("Capture and display released");
    }
}
