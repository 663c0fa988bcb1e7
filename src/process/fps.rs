//! Instantaneous frame rate from successive monotonic ticks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic tick counter
pub trait Clock {
    fn ticks(&self) -> u64;

    /// Ticks per second
    fn frequency(&self) -> f64;
}

/// Nanosecond ticks since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn ticks(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn frequency(&self) -> f64 {
        1e9
    }
}

/// Hand-driven clock; clones share the same counter
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    frequency: f64,
}

impl ManualClock {
    pub fn new(frequency: f64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            frequency,
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::Relaxed);
    }

    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn frequency(&self) -> f64 {
        self.frequency
    }
}

/// Unsmoothed FPS meter.
///
/// The first reading spans construction to the first frame.
#[derive(Debug)]
pub struct FrameRateMeter<C> {
    clock: C,
    previous: u64,
    current: f64,
}

impl<C: Clock> FrameRateMeter<C> {
    pub fn new(clock: C) -> Self {
        let previous = clock.ticks();
        Self {
            clock,
            previous,
            current: 0.0,
        }
    }

    /// `frequency / (now - previous)`; a zero interval repeats the last reading
    pub fn tick(&mut self) -> f64 {
        let now = self.clock.ticks();
        let elapsed = now.saturating_sub(self.previous);
        self.previous = now;

        if elapsed > 0 {
            self.current = self.clock.frequency() / elapsed as f64;
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

/// `"FPS: "` followed by the first four characters of the fixed six-decimal value
pub fn format_fps(fps: f64) -> String {
    let value = format!("{:.6}", fps);
    let head: String = value.chars().take(4).collect();
    format!("FPS: {}", head)
}
