//! Tone parameters reloaded from an externally written two-line source.
//!
//! The source holds the brightness offset on line one and the contrast scale
//! on line two. It is re-read every frame; anything unreadable or malformed
//! leaves the last good values in force.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

/// Contrast value that maps to a scale of 1.0
pub const NEUTRAL_CONTRAST: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneParameters {
    pub brightness: i32,
    pub contrast: i32,
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: NEUTRAL_CONTRAST,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("expected two lines, found {0}")]
    MissingLine(usize),

    #[error("line {line}: {value:?} is not a base-10 integer")]
    NotAnInteger { line: usize, value: String },
}

impl ToneParameters {
    pub fn new(brightness: i32, contrast: i32) -> Self {
        Self {
            brightness,
            contrast,
        }
    }

    /// Parse the first two lines of `text`; later lines are ignored
    pub fn parse(text: &str) -> Result<Self, ParamError> {
        let mut lines = text.lines();
        let mut field = |line: usize| -> Result<i32, ParamError> {
            let raw = lines.next().ok_or(ParamError::MissingLine(line - 1))?;
            let value = raw.trim();
            value.parse().map_err(|_| ParamError::NotAnInteger {
                line,
                value: value.to_owned(),
            })
        };

        let brightness = field(1)?;
        let contrast = field(2)?;
        Ok(Self::new(brightness, contrast))
    }

    /// Multiplier applied to every channel
    pub fn contrast_scale(&self) -> f32 {
        self.contrast as f32 / NEUTRAL_CONTRAST as f32
    }

    /// Additive offset in output pixel units
    pub fn brightness_offset(&self) -> f32 {
        self.brightness as f32
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Renders the two-line source format
impl fmt::Display for ToneParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.brightness)?;
        writeln!(f, "{}", self.contrast)
    }
}

/// Where the raw parameter text comes from
pub trait ParamReader {
    fn read_source(&mut self) -> io::Result<String>;
}

/// Opens, reads and closes the file on every call
#[derive(Debug, Clone)]
pub struct FileParamReader {
    path: PathBuf,
}

impl FileParamReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParamReader for FileParamReader {
    fn read_source(&mut self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// In-memory source; `None` behaves like a missing file
#[derive(Debug, Clone, Default)]
pub struct MemoryParamReader {
    pub contents: Option<String>,
}

impl MemoryParamReader {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { contents: None }
    }

    pub fn set(&mut self, contents: impl Into<String>) {
        self.contents = Some(contents.into());
    }
}

impl ParamReader for MemoryParamReader {
    fn read_source(&mut self) -> io::Result<String> {
        self.contents
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "parameter source unavailable"))
    }
}

/// Holds the last good parameters and refreshes them from a reader
#[derive(Debug)]
pub struct ParameterSource<R> {
    reader: R,
    current: ToneParameters,
}

impl<R: ParamReader> ParameterSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current: ToneParameters::default(),
        }
    }

    /// Re-read the source. Never fails: on any error the held values stand.
    pub fn refresh(&mut self) -> ToneParameters {
        let parsed = self
            .reader
            .read_source()
            .map_err(|e| e.to_string())
            .and_then(|text| ToneParameters::parse(&text).map_err(|e| e.to_string()));

        match parsed {
            Ok(params) => self.current = params,
            // Kept at trace level: this can fire every frame while a writer is mid-update
            Err(reason) => trace!("keeping {:?}: {}", self.current, reason),
        }
        self.current
    }

    pub fn current(&self) -> ToneParameters {
        self.current
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}
