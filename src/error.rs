use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("capture device is not opened: {0}")]
    DeviceNotOpened(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("frame decode failed: {0}")]
    Decode(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("overlay error: {0}")]
    Overlay(#[from] image::ImageError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// SDL reports failures as plain strings
    pub(crate) fn display(err: impl ToString) -> Self {
        Self::Display(err.to_string())
    }
}
