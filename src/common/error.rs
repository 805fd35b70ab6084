use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VjError {
    #[error("Could not access the webcam (device {index}): {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    #[error("Issue while capturing the video feed: {0}")]
    CaptureFailure(String),

    #[error("Icon image could not be loaded from {path}: {reason}")]
    IconLoadFailure { path: PathBuf, reason: String },

    #[error("Classifier file not found: {0}")]
    ClassifierNotFound(PathBuf),

    #[error("Malformed classifier data in {path}: {reason}")]
    MalformedClassifier { path: PathBuf, reason: String },

    #[error("Detection error: {0}")]
    Detection(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VjError {
    /// Whether this error ends the run. Only a missing icon is tolerated.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, VjError::IconLoadFailure { .. })
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for VjError {
    fn from(e: opencv::Error) -> Self {
        VjError::Display(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VjError>;
