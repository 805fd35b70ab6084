// Core modules
pub mod core;
pub mod camera;
pub mod cli;
pub mod common;

// Re-export commonly used types
pub use crate::common::{Config, DetectionParams, VjError, Result};
pub use crate::core::{Annotation, Annotator, Classifier, Detector, LoopState, Region, RunSummary, Session};
pub use crate::camera::{Camera, Frame, FrameSource};
pub use crate::cli::{Answer, ConfirmationDialog, DialogState, DisplaySurface, ExitKey, Prompt};
