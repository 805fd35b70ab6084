use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::common::paths;
use crate::common::error::{VjError, Result};

pub const CONFIG_FILE_NAME: &str = "vj-detect.toml";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub cascades: CascadeConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default = "default_device_index")]
    pub device_index: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub warmup_frames: u32,
}

// The external webcam sits at /dev/video1 on the machines this was built for.
fn default_device_index() -> u32 { 1 }
fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: default_device_index(),
            width: default_width(),
            height: default_height(),
            warmup_frames: 0,
        }
    }
}

/// Classifier and icon files. Relative paths are taken from the
/// executable's directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CascadeConfig {
    #[serde(default = "default_face_cascade")]
    pub face: PathBuf,
    #[serde(default = "default_eye_cascade")]
    pub eyes: PathBuf,
    #[serde(default = "default_mouth_cascade")]
    pub mouth: PathBuf,
    #[serde(default = "default_icon")]
    pub icon: PathBuf,
}

fn default_face_cascade() -> PathBuf { PathBuf::from("haarcascade_frontalface_default.xml") }
fn default_eye_cascade() -> PathBuf { PathBuf::from("haarcascade_eye.xml") }
fn default_mouth_cascade() -> PathBuf { PathBuf::from("haarcascade_mcs_mouth.xml") }
fn default_icon() -> PathBuf { PathBuf::from("Icon.png") }

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            face: default_face_cascade(),
            eyes: default_eye_cascade(),
            mouth: default_mouth_cascade(),
            icon: default_icon(),
        }
    }
}

impl CascadeConfig {
    /// Anchor every relative path at `base`.
    pub fn resolve(&self, base: &Path) -> Self {
        Self {
            face: paths::resolve(base, &self.face),
            eyes: paths::resolve(base, &self.eyes),
            mouth: paths::resolve(base, &self.mouth),
            icon: paths::resolve(base, &self.icon),
        }
    }
}

/// Arguments handed to the multi-scale detector for one classifier.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// (width, height)
    pub min_size: (u32, u32),
}

impl DetectionParams {
    pub const fn new(scale_factor: f64, min_neighbors: i32, min_size: (u32, u32)) -> Self {
        Self { scale_factor, min_neighbors, min_size }
    }

    pub const FACE: Self = Self::new(1.1, 25, (30, 30));
    pub const EYES: Self = Self::new(1.1, 37, (20, 20));
    pub const MOUTH: Self = Self::new(1.3, 30, (40, 20));

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.scale_factor > 1.0 && self.scale_factor <= 4.0) {
            return Err(VjError::Config(format!(
                "{} scale_factor must be in (1.0, 4.0], got {}", name, self.scale_factor
            )));
        }
        if self.min_neighbors < 0 {
            return Err(VjError::Config(format!(
                "{} min_neighbors must not be negative, got {}", name, self.min_neighbors
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "default_face_params")]
    pub face: DetectionParams,
    #[serde(default = "default_eye_params")]
    pub eyes: DetectionParams,
    #[serde(default = "default_mouth_params")]
    pub mouth: DetectionParams,
}

fn default_face_params() -> DetectionParams { DetectionParams::FACE }
fn default_eye_params() -> DetectionParams { DetectionParams::EYES }
fn default_mouth_params() -> DetectionParams { DetectionParams::MOUTH }

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            face: DetectionParams::FACE,
            eyes: DetectionParams::EYES,
            mouth: DetectionParams::MOUTH,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_key_wait")]
    pub key_wait_ms: u64,
}

fn default_window_title() -> String { "VJ Detection".to_string() }
fn default_key_wait() -> u64 { 1 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            key_wait_ms: default_key_wait(),
        }
    }
}

impl DisplayConfig {
    pub fn key_wait(&self) -> Duration {
        Duration::from_millis(self.key_wait_ms)
    }
}

impl Config {
    /// Load the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise the first existing file among
    /// `<exe_dir>/vj-detect.toml` and the per-user config file is used, and
    /// the built-in defaults apply when neither exists.
    pub fn load(explicit: Option<&Path>, exe_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let candidates = [
            Some(exe_dir.join(CONFIG_FILE_NAME)),
            paths::user_config_file(),
        ];
        match candidates.into_iter().flatten().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VjError::Config(format!(
                "Config file not found: {}", path.display()
            )));
        }

        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| VjError::Config(format!("Config parse error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.width > 4096 {
            return Err(VjError::Config(format!(
                "Camera width must be between 1 and 4096, got {}", self.camera.width
            )));
        }
        if self.camera.height == 0 || self.camera.height > 4096 {
            return Err(VjError::Config(format!(
                "Camera height must be between 1 and 4096, got {}", self.camera.height
            )));
        }

        self.detection.face.validate("face")?;
        self.detection.eyes.validate("eyes")?;
        self.detection.mouth.validate("mouth")?;

        if self.display.window_title.trim().is_empty() {
            return Err(VjError::Config("Window title must not be empty".into()));
        }
        if self.display.key_wait_ms == 0 {
            // A zero wait blocks until a key arrives, which freezes the feed.
            return Err(VjError::Config("key_wait_ms must be at least 1".into()));
        }

        Ok(())
    }
}
