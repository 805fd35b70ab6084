pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, DetectionParams};
pub use error::{VjError, Result};
pub use paths::{executable_dir, user_config_file};
