use std::path::{Path, PathBuf};
use crate::common::error::{VjError, Result};

/// Directory holding the running executable. Cascades, the icon and the
/// local config file are looked up here.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| VjError::Config(format!(
            "Executable path has no parent directory: {}", exe.display()
        )))
}

pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vj-detect/config.toml"))
}
