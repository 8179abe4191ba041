use crate::error::{GuidesError, Result};
use std::path::{Path, PathBuf};

/// Check the target repository argument before anything is written.
///
/// The path must be given, absolute, and name an existing directory. Nothing
/// is created here, so a rejected argument leaves the filesystem untouched.
pub fn validate_target(arg: Option<&Path>) -> Result<PathBuf> {
    let path = match arg {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Err(GuidesError::MissingTarget),
    };

    if !path.is_absolute() {
        return Err(GuidesError::RelativeTarget(path.to_path_buf()));
    }

    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GuidesError::TargetNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Err(GuidesError::TargetNotDirectory(path.to_path_buf()));
    }

    Ok(path.to_path_buf())
}
