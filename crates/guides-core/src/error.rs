use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuidesError {
    #[error("missing target: usage: copy-guides <absolute-path-to-target-repo>")]
    MissingTarget,

    #[error("target path must be absolute (start with '/'): {}", .0.display())]
    RelativeTarget(PathBuf),

    #[error("target directory does not exist: {}", .0.display())]
    TargetNotFound(PathBuf),

    #[error("target is not a directory: {}", .0.display())]
    TargetNotDirectory(PathBuf),

    #[error("guide source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("invalid guide layout: {0}")]
    InvalidLayout(String),

    #[error("source and destination overlap: {} and {}", .source_path.display(), .destination.display())]
    Overlap {
        source_path: PathBuf,
        destination: PathBuf,
    },

    #[error("failed to copy {}: {source}", .path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl GuidesError {
    pub(crate) fn copy_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GuidesError::CopyFailed {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuidesError>;
