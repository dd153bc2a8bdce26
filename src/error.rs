use std::path::PathBuf;

use thiserror::Error;

/// Camera corridor error types
#[derive(Error, Debug)]
pub enum CorridorError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pose on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Pose on line {line} has {found} fields, expected at least 8")]
    ShortLine { line: usize, found: usize },

    #[error("Zero-length segment {segment}: heading is undefined")]
    GeometryDomain { segment: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Point cloud {}: {message}", .path.display())]
    PointCloud { path: PathBuf, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl CorridorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorridorError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for malformed or short input lines
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            CorridorError::Parse { .. } | CorridorError::ShortLine { .. }
        )
    }
}

/// Result type for corridor operations
pub type Result<T> = std::result::Result<T, CorridorError>;
