use std::path::PathBuf;

/// Convenience result type used across Timecapsule.
pub type CapsuleResult<T> = Result<T, CapsuleError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CapsuleError {
    /// An input image is missing, unreadable, or not a supported raster format.
    #[error("decode error: '{}': {reason}", .path.display())]
    Decode {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying decoder or filesystem message.
        reason: String,
    },

    /// The centered crop shared by two snapshots has zero area.
    #[error("degenerate alignment: aligned region is {width}x{height}")]
    DegenerateAlignment {
        /// Aligned width.
        width: u32,
        /// Aligned height.
        height: u32,
    },

    /// Fewer than two screenshots were supplied to the batch.
    #[error("insufficient input: need at least 2 screenshots, found {available}")]
    InsufficientInput {
        /// Number of screenshots that were available.
        available: usize,
    },

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Filesystem failure while writing artifacts or preparing directories.
    #[error("io error: '{}': {source}", .path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CapsuleError {
    /// Build a [`CapsuleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CapsuleError::Decode`] value.
    pub fn decode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`CapsuleError::Io`] value.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
