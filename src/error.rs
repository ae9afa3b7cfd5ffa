//! Error types for devloop.
//!
//! Each core component returns its own closed error enum. [`DevLoopError`]
//! wraps them together with configuration and I/O failures so the binary can
//! report them and map them to exit codes.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::plan::{PlanParseError, SelectionError};
use crate::resume::ResumeError;

/// Main error type for devloop operations
#[derive(Error, Debug)]
pub enum DevLoopError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    // =========================================================================
    // Plan File Errors
    // =========================================================================
    /// Missing required file
    #[error("Missing required file: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Could not take the plan lock
    #[error("Failed to lock {}: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    // =========================================================================
    // Core Errors
    // =========================================================================
    /// The plan text could not be parsed
    #[error("Plan parse error: {0}")]
    Parse(#[from] PlanParseError),

    /// No task could be selected
    #[error("Task selection failed: {0}")]
    Selection(#[from] SelectionError),

    /// An interrupted run could not be resumed
    #[error("Cannot resume: {0}")]
    Resume(#[from] ResumeError),

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DevLoopError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error requires someone to edit the plan or the config
    pub fn requires_human(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::Selection(SelectionError::DependenciesNotMet { .. })
                | Self::Selection(SelectionError::NoPendingTasks)
                | Self::Config { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Selection(_) => 3,
            Self::Resume(_) => 4,
            Self::Parse(_) => 5,
            Self::MissingFile { .. } => 6,
            Self::Config { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for devloop results
pub type Result<T> = std::result::Result<T, DevLoopError>;

/// Extension trait for turning foreign errors into configuration errors
pub trait IntoConfigError<T> {
    fn into_config_error(self, path: &Path) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoConfigError<T> for std::result::Result<T, E> {
    fn into_config_error(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            DevLoopError::config_with_path(
                format!("{}: {}", path.display(), e.into()),
                path,
            )
        })
    }
}
