//! Error types for drawio-batch.

use std::path::PathBuf;

use crate::config::ExportFormat;

/// Result type alias for drawio-batch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for drawio-batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Source directory does not exist or is not a directory.
    #[error("source directory does not exist: {path}")]
    SourceNotFound {
        /// Path to the missing source directory.
        path: PathBuf,
    },

    /// Failed to read a directory while scanning the source tree.
    #[error("failed to read directory '{path}'")]
    SourceRead {
        /// Path to the directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rendering command is not installed or not on `PATH`.
    #[error("renderer '{program}' not found on PATH (is it installed?)")]
    RendererNotFound {
        /// Program that could not be resolved.
        program: String,
    },

    /// Rendering command could not be started.
    #[error("failed to start renderer '{program}'")]
    RendererSpawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rendering command exited unsuccessfully.
    #[error("rendering '{input}' to {format} failed ({status})")]
    RenderFailed {
        /// Input diagram file.
        input: PathBuf,
        /// Requested output format.
        format: ExportFormat,
        /// Exit status description.
        status: String,
        /// Captured standard error of the renderer.
        stderr: String,
    },

    /// Path cannot be expressed inside the container mount.
    #[error("path '{path}' is outside the container mount root '{mount_root}'")]
    OutsideMountRoot {
        /// Offending path.
        path: PathBuf,
        /// Host directory mounted into the container.
        mount_root: PathBuf,
    },

    /// One or more exports failed while continuing past failures.
    #[error("{failed} export(s) failed")]
    ExportsFailed {
        /// Number of failed exports.
        failed: usize,
    },

    /// Run was interrupted by the user.
    #[error("interrupted")]
    Interrupted,

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Process exit code for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => 130, // 128 + SIGINT(2)
            _ => 1,
        }
    }
}
