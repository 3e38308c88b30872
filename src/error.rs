//! Unified error type hierarchy for the toolchain bootstrapper
//!
//! Provides structured error handling with ConfigError, BuildError and AppError.

use std::io;
use thiserror::Error;

/// Settings file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid TOML in settings: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Invalid JSON in settings: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid YAML in settings: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Bootstrap execution errors.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The build path for this tool is not implemented on the host.
    #[error("Building {tool} is not implemented on {host}")]
    UnsupportedPlatform { tool: String, host: String },

    #[error("Preparation failed: {0}")]
    PreparationFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Archive is corrupt: {0}")]
    ArchiveCorrupt(String),

    /// An external tool could not be spawned or exited unsuccessfully.
    #[error("Command '{cmd}' failed: {reason}")]
    CommandFailed { cmd: String, reason: String },

    #[error("Invalid phase transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BuildError {
    /// True for the fatal "this host cannot build" signal.
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, BuildError::UnsupportedPlatform { .. })
    }
}

/// Top-level error for the bootstrap binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Logging pipeline could not be set up
    #[error("Logging initialization failed: {0}")]
    Logging(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Get a user-facing error message suitable for console display
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => format!("Toolchain settings error: {}", e),
            AppError::Build(BuildError::UnsupportedPlatform { tool, host }) => format!(
                "{} cannot be built on {} yet; use a Linux or macOS host",
                tool, host
            ),
            AppError::Build(e) => format!("Bootstrap failed: {}", e),
            AppError::Logging(msg) => format!("Could not set up logging: {}", msg),
            AppError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        }
    }
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, AppError>;
