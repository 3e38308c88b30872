//! Toolchain Bootstrap
//!
//! Builds a freestanding cross toolchain (binutils + GCC, plus NASM on
//! Windows hosts) from a small settings file. The crate only sequences calls
//! into the upstream build systems; it never compiles anything itself.
//!
//! The system is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures and types
//! - **config**: Settings loading, validation and template substitution
//! - **system**: Host detection, path registry, build environment
//! - **toolchain**: Source URLs, downloads, archives and build recipes
//! - **orchestrator**: The sequential bootstrap driver and its phases
//! - **log_collector**: Disk-persisted logging backend
//! - **cli**: Command line parsing

// Core foundational modules
pub mod error;
pub mod models;

pub mod cli;
pub mod config;
pub mod system;
pub mod toolchain;

// Robust, decoupled logging system
pub mod log_collector;

// Bootstrap orchestration and phase tracking
pub mod orchestrator;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{install_global_logger, LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AppError, BuildError, ConfigError, Result};

pub use models::{DownloadProgress, HostPlatform, JobCount, Tool, ToolPaths};

pub use config::{ToolchainConfig, ToolchainSettings};

pub use orchestrator::{
    BootstrapPhase, BootstrapReport, Bootstrapper, CommandRunner, CommandSpec, ProgressCallback,
    SystemRunner,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
    }

    #[test]
    fn test_models_reexport() {
        assert_eq!(Tool::ALL.len(), 3);
        assert!(HostPlatform::Windows.is_windows());
    }
}
