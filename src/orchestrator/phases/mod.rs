//! Orchestrator phases: the bootstrap pipeline split into independent steps.
//!
//! - **Preparation** (`prep`): toolchain root creation
//! - **NASM** (`nasm`): installer download and silent install on Windows hosts
//! - **Build** (`build`): download, extract, configure, make and install for binutils and GCC
//! - **Cleanup** (`cleanup`): explicit removal of intermediate source and build trees
//!
//! Each phase is idempotent and independently testable.

pub mod build;
pub mod cleanup;
pub mod nasm;
pub mod prep;

pub use build::build_tool;
pub use cleanup::{cleanup_intermediates, completion_message};
pub use nasm::acquire_nasm;
pub use prep::ensure_root;

use crate::config::ToolchainConfig;
use crate::models::{DownloadProgress, HostPlatform, Tool};
use crate::orchestrator::executor::CommandRunner;
use crate::system::paths::PathRegistry;
use crate::toolchain::Downloader;

/// Everything a phase reads. Borrowed for the duration of one run.
pub struct PhaseContext<'a> {
    pub config: &'a ToolchainConfig,
    pub registry: &'a PathRegistry,
    pub host: &'a HostPlatform,
    pub runner: &'a dyn CommandRunner,
    pub downloader: &'a Downloader,
    pub on_progress: &'a (dyn Fn(Tool, DownloadProgress) + Send + Sync),
}
