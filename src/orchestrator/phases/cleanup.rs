//! Explicit cleanup of intermediate source and build trees.
//!
//! Never part of a bootstrap run. Only the binutils and GCC source and build
//! directories are removed; archives, logs and the install prefix stay.

use crate::config::ToolchainConfig;
use crate::error::BuildError;
use crate::log_parsed;
use crate::system::paths::PathRegistry;
use std::path::PathBuf;

/// Remove intermediate directories, returning the ones actually deleted.
pub fn cleanup_intermediates(
    config: &ToolchainConfig,
    registry: &PathRegistry,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut removed = Vec::new();

    for dir in registry.intermediate_dirs(config) {
        if !registry.is_within_root(&dir) || dir.starts_with(registry.install_prefix()) {
            log::warn!("[Cleanup] Refusing to remove {}", dir.display());
            continue;
        }
        if !dir.exists() {
            log::debug!("[Cleanup] {} already gone", dir.display());
            continue;
        }

        std::fs::remove_dir_all(&dir)?;
        log_parsed!("Removed {}", dir.display());
        removed.push(dir);
    }

    Ok(removed)
}

/// Closing instruction printed after a successful bootstrap.
pub fn completion_message(target: &str) -> String {
    format!(
        "Now you can delete the build folders in the toolchain folder! (do not delete \"{}\")",
        target
    )
}
