//! Phase 1: Preparation - toolchain root creation.

use crate::error::BuildError;
use crate::log_parsed;
use crate::orchestrator::state::BootstrapReport;
use crate::system::paths::PathRegistry;

/// Create the toolchain root if it is absent.
///
/// No-op when the directory already exists. Fails when the root path is
/// occupied by something that is not a directory.
pub fn ensure_root(registry: &PathRegistry, report: &mut BootstrapReport) -> Result<(), BuildError> {
    let root = registry.root();

    if root.is_dir() {
        log::debug!("[Prep] Toolchain root exists: {}", root.display());
        report
            .skipped
            .push(format!("create {}", root.display()));
        return Ok(());
    }

    if root.exists() {
        return Err(BuildError::PreparationFailed(format!(
            "Toolchain root exists but is not a directory: {}",
            root.display()
        )));
    }

    std::fs::create_dir_all(root).map_err(|e| {
        BuildError::PreparationFailed(format!(
            "Failed to create toolchain root {}: {}",
            root.display(),
            e
        ))
    })?;
    log_parsed!("Created toolchain directory {}", root.display());
    report.created_dirs.push(root.to_path_buf());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ToolchainConfig, ToolchainSettings};
    use tempfile::TempDir;

    fn registry_at(root: &std::path::Path) -> PathRegistry {
        let config = ToolchainConfig::from_settings(&ToolchainSettings::default(), root).unwrap();
        PathRegistry::new(&config)
    }

    #[test]
    fn test_ensure_root_creates_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("toolchain");
        let registry = registry_at(&root);

        let mut first = BootstrapReport::default();
        ensure_root(&registry, &mut first).expect("create root");
        assert!(root.is_dir());
        assert_eq!(first.created_dirs, vec![root.clone()]);

        let mut second = BootstrapReport::default();
        ensure_root(&registry, &mut second).expect("root exists");
        assert!(second.created_dirs.is_empty());
        assert_eq!(second.skipped.len(), 1);
    }

    #[test]
    fn test_ensure_root_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("toolchain");
        std::fs::write(&root, b"not a dir").unwrap();

        let result = ensure_root(&registry_at(&root), &mut BootstrapReport::default());
        assert!(matches!(result, Err(BuildError::PreparationFailed(_))));
    }
}
