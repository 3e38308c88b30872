//! Centralized Path Registry: every derived location lives under the toolchain root
//!
//! The registry turns a `ToolchainConfig` into concrete archive, source, build
//! and install locations. Nothing is cached: the same config always produces
//! the same paths, so a re-run finds exactly what an earlier run left behind.

use crate::config::ToolchainConfig;
use crate::models::{Tool, ToolPaths};
use std::path::{Component, Path, PathBuf};

/// Centralized registry for toolchain path resolution
#[derive(Clone, Debug)]
pub struct PathRegistry {
    /// Toolchain root (`<settings dir>/toolchain`)
    root: PathBuf,

    /// Install prefix shared by binutils and GCC
    install_prefix: PathBuf,
}

impl PathRegistry {
    /// Create a registry for the given configuration.
    pub fn new(config: &ToolchainConfig) -> Self {
        PathRegistry {
            root: config.root.clone(),
            install_prefix: config.root.join(&config.target),
        }
    }

    /// Toolchain root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Install prefix: `<root>/<target>`
    pub fn install_prefix(&self) -> &Path {
        &self.install_prefix
    }

    /// Directory the log collector writes into
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Derive every location for one tool.
    pub fn tool_paths(&self, config: &ToolchainConfig, tool: Tool) -> ToolPaths {
        let version = config.version(tool);
        let name = tool.canonical_name();

        match tool {
            Tool::Binutils | Tool::Gcc => {
                let archive_name = format!("{}-{}.tar.gz", name, version);
                ToolPaths {
                    tool,
                    archive: self.root.join(&archive_name),
                    archive_name,
                    source_dir: self.root.join(format!("{}-{}", name, version)),
                    build_dir: self.root.join(format!("build-{}-{}", name, version)),
                    install_prefix: self.install_prefix.clone(),
                }
            }
            // The installer runs straight from the root; there is no tree to build.
            Tool::Nasm => ToolPaths {
                tool,
                archive: self.root.join(&config.nasm_installer),
                archive_name: config.nasm_installer.clone(),
                source_dir: self.root.clone(),
                build_dir: self.root.clone(),
                install_prefix: self.install_prefix.clone(),
            },
        }
    }

    /// Intermediate directories that may be deleted once the toolchain is installed.
    pub fn intermediate_dirs(&self, config: &ToolchainConfig) -> Vec<PathBuf> {
        [Tool::Binutils, Tool::Gcc]
            .iter()
            .flat_map(|tool| {
                let paths = self.tool_paths(config, *tool);
                [paths.source_dir, paths.build_dir]
            })
            .collect()
    }

    /// Verify that a path stays inside the toolchain root.
    ///
    /// Purely lexical, so it works before anything exists on disk. Any `..`
    /// component counts as escaping.
    pub fn is_within_root(&self, path: &Path) -> bool {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return false;
        }
        path.starts_with(&self.root) && path != self.root
    }
}
