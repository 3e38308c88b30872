//! Toolchain Source Management
//!
//! Maps each tool to the URL its archive (or installer) is fetched from and the
//! file name it is stored under in the toolchain root.

use crate::config::ToolchainConfig;
use crate::models::Tool;
use crate::system::paths::PathRegistry;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where one tool's archive comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSource {
    pub tool: Tool,
    /// Download URL with the version substituted
    pub url: String,
    /// File name inside the toolchain root
    pub archive_name: String,
    /// Full destination path
    pub archive: PathBuf,
}

impl ToolSource {
    pub fn for_tool(config: &ToolchainConfig, registry: &PathRegistry, tool: Tool) -> Self {
        let paths = registry.tool_paths(config, tool);
        ToolSource {
            tool,
            url: config.release(tool).url.clone(),
            archive_name: paths.archive_name,
            archive: paths.archive,
        }
    }

    /// True when the archive is a gzip tarball that must be extracted.
    pub fn is_tarball(&self) -> bool {
        self.archive_name.ends_with(".tar.gz") || self.archive_name.ends_with(".tgz")
    }
}

/// Resolved sources for every tool of one configuration.
pub struct SourceTable {
    sources: HashMap<Tool, ToolSource>,
}

impl SourceTable {
    pub fn new(config: &ToolchainConfig, registry: &PathRegistry) -> Self {
        let sources = Tool::ALL
            .iter()
            .map(|&tool| (tool, ToolSource::for_tool(config, registry, tool)))
            .collect();

        SourceTable { sources }
    }

    /// Source entry for a tool. Every tool is always present.
    pub fn get(&self, tool: Tool) -> Option<&ToolSource> {
        self.sources.get(&tool)
    }

    /// Archive files that currently exist on disk.
    pub fn present_archives(&self) -> Vec<&ToolSource> {
        let mut present: Vec<&ToolSource> = Tool::ALL
            .iter()
            .filter_map(|t| self.sources.get(t))
            .filter(|s| s.archive.is_file())
            .collect();
        present.sort_by_key(|s| s.archive_name.clone());
        present
    }
}
