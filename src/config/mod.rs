//! Configuration module for toolchain bootstrap settings.
//!
//! The settings file is parsed into [`ToolchainSettings`] (one struct per
//! section, keys named exactly as in the file), then validated and resolved
//! into the immutable [`ToolchainConfig`] that every bootstrap step borrows.
//!
//! # Module Structure
//!
//! - `loader`: Reads settings files (TOML, or JSON by extension)
//! - `validator`: Target triple, version, URL and job count checks
//!
//! # Configuration Flow
//!
//! 1. `loader` reads `toolchain_settings.toml`
//! 2. `validator` rejects malformed fields
//! 3. Version placeholders in URL/filename templates are substituted
//! 4. The resulting `ToolchainConfig` is never mutated again

pub mod loader;
pub mod validator;

use crate::error::ConfigError;
use crate::models::{JobCount, Tool};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `["Build Info"]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildInfo {
    #[serde(rename = "TARGET")]
    pub target: String,
}

/// `["Toolchain Versions"]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchainVersions {
    #[serde(rename = "BINUTILS_VERSION")]
    pub binutils: String,
    #[serde(rename = "GCC_VERSION")]
    pub gcc: String,
    #[serde(rename = "NASM_VERSION")]
    pub nasm: String,
}

/// `[Urls]` section. Values are templates containing the version placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Urls {
    #[serde(rename = "BINUTILS_URL")]
    pub binutils: String,
    #[serde(rename = "GCC_URL")]
    pub gcc: String,
    #[serde(rename = "NASM_URL_WIN")]
    pub nasm_win: String,
}

/// `[Executables]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executables {
    #[serde(rename = "NASM_EXE_WIN")]
    pub nasm_win: String,
}

/// `[ADVANCED]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advanced {
    #[serde(rename = "JOBS")]
    pub jobs: JobCount,
}

/// Raw settings document, as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchainSettings {
    #[serde(rename = "Build Info")]
    pub build_info: BuildInfo,
    #[serde(rename = "Toolchain Versions")]
    pub versions: ToolchainVersions,
    #[serde(rename = "Urls")]
    pub urls: Urls,
    #[serde(rename = "Executables")]
    pub executables: Executables,
    #[serde(rename = "ADVANCED")]
    pub advanced: Advanced,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        ToolchainSettings {
            build_info: BuildInfo {
                target: "i686-elf".to_string(),
            },
            versions: ToolchainVersions {
                binutils: "2.41".to_string(),
                gcc: "13.2.0".to_string(),
                nasm: "2.16.01".to_string(),
            },
            urls: Urls {
                binutils: "https://ftp.gnu.org/gnu/binutils/binutils-BINUTILS_VERSION.tar.gz"
                    .to_string(),
                gcc: "https://ftp.gnu.org/gnu/gcc/gcc-GCC_VERSION/gcc-GCC_VERSION.tar.gz"
                    .to_string(),
                nasm_win: "https://www.nasm.us/pub/nasm/releasebuilds/NASM_VERSION/win64/nasm-NASM_VERSION-installer-x64.exe"
                    .to_string(),
            },
            executables: Executables {
                nasm_win: "nasm-NASM_VERSION-installer-x64.exe".to_string(),
            },
            advanced: Advanced {
                jobs: JobCount::Fixed(4),
            },
        }
    }
}

/// Version and resolved download URL of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRelease {
    pub version: String,
    pub url: String,
}

/// Immutable, validated toolchain configuration.
///
/// Built once at startup and passed by reference to every bootstrap step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Cross-compilation target triple, e.g. `i686-elf`
    pub target: String,
    pub binutils: ToolRelease,
    pub gcc: ToolRelease,
    /// NASM release; `url` points at the Windows installer
    pub nasm: ToolRelease,
    /// Installer file name with the version substituted
    pub nasm_installer: String,
    /// Resolved `make -j` parallelism, always >= 1
    pub jobs: u32,
    /// Directory every derived path lives under
    pub root: PathBuf,
}

impl ToolchainConfig {
    /// Validate raw settings and resolve every template.
    pub fn from_settings(settings: &ToolchainSettings, root: &Path) -> Result<Self, ConfigError> {
        validator::validate_target_triple(&settings.build_info.target)?;
        validator::validate_version(Tool::Binutils, &settings.versions.binutils)?;
        validator::validate_version(Tool::Gcc, &settings.versions.gcc)?;
        validator::validate_version(Tool::Nasm, &settings.versions.nasm)?;

        let jobs = settings.advanced.jobs.resolve();
        validator::validate_job_count(jobs)?;

        let binutils = resolve_release(
            Tool::Binutils,
            &settings.versions.binutils,
            &settings.urls.binutils,
        )?;
        let gcc = resolve_release(Tool::Gcc, &settings.versions.gcc, &settings.urls.gcc)?;
        let nasm = resolve_release(
            Tool::Nasm,
            &settings.versions.nasm,
            &settings.urls.nasm_win,
        )?;

        let nasm_installer = resolve_template(
            Tool::Nasm,
            &settings.executables.nasm_win,
            &settings.versions.nasm,
        );
        validator::validate_file_name(&nasm_installer)?;

        Ok(ToolchainConfig {
            target: settings.build_info.target.trim().to_string(),
            binutils,
            gcc,
            nasm,
            nasm_installer,
            jobs,
            root: root.to_path_buf(),
        })
    }

    /// Release information for a tool.
    pub fn release(&self, tool: Tool) -> &ToolRelease {
        match tool {
            Tool::Binutils => &self.binutils,
            Tool::Gcc => &self.gcc,
            Tool::Nasm => &self.nasm,
        }
    }

    /// Version string for a tool.
    pub fn version(&self, tool: Tool) -> &str {
        &self.release(tool).version
    }

    /// Human-readable settings dump, logged at startup.
    pub fn summary(&self) -> String {
        format!(
            "Target: {}\n  Binutils: {} ({})\n  GCC: {} ({})\n  NASM: {} ({})\n  Jobs: {}\n  Root: {}",
            self.target,
            self.binutils.version,
            self.binutils.url,
            self.gcc.version,
            self.gcc.url,
            self.nasm.version,
            self.nasm_installer,
            self.jobs,
            self.root.display()
        )
    }
}

/// Replace every occurrence of `placeholder` in `template` with `version`.
pub fn substitute_version(template: &str, placeholder: &str, version: &str) -> String {
    if placeholder.is_empty() {
        return template.to_string();
    }
    template.replace(placeholder, version)
}

fn resolve_template(tool: Tool, template: &str, version: &str) -> String {
    let placeholder = tool.version_placeholder();
    if !template.contains(placeholder) {
        log::warn!(
            "[Config] Template for {} has no {} placeholder, using it verbatim: {}",
            tool,
            placeholder,
            template
        );
    }
    substitute_version(template.trim(), placeholder, version.trim())
}

fn resolve_release(tool: Tool, version: &str, url_template: &str) -> Result<ToolRelease, ConfigError> {
    let url = resolve_template(tool, url_template, version);
    validator::validate_url(tool, &url)?;
    Ok(ToolRelease {
        version: version.trim().to_string(),
        url,
    })
}
