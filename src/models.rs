//! Core data types for the toolchain bootstrapper.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// A tool the bootstrapper acquires or builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Binutils,
    Gcc,
    Nasm,
}

impl Tool {
    /// Every tool, in bootstrap order.
    pub const ALL: [Tool; 3] = [Tool::Nasm, Tool::Binutils, Tool::Gcc];

    /// Canonical lowercase name, used in archive and directory names.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Tool::Binutils => "binutils",
            Tool::Gcc => "gcc",
            Tool::Nasm => "nasm",
        }
    }

    /// Literal token replaced by the version inside URL and filename templates.
    pub fn version_placeholder(&self) -> &'static str {
        match self {
            Tool::Binutils => "BINUTILS_VERSION",
            Tool::Gcc => "GCC_VERSION",
            Tool::Nasm => "NASM_VERSION",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Host operating system the bootstrapper runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPlatform {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl HostPlatform {
    /// Map a `std::env::consts::OS` style name to a platform.
    pub fn from_os_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "linux" => HostPlatform::Linux,
            "macos" | "darwin" => HostPlatform::MacOs,
            "windows" => HostPlatform::Windows,
            other => HostPlatform::Other(other.to_string()),
        }
    }

    /// Windows hosts install NASM themselves and cannot build binutils/GCC.
    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::Linux => f.write_str("linux"),
            HostPlatform::MacOs => f.write_str("macos"),
            HostPlatform::Windows => f.write_str("windows"),
            HostPlatform::Other(name) => f.write_str(name),
        }
    }
}

/// Filesystem locations for one tool, all under the toolchain root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub tool: Tool,
    /// File name of the downloaded archive or installer
    pub archive_name: String,
    /// Full path of the downloaded archive or installer
    pub archive: PathBuf,
    /// Extracted source tree
    pub source_dir: PathBuf,
    /// Out-of-tree build directory
    pub build_dir: PathBuf,
    /// Install prefix shared by every tool: `<root>/<target>`
    pub install_prefix: PathBuf,
}

/// Parallelism handed to `make -j`.
///
/// Settings accept either a positive integer or the string `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCount {
    Fixed(u32),
    Auto,
}

impl JobCount {
    /// Resolve to a concrete job count for this host.
    pub fn resolve(&self) -> u32 {
        match self {
            JobCount::Fixed(n) => *n,
            JobCount::Auto => num_cpus::get().max(1) as u32,
        }
    }
}

impl Serialize for JobCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JobCount::Fixed(n) => serializer.serialize_u32(*n),
            JobCount::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for JobCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct JobCountVisitor;

        impl<'de> Visitor<'de> for JobCountVisitor {
            type Value = JobCount;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a job count integer or \"auto\"")
            }

            fn visit_i64<E>(self, value: i64) -> Result<JobCount, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(JobCount::Fixed)
                    .map_err(|_| E::custom(format!("job count out of range: {}", value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<JobCount, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(JobCount::Fixed)
                    .map_err(|_| E::custom(format!("job count out of range: {}", value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<JobCount, E>
            where
                E: de::Error,
            {
                let trimmed = value.trim();
                if trimmed.eq_ignore_ascii_case("auto") {
                    return Ok(JobCount::Auto);
                }
                // Older settings files store JOBS as a quoted string
                trimmed
                    .parse::<u32>()
                    .map(JobCount::Fixed)
                    .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(JobCountVisitor)
    }
}

/// Snapshot of an in-flight download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written so far
    pub received: u64,
    /// Content length announced by the server, if any
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage complete, rounded to two decimals. `None` when the size is unknown.
    pub fn percentage(&self) -> Option<f64> {
        let total = i64::try_from(self.total?).ok()?;
        crate::toolchain::download::progress_percentage(self.received, 1, total)
    }
}
