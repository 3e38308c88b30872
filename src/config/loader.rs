//! Settings file loader.

use crate::config::{ToolchainConfig, ToolchainSettings};
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "toolchain_settings.toml";

/// Name of the toolchain root, created next to the settings file.
pub const TOOLCHAIN_DIR_NAME: &str = "toolchain";

/// Get the default settings path: ./toolchain_settings.toml
pub fn get_default_settings_path() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::IoError)?;
    Ok(cwd.join(DEFAULT_SETTINGS_FILE))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let raw = path.to_string_lossy();
    if raw == "~" || raw.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            ConfigError::ValidationFailed("Cannot determine home directory".to_string())
        })?;
        let rest = raw.trim_start_matches('~').trim_start_matches('/');
        return Ok(if rest.is_empty() { home } else { home.join(rest) });
    }
    Ok(path.to_path_buf())
}

/// Settings format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
    Yaml,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(SettingsFormat::Toml),
            "json" => Some(SettingsFormat::Json),
            "yml" | "yaml" => Some(SettingsFormat::Yaml),
            _ => None,
        }
    }
}

/// Validate settings path (.toml, .json, .yml or .yaml extension required).
pub fn validate_settings_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Settings path cannot be empty".to_string(),
        ));
    }

    if SettingsFormat::from_path(path).is_none() {
        return Err(ConfigError::ValidationFailed(format!(
            "Settings file must have a .toml, .json, .yml or .yaml extension: {}",
            path.display()
        )));
    }

    if path.to_str().is_none() {
        return Err(ConfigError::ValidationFailed(
            "Settings path contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

/// Load raw settings from a TOML, JSON or YAML file.
pub fn load_settings_from_file(path: &Path) -> Result<ToolchainSettings, ConfigError> {
    validate_settings_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Settings file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let settings = match SettingsFormat::from_path(path) {
        Some(SettingsFormat::Json) => serde_json::from_str(&content)?,
        Some(SettingsFormat::Yaml) => serde_yaml::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };

    Ok(settings)
}

/// Toolchain root for a settings file: `<settings dir>/toolchain`.
pub fn toolchain_root_for(settings_path: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = if settings_path.is_absolute() {
        settings_path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(ConfigError::IoError)?
            .join(settings_path)
    };

    let dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    Ok(dir.join(TOOLCHAIN_DIR_NAME))
}

/// Load, validate and resolve a settings file into a `ToolchainConfig`.
pub fn load_toolchain_config(path: &Path) -> Result<ToolchainConfig, ConfigError> {
    let path = expand_home(path)?;
    let settings = load_settings_from_file(&path)?;
    let root = toolchain_root_for(&path)?;
    log::debug!("[Config] Loaded settings from {}", path.display());
    ToolchainConfig::from_settings(&settings, &root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobCount;
    use tempfile::TempDir;

    const SAMPLE_TOML: &str = r#"
["Build Info"]
TARGET = "i686-elf"

["Toolchain Versions"]
BINUTILS_VERSION = "2.41"
GCC_VERSION = "13.2.0"
NASM_VERSION = "2.16.01"

[Urls]
BINUTILS_URL = "https://ftp.gnu.org/gnu/binutils/binutils-BINUTILS_VERSION.tar.gz"
GCC_URL = "https://ftp.gnu.org/gnu/gcc/gcc-GCC_VERSION/gcc-GCC_VERSION.tar.gz"
NASM_URL_WIN = "https://www.nasm.us/pub/nasm/releasebuilds/NASM_VERSION/win64/nasm-NASM_VERSION-installer-x64.exe"

[Executables]
NASM_EXE_WIN = "nasm-NASM_VERSION-installer-x64.exe"

[ADVANCED]
JOBS = 8
"#;

    #[test]
    fn test_load_toml_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("toolchain_settings.toml");
        fs::write(&path, SAMPLE_TOML).unwrap();

        let settings = load_settings_from_file(&path).expect("Failed to load settings");
        assert_eq!(settings.build_info.target, "i686-elf");
        assert_eq!(settings.versions.binutils, "2.41");
        assert_eq!(settings.advanced.jobs, JobCount::Fixed(8));
    }

    #[test]
    fn test_load_json_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("toolchain_settings.json");
        let json = serde_json::to_string_pretty(&ToolchainSettings::default()).unwrap();
        fs::write(&path, json).unwrap();

        let settings = load_settings_from_file(&path).expect("Failed to load settings");
        assert_eq!(settings, ToolchainSettings::default());
    }

    const SAMPLE_YAML: &str = r#"
Build Info:
  TARGET: i686-elf

Toolchain Versions:
  BINUTILS_VERSION: "2.41"
  GCC_VERSION: 13.2.0
  NASM_VERSION: 2.16.01

Urls:
  BINUTILS_URL: https://ftp.gnu.org/gnu/binutils/binutils-BINUTILS_VERSION.tar.gz
  GCC_URL: https://ftp.gnu.org/gnu/gcc/gcc-GCC_VERSION/gcc-GCC_VERSION.tar.gz
  NASM_URL_WIN: https://www.nasm.us/pub/nasm/releasebuilds/NASM_VERSION/win64/nasm-NASM_VERSION-installer-x64.exe

Executables:
  NASM_EXE_WIN: nasm-NASM_VERSION-installer-x64.exe

ADVANCED:
  JOBS: 8
"#;

    #[test]
    fn test_load_yaml_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("toolchain_settings.yml");
        fs::write(&path, SAMPLE_YAML).unwrap();

        let settings = load_settings_from_file(&path).expect("Failed to load settings");
        assert_eq!(settings.build_info.target, "i686-elf");
        assert_eq!(settings.versions.binutils, "2.41");
        assert_eq!(settings.versions.gcc, "13.2.0");
        assert_eq!(settings.versions.nasm, "2.16.01");
        assert_eq!(settings.advanced.jobs, JobCount::Fixed(8));

        let from_toml = {
            let toml_path = temp_dir.path().join("toolchain_settings.toml");
            fs::write(&toml_path, SAMPLE_TOML).unwrap();
            load_settings_from_file(&toml_path).unwrap()
        };
        assert_eq!(settings, from_toml);
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("toolchain_settings.yaml");
        fs::write(&path, "Build Info: [unterminated\n").unwrap();

        let result = load_settings_from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidYaml(_))));
    }

    #[test]
    fn test_load_toolchain_config_roots_next_to_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("toolchain_settings.toml");
        fs::write(&path, SAMPLE_TOML).unwrap();

        let config = load_toolchain_config(&path).expect("Failed to load config");
        assert_eq!(config.root, temp_dir.path().join("toolchain"));
        assert_eq!(config.jobs, 8);
        assert_eq!(
            config.binutils.url,
            "https://ftp.gnu.org/gnu/binutils/binutils-2.41.tar.gz"
        );
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        let without_advanced = SAMPLE_TOML.replace("[ADVANCED]\nJOBS = 8\n", "");
        fs::write(&path, without_advanced).unwrap();

        let result = load_settings_from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn test_unquoted_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("floaty.toml");
        fs::write(&path, SAMPLE_TOML.replace("\"2.41\"", "2.41")).unwrap();

        assert!(load_settings_from_file(&path).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_settings_from_file(Path::new("/nonexistent/path/settings.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_settings_path() {
        assert!(validate_settings_path(Path::new("toolchain_settings.toml")).is_ok());
        assert!(validate_settings_path(Path::new("/tmp/settings.json")).is_ok());
        assert!(validate_settings_path(Path::new("toolchain_settings.yml")).is_ok());
        assert!(validate_settings_path(Path::new("settings.yaml")).is_ok());
        assert!(validate_settings_path(Path::new("settings.ini")).is_err());
        assert!(validate_settings_path(Path::new("settings")).is_err());
        assert!(validate_settings_path(Path::new("")).is_err());
    }

    #[test]
    fn test_expand_home() {
        let plain = expand_home(Path::new("/etc/settings.toml")).unwrap();
        assert_eq!(plain, PathBuf::from("/etc/settings.toml"));

        if let Some(home) = dirs::home_dir() {
            let expanded = expand_home(Path::new("~/os/settings.toml")).unwrap();
            assert_eq!(expanded, home.join("os/settings.toml"));
        }
    }
}
