//! Settings validation.

use crate::error::ConfigError;
use crate::models::Tool;
use regex::Regex;

/// Validate a cross-compilation target triple such as `i686-elf` or `x86_64-unknown-elf`.
///
/// The triple ends up in `--target=` and in the install prefix path, so only
/// two to four dash-separated alphanumeric components are accepted.
pub fn validate_target_triple(target: &str) -> Result<(), ConfigError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "TARGET cannot be empty".to_string(),
        ));
    }

    let re = Regex::new(r"^[A-Za-z0-9_]+(-[A-Za-z0-9_.]+){1,3}$")
        .map_err(|e| ConfigError::ValidationFailed(format!("Failed to compile target regex: {}", e)))?;

    if !re.is_match(target) {
        return Err(ConfigError::ValidationFailed(format!(
            "TARGET must look like <arch>-<vendor/os>[-<abi>], got: {}",
            target
        )));
    }

    Ok(())
}

/// Validate a tool version string.
///
/// Versions become part of directory names, so separators and parent
/// references are rejected.
pub fn validate_version(tool: Tool, version: &str) -> Result<(), ConfigError> {
    let version = version.trim();
    if version.is_empty() {
        return Err(ConfigError::ValidationFailed(format!(
            "{} version cannot be empty",
            tool
        )));
    }

    if version.contains("..") {
        return Err(ConfigError::ValidationFailed(format!(
            "{} version must not contain '..': {}",
            tool, version
        )));
    }

    if let Some(bad) = version
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')))
    {
        return Err(ConfigError::ValidationFailed(format!(
            "{} version contains invalid character '{}': {}",
            tool, bad, version
        )));
    }

    Ok(())
}

/// Validate a resolved download URL.
pub fn validate_url(tool: Tool, url: &str) -> Result<(), ConfigError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ConfigError::ValidationFailed(format!(
            "{} URL must be http(s), got: {}",
            tool, url
        )));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationFailed(format!(
            "{} URL contains whitespace: {}",
            tool, url
        )));
    }
    Ok(())
}

/// Validate a bare file name (no directory components).
pub fn validate_file_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(ConfigError::ValidationFailed(format!(
            "Expected a plain file name, got: '{}'",
            name
        )));
    }
    Ok(())
}

/// Validate resolved `make -j` parallelism.
pub fn validate_job_count(jobs: u32) -> Result<(), ConfigError> {
    if jobs == 0 {
        return Err(ConfigError::ValidationFailed(
            "JOBS must be at least 1".to_string(),
        ));
    }
    Ok(())
}
