//! System module: host detection and the environment handed to external build tools

pub mod paths;

use crate::models::HostPlatform;

/// Toolchain variables stripped from the environment of `configure`.
///
/// A cross build must not pick up the host's compiler, linker or flags.
pub const CLEARED_TOOLCHAIN_VARS: [&str; 8] = [
    "CFLAGS",
    "ASMFLAGS",
    "CC",
    "CXX",
    "LD",
    "ASM",
    "LINK_FLAGS",
    "LIBS",
];

/// Detect the platform this process is running on.
pub fn detect_host() -> HostPlatform {
    HostPlatform::from_os_name(std::env::consts::OS)
}

/// Toolchain variables currently set in this process that the child will not see.
pub fn inherited_toolchain_vars() -> Vec<(String, String)> {
    CLEARED_TOOLCHAIN_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
        .collect()
}

/// Logging macros for milestone messages
#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        // target="parsed" routes to the milestone log and the console
        $crate::log::info!(target: "parsed", "{}", msg);
    }}
}
