//! Build recipes: the exact configure, make and install invocations per tool.
//!
//! These argument lists are the contract with the binutils and GCC build
//! systems and are reproduced verbatim.

use crate::config::ToolchainConfig;
use crate::models::{Tool, ToolPaths};
use crate::orchestrator::executor::CommandSpec;
use crate::system::CLEARED_TOOLCHAIN_VARS;
use std::path::Path;

/// Tool-specific configure flags, appended after `--prefix` and `--target`.
pub fn configure_flags(tool: Tool) -> &'static [&'static str] {
    match tool {
        Tool::Binutils => &["--with-sysroot", "--disable-nls", "--disable-werror"],
        Tool::Gcc => &[
            "--disable-nls",
            "--enable-languages=c,c++",
            "--without-headers",
        ],
        Tool::Nasm => &[],
    }
}

/// Targets for the main `make` invocation. Empty means the default target.
pub fn build_targets(tool: Tool) -> &'static [&'static str] {
    match tool {
        Tool::Gcc => &["all-gcc", "all-target-libgcc"],
        Tool::Binutils | Tool::Nasm => &[],
    }
}

/// Install targets, one `make` invocation each, in order.
pub fn install_targets(tool: Tool) -> &'static [&'static str] {
    match tool {
        Tool::Binutils => &["install"],
        Tool::Gcc => &["install-gcc", "install-target-libgcc"],
        Tool::Nasm => &[],
    }
}

/// Full configure argument list for a tool.
pub fn configure_args(config: &ToolchainConfig, paths: &ToolPaths) -> Vec<String> {
    let mut args = vec![
        format!("--prefix={}", paths.install_prefix.display()),
        format!("--target={}", config.target),
    ];
    args.extend(configure_flags(paths.tool).iter().map(|f| f.to_string()));
    args
}

/// `<source_dir>/configure ...` run inside the build directory with the
/// host toolchain variables removed.
pub fn configure_command(config: &ToolchainConfig, paths: &ToolPaths) -> CommandSpec {
    CommandSpec::new(paths.source_dir.join("configure"))
        .args(configure_args(config, paths))
        .current_dir(&paths.build_dir)
        .env_remove(CLEARED_TOOLCHAIN_VARS)
}

/// `make -j<jobs> -C <build_dir> [targets...]`
pub fn make_command(jobs: u32, build_dir: &Path, targets: &[&str]) -> CommandSpec {
    CommandSpec::new("make")
        .arg(format!("-j{}", jobs))
        .arg("-C")
        .arg(build_dir.to_string_lossy())
        .args(targets.iter().copied())
}

/// Every command of the build for one tool, configure first.
pub fn build_sequence(config: &ToolchainConfig, paths: &ToolPaths) -> Vec<CommandSpec> {
    let mut sequence = vec![
        configure_command(config, paths),
        make_command(config.jobs, &paths.build_dir, build_targets(paths.tool)),
    ];
    sequence.extend(
        install_targets(paths.tool)
            .iter()
            .map(|target| make_command(config.jobs, &paths.build_dir, &[*target])),
    );
    sequence
}

/// Silent NASM installer run: `<installer> /S` from the toolchain root.
pub fn nasm_install_command(installer: &Path, root: &Path) -> CommandSpec {
    CommandSpec::new(installer).arg("/S").current_dir(root)
}
