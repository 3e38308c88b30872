//! Phases 3 and 4: binutils and GCC.
//!
//! Per tool: fetch the archive if missing, make sure the build directory
//! exists, then extract, configure, make and install. A Windows host stops
//! after the build directory step with `UnsupportedPlatform`, before any
//! external command is issued.

use super::PhaseContext;
use crate::error::BuildError;
use crate::log_collector::FILE_ONLY_TARGET;
use crate::log_parsed;
use crate::models::{DownloadProgress, Tool};
use crate::orchestrator::state::BootstrapReport;
use crate::system::inherited_toolchain_vars;
use crate::toolchain::{archive, recipes, ToolSource};

pub async fn build_tool(
    ctx: &PhaseContext<'_>,
    tool: Tool,
    report: &mut BootstrapReport,
) -> Result<(), BuildError> {
    let paths = ctx.registry.tool_paths(ctx.config, tool);
    let source = ToolSource::for_tool(ctx.config, ctx.registry, tool);
    let version = ctx.config.version(tool);
    log_parsed!("==> {} {}", tool, version);

    // Source archive
    let on_progress = |p: DownloadProgress| (ctx.on_progress)(tool, p);
    let downloaded = ctx
        .downloader
        .ensure_archive(&source.url, &source.archive, &on_progress)
        .await?;
    if downloaded {
        if source.is_tarball() {
            archive::accept_download(&source.archive).await?;
        }
        report.downloaded.push(tool);
    } else {
        report
            .skipped
            .push(format!("download {}", paths.archive_name));
    }

    // Build directory
    if paths.build_dir.is_dir() {
        report
            .skipped
            .push(format!("create {}", paths.build_dir.display()));
    } else {
        std::fs::create_dir_all(&paths.build_dir)?;
        log::info!("[Build] Created {}", paths.build_dir.display());
        report.created_dirs.push(paths.build_dir.clone());
    }

    if ctx.host.is_windows() {
        log::error!(
            target: FILE_ONLY_TARGET,
            "[Build] Building {} on {} is not implemented",
            tool,
            ctx.host
        );
        return Err(BuildError::UnsupportedPlatform {
            tool: tool.to_string(),
            host: ctx.host.to_string(),
        });
    }

    // Extraction. A source tree without the stamp is unpacked again over
    // whatever an interrupted run left behind.
    if archive::is_extracted(&paths.source_dir) {
        report
            .skipped
            .push(format!("extract {}", paths.archive_name));
    } else {
        log_parsed!("Extracting {}", paths.archive_name);
        let extract = archive::extract_command(&paths.archive, ctx.registry.root());
        ctx.runner.run(&extract).await?;
        report.commands_run.push(extract.display());

        if !paths.source_dir.is_dir() {
            return Err(BuildError::ArchiveCorrupt(format!(
                "{} did not unpack into {}",
                paths.archive_name,
                paths.source_dir.display()
            )));
        }
        archive::mark_extracted(&paths.source_dir)?;
        report.extracted.push(tool);
    }

    for (name, value) in inherited_toolchain_vars() {
        log::info!("[Build] Hiding {}={} from configure", name, value);
    }

    for command in recipes::build_sequence(ctx.config, &paths) {
        log_parsed!("Running {}", command.display());
        ctx.runner.run(&command).await?;
        report.commands_run.push(command.display());
    }

    log_parsed!(
        "{} {} installed into {}",
        tool,
        version,
        paths.install_prefix.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ToolchainConfig, ToolchainSettings};
    use crate::models::HostPlatform;
    use crate::orchestrator::executor::testing::RecordingRunner;
    use crate::system::paths::PathRegistry;
    use crate::toolchain::Downloader;
    use std::path::Path;
    use tempfile::TempDir;

    fn staged_config(root: &Path) -> ToolchainConfig {
        let config = ToolchainConfig::from_settings(&ToolchainSettings::default(), root).unwrap();
        std::fs::write(root.join("binutils-2.41.tar.gz"), b"archive").unwrap();
        config
    }

    #[tokio::test]
    async fn test_build_runs_configure_then_make() {
        let temp_dir = TempDir::new().unwrap();
        let config = staged_config(temp_dir.path());
        let source_dir = temp_dir.path().join("binutils-2.41");
        std::fs::create_dir(&source_dir).unwrap();
        archive::mark_extracted(&source_dir).unwrap();
        let registry = PathRegistry::new(&config);
        let runner = RecordingRunner::default();
        let downloader = Downloader::new();
        let ctx = PhaseContext {
            config: &config,
            registry: &registry,
            host: &HostPlatform::Linux,
            runner: &runner,
            downloader: &downloader,
            on_progress: &|_: Tool, _: DownloadProgress| {},
        };

        let mut report = BootstrapReport::default();
        build_tool(&ctx, Tool::Binutils, &mut report).await.unwrap();

        let programs: Vec<String> = runner.recorded().iter().map(|c| c.program_name()).collect();
        assert_eq!(programs, vec!["configure", "make", "make"]);
        assert_eq!(report.created_dirs, vec![temp_dir.path().join("build-binutils-2.41")]);
        assert!(report.downloaded.is_empty());
        assert!(report.extracted.is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_tree_is_extracted() {
        let temp_dir = TempDir::new().unwrap();
        let config = staged_config(temp_dir.path());
        let registry = PathRegistry::new(&config);
        let runner = RecordingRunner::default();
        let downloader = Downloader::new();
        let ctx = PhaseContext {
            config: &config,
            registry: &registry,
            host: &HostPlatform::Linux,
            runner: &runner,
            downloader: &downloader,
            on_progress: &|_: Tool, _: DownloadProgress| {},
        };

        // The recording runner does not unpack anything
        let result = build_tool(&ctx, Tool::Binutils, &mut BootstrapReport::default()).await;
        assert!(matches!(result, Err(BuildError::ArchiveCorrupt(_))));

        let commands = runner.recorded();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program_name(), "tar");
    }

    #[tokio::test]
    async fn test_unstamped_source_tree_is_extracted_again() {
        let temp_dir = TempDir::new().unwrap();
        let config = staged_config(temp_dir.path());
        let source_dir = temp_dir.path().join("binutils-2.41");
        std::fs::create_dir(&source_dir).unwrap();
        let registry = PathRegistry::new(&config);
        let runner = RecordingRunner::default();
        let downloader = Downloader::new();
        let ctx = PhaseContext {
            config: &config,
            registry: &registry,
            host: &HostPlatform::Linux,
            runner: &runner,
            downloader: &downloader,
            on_progress: &|_: Tool, _: DownloadProgress| {},
        };

        let mut report = BootstrapReport::default();
        build_tool(&ctx, Tool::Binutils, &mut report).await.unwrap();

        let programs: Vec<String> = runner.recorded().iter().map(|c| c.program_name()).collect();
        assert_eq!(programs, vec!["tar", "configure", "make", "make"]);
        assert_eq!(report.extracted, vec![Tool::Binutils]);
        assert!(archive::is_extracted(&source_dir));
    }

    #[tokio::test]
    async fn test_windows_host_stops_before_commands() {
        let temp_dir = TempDir::new().unwrap();
        let config = staged_config(temp_dir.path());
        let registry = PathRegistry::new(&config);
        let runner = RecordingRunner::default();
        let downloader = Downloader::new();
        let ctx = PhaseContext {
            config: &config,
            registry: &registry,
            host: &HostPlatform::Windows,
            runner: &runner,
            downloader: &downloader,
            on_progress: &|_: Tool, _: DownloadProgress| {},
        };

        let result = build_tool(&ctx, Tool::Binutils, &mut BootstrapReport::default()).await;
        assert!(matches!(result, Err(BuildError::UnsupportedPlatform { .. })));
        assert!(runner.recorded().is_empty());
        assert!(temp_dir.path().join("build-binutils-2.41").is_dir());
    }
}
