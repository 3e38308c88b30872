//! Phase 2: NASM acquisition.
//!
//! Only Windows hosts install NASM from the upstream installer. Everywhere
//! else NASM is expected from the host package manager and this phase does
//! nothing.

use super::PhaseContext;
use crate::error::BuildError;
use crate::log_parsed;
use crate::models::{DownloadProgress, Tool};
use crate::orchestrator::state::BootstrapReport;
use crate::toolchain::{recipes, ToolSource};

pub async fn acquire_nasm(ctx: &PhaseContext<'_>, report: &mut BootstrapReport) -> Result<(), BuildError> {
    if !ctx.host.is_windows() {
        log::info!("[NASM] Host is {}, NASM comes from the system package manager", ctx.host);
        report.skipped.push("nasm: not a Windows host".to_string());
        return Ok(());
    }

    let source = ToolSource::for_tool(ctx.config, ctx.registry, Tool::Nasm);
    let on_progress = |p: DownloadProgress| (ctx.on_progress)(Tool::Nasm, p);

    log_parsed!("Acquiring NASM {}", ctx.config.nasm.version);
    let downloaded = ctx
        .downloader
        .ensure_archive(&source.url, &source.archive, &on_progress)
        .await?;
    if downloaded {
        report.downloaded.push(Tool::Nasm);
    } else {
        report
            .skipped
            .push(format!("download {}", source.archive_name));
    }

    let install = recipes::nasm_install_command(&source.archive, ctx.registry.root());
    ctx.runner.run(&install).await?;
    report.commands_run.push(install.display());
    log_parsed!("NASM {} installed", ctx.config.nasm.version);
    Ok(())
}
