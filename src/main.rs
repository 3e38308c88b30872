use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use toolchain_bootstrap::cli::{self, CliOptions};
use toolchain_bootstrap::config::loader;
use toolchain_bootstrap::log_collector::FILE_ONLY_TARGET;
use toolchain_bootstrap::system::paths::PathRegistry;
use toolchain_bootstrap::toolchain::download::render_progress;
use toolchain_bootstrap::{
    install_global_logger, AppError, Bootstrapper, DownloadProgress, LogCollector, SystemRunner,
    Tool,
};

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::cli().get_matches();
    let opts = match CliOptions::try_from(&matches) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::from(1);
        }
    };

    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!(target: FILE_ONLY_TARGET, "{:#}", e);
            log::logger().flush();
            match e.downcast_ref::<AppError>() {
                Some(app) => eprintln!("{}", app.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(1)
        }
    }
}

async fn run(opts: CliOptions) -> anyhow::Result<()> {
    // =========================================================================
    // SETTINGS - loaded before logging, the log directory lives under the root
    // =========================================================================
    let config = loader::load_toolchain_config(&opts.settings_file)
        .map_err(AppError::from)
        .with_context(|| format!("loading {}", opts.settings_file.display()))?;

    // =========================================================================
    // LOG COLLECTOR - wired as the global `log` backend
    // =========================================================================
    let registry = PathRegistry::new(&config);
    let collector = LogCollector::new(registry.logs_dir(), opts.verbose)
        .map_err(AppError::Logging)?;
    let max_level = if opts.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    install_global_logger(&collector, max_level).map_err(AppError::Logging)?;
    let collector = Arc::new(collector);
    log::info!(
        "toolchain-bootstrap {} logging to {}",
        toolchain_bootstrap::VERSION,
        collector.session_log_path().display()
    );

    let runner = Arc::new(SystemRunner::new(Some(collector.clone())));
    let bootstrapper = Bootstrapper::new(config, runner).with_progress(Arc::new(console_progress));

    let result = if opts.clean {
        bootstrapper
            .cleanup()
            .map(|removed| {
                if removed.is_empty() {
                    collector.log_parsed("Nothing to clean up");
                }
            })
            .map_err(AppError::from)
            .context("cleaning intermediate directories")
    } else {
        bootstrapper
            .bootstrap()
            .await
            .map(|report| {
                log::info!(
                    "[Main] downloaded {:?}, extracted {:?}, {} commands, {} steps skipped",
                    report.downloaded,
                    report.extracted,
                    report.commands_run.len(),
                    report.skipped.len()
                );
            })
            .map_err(AppError::from)
            .context("bootstrapping the toolchain")
    };

    if let Err(e) = collector.wait_for_empty() {
        eprintln!("Warning: log flush failed: {}", e);
    }
    result
}

/// Rewrites a single console line: `Downloading: 42.17%`.
fn console_progress(tool: Tool, progress: DownloadProgress) {
    let Some(pct) = progress.percentage() else {
        return;
    };
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}", render_progress(pct));
    if progress.total == Some(progress.received) {
        let _ = writeln!(stdout, " ({})", tool);
    }
    let _ = stdout.flush();
}
