//! Bootstrap Orchestration: Preparation -> NASM -> binutils -> GCC, strictly sequential.

pub mod executor;
pub mod phases;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use executor::{CommandRunner, CommandSpec, SystemRunner};
pub use state::{BootstrapPhase, BootstrapReport, BootstrapState};

use crate::config::ToolchainConfig;
use crate::error::BuildError;
use crate::log_collector::FILE_ONLY_TARGET;
use crate::log_parsed;
use crate::models::{DownloadProgress, HostPlatform, Tool};
use crate::system::detect_host;
use crate::system::paths::PathRegistry;
use crate::toolchain::{Downloader, SourceTable};
use phases::PhaseContext;

/// Receives download progress for every tool.
pub type ProgressCallback = Arc<dyn Fn(Tool, DownloadProgress) + Send + Sync>;

/// Drives one toolchain bootstrap against an immutable configuration.
#[derive(Clone)]
pub struct Bootstrapper {
    config: Arc<ToolchainConfig>,

    registry: PathRegistry,

    /// Host the build runs on; decides the NASM path and Windows refusal
    host: HostPlatform,

    /// Shared state, readable while a run is in flight
    state: Arc<RwLock<BootstrapState>>,

    runner: Arc<dyn CommandRunner>,

    downloader: Downloader,

    on_progress: ProgressCallback,
}

impl Bootstrapper {
    /// Create a bootstrapper for the detected host.
    pub fn new(config: ToolchainConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let registry = PathRegistry::new(&config);
        Bootstrapper {
            config: Arc::new(config),
            registry,
            host: detect_host(),
            state: Arc::new(RwLock::new(BootstrapState::new())),
            runner,
            downloader: Downloader::new(),
            on_progress: Arc::new(|_: Tool, _: DownloadProgress| {}),
        }
    }

    /// Override the detected host platform.
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    pub async fn current_phase(&self) -> BootstrapPhase {
        self.state.read().await.phase
    }

    pub async fn state_snapshot(&self) -> BootstrapState {
        self.state.read().await.clone()
    }

    /// Transition to the next phase, logging it as a milestone.
    async fn transition_phase(&self, next: BootstrapPhase) -> Result<(), BuildError> {
        self.state.write().await.transition_to(next)?;
        log_parsed!("PHASE: {}", next);
        Ok(())
    }

    /// Run the full bootstrap.
    ///
    /// Every step checks for its own output first, so re-running after a
    /// successful or interrupted run only repeats the configure/make steps.
    pub async fn bootstrap(&self) -> Result<BootstrapReport, BuildError> {
        *self.state.write().await = BootstrapState::new();
        log::info!("[Bootstrap] Host: {}", self.host);
        log::info!("[Bootstrap] Settings:\n  {}", self.config.summary());

        let sources = SourceTable::new(&self.config, &self.registry);
        for source in sources.present_archives() {
            log::info!("[Bootstrap] Found {} from an earlier run", source.archive_name);
        }

        let mut report = BootstrapReport::default();
        match self.run_phases(&mut report).await {
            Ok(()) => {
                let state = self.state.read().await;
                report.phases = state.history.clone();
                if let Ok(elapsed) = state.elapsed_since_start() {
                    log::info!("[Bootstrap] Finished in {:.1}s", elapsed.as_secs_f64());
                }
                log_parsed!("{}", phases::completion_message(&self.config.target));
                Ok(report)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                log::error!(
                    target: FILE_ONLY_TARGET,
                    "[Bootstrap] Failed during {}: {}",
                    state.phase,
                    e
                );
                state.record_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_phases(&self, report: &mut BootstrapReport) -> Result<(), BuildError> {
        let ctx = PhaseContext {
            config: &self.config,
            registry: &self.registry,
            host: &self.host,
            runner: self.runner.as_ref(),
            downloader: &self.downloader,
            on_progress: self.on_progress.as_ref(),
        };

        phases::ensure_root(&self.registry, report)?;

        self.transition_phase(BootstrapPhase::Nasm).await?;
        phases::acquire_nasm(&ctx, report).await?;

        for tool in [Tool::Binutils, Tool::Gcc] {
            self.transition_phase(BootstrapPhase::for_tool(tool)).await?;
            phases::build_tool(&ctx, tool, report).await?;
        }

        self.transition_phase(BootstrapPhase::Completed).await
    }

    /// Remove intermediate source and build trees. Never called by `bootstrap`.
    pub fn cleanup(&self) -> Result<Vec<PathBuf>, BuildError> {
        phases::cleanup_intermediates(&self.config, &self.registry)
    }
}
