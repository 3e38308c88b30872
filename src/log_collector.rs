//! Decoupled logging pipeline for toolchain bootstraps.
//!
//! Every log record and every line of build tool output is persisted to disk
//! by a background writer thread, so a long GCC build leaves a complete
//! transcript even if the console scrolls it away.
//!
//! # Architecture
//!
//! ```text
//! log::info!() / build tool output
//!     |
//! [LogCollector] (non-blocking send, console echo on caller thread)
//!     | (crossbeam unbounded channel)
//!     v
//! [DiskPersister thread]
//!     |
//! logs/full/<ts>_full.log      every line
//! logs/parsed/<ts>_parsed.log  milestones only
//! ```
//!
//! Console policy: milestones go to stdout, warnings and errors to stderr.
//! Records logged with target [`FILE_ONLY_TARGET`] are never echoed. Raw build
//! tool output is only echoed when `echo_output` is set.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Target for records that belong in the full log but not on the console.
pub const FILE_ONLY_TARGET: &str = "file_only";

/// Which log stream a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Detailed output, including everything build tools print
    Full,
    /// High-level milestone
    Parsed,
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    pub kind: LogKind,
    /// Wall-clock time the line was created, `HH:MM:SS.mmm`
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            kind: LogKind::Full,
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            kind: LogKind::Parsed,
            ..LogLine::new(message)
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker with channel sender to signal completion
    Flush(std::sync::mpsc::Sender<()>),
}

/// Unified logger that persists to disk and echoes to the console
#[derive(Clone)]
pub struct LogCollector {
    /// crossbeam unbounded sender, usable from any thread or runtime
    tx: Sender<LogMessage>,
    log_dir: PathBuf,
    /// Log file for this run under `logs/full/`
    session_log: PathBuf,
    /// Echo raw build tool output to stdout
    echo_output: bool,
}

impl LogCollector {
    /// Create a new LogCollector and start its disk writer thread.
    pub fn new(log_dir: PathBuf, echo_output: bool) -> Result<Self, String> {
        let full_log_dir = log_dir.join("full");
        let parsed_log_dir = log_dir.join("parsed");
        std::fs::create_dir_all(&full_log_dir)
            .map_err(|e| format!("Failed to create full log dir: {}", e))?;
        std::fs::create_dir_all(&parsed_log_dir)
            .map_err(|e| format!("Failed to create parsed log dir: {}", e))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let session_log = full_log_dir.join(format!("{}_full.log", stamp));
        let parsed_log = parsed_log_dir.join(format!("{}_parsed.log", stamp));

        let mut full_file = open_append(&session_log)?;
        let mut parsed_file = open_append(&parsed_log)?;

        let (tx, rx) = unbounded::<LogMessage>();

        // OS thread rather than a tokio task: blocking recv() works from any runtime.
        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = line.formatted();
                        let _ = full_file.write_all(formatted.as_bytes());
                        if line.kind == LogKind::Parsed {
                            let _ = parsed_file.write_all(formatted.as_bytes());
                        }
                    }
                    LogMessage::Flush(done) => {
                        let _ = full_file.flush();
                        let _ = parsed_file.flush();
                        let _ = full_file.sync_data();
                        let _ = parsed_file.sync_data();
                        let _ = done.send(());
                    }
                }
            }
            let _ = full_file.flush();
            let _ = parsed_file.flush();
        });

        Ok(LogCollector {
            tx,
            log_dir,
            session_log,
            echo_output,
        })
    }

    /// Directory holding `full/` and `parsed/`
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Full log file for this run
    pub fn session_log_path(&self) -> &Path {
        &self.session_log
    }

    /// Send a log line (non-blocking, cannot fail)
    pub fn push(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Record one line of build tool output.
    pub fn log_output(&self, message: impl Into<String>) {
        let message = message.into();
        if self.echo_output {
            println!("{}", message);
        }
        self.push(LogLine::new(message));
    }

    /// Record a milestone. Always echoed.
    pub fn log_parsed(&self, message: impl Into<String>) {
        let message = message.into();
        println!("{}", message);
        self.push(LogLine::parsed(message));
    }

    /// Block until every line sent before this call has reached disk.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

/// Wires every `log::info!()`, `log::warn!()` ... call into the collector.
impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format!("[{}] {}", record.level(), record.args());

        if record.target() == "parsed" {
            println!("{}", record.args());
            self.push(LogLine::parsed(message));
            return;
        }

        if echoes_to_stderr(record.level(), record.target()) {
            eprintln!("{}", message);
        }
        self.push(LogLine::new(message));
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

/// Register the collector as the process-wide `log` backend.
pub fn install_global_logger(collector: &LogCollector, max_level: log::LevelFilter) -> Result<(), String> {
    log::set_boxed_logger(Box::new(collector.clone()))
        .map(|()| log::set_max_level(max_level))
        .map_err(|e| format!("Failed to set global logger: {}", e))
}

fn echoes_to_stderr(level: Level, target: &str) -> bool {
    level <= Level::Warn && target != FILE_ONLY_TARGET
}

fn open_append(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}
