//! Shared fixtures for integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toolchain_bootstrap::error::BuildError;
use toolchain_bootstrap::orchestrator::{CommandRunner, CommandSpec};

/// Records commands instead of running them. `tar -xf` is simulated by
/// creating the directory the archive would unpack into.
#[derive(Default)]
pub struct FakeRunner {
    commands: Mutex<Vec<CommandSpec>>,
    fail_program: Option<String>,
}

impl FakeRunner {
    pub fn failing_on(program: &str) -> Self {
        FakeRunner {
            commands: Mutex::new(Vec::new()),
            fail_program: Some(program.to_string()),
        }
    }

    pub fn recorded(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    pub fn program_names(&self) -> Vec<String> {
        self.recorded().iter().map(CommandSpec::program_name).collect()
    }

    fn simulate_extract(spec: &CommandSpec) {
        let (Some(archive), Some(cwd)) = (spec.args.get(1), spec.cwd.as_ref()) else {
            return;
        };
        let name = Path::new(archive)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .trim_end_matches(".tar.gz")
            .to_string();
        std::fs::create_dir_all(cwd.join(name)).unwrap();
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> futures::future::BoxFuture<'a, Result<(), BuildError>> {
        Box::pin(async move {
            self.commands.lock().unwrap().push(spec.clone());
            if self.fail_program.as_deref() == Some(spec.program_name().as_str()) {
                return Err(BuildError::CommandFailed {
                    cmd: spec.display(),
                    reason: "exit code 2".to_string(),
                });
            }
            if spec.program_name() == "tar" {
                Self::simulate_extract(spec);
            }
            Ok(())
        })
    }
}

/// A small but valid gzip payload.
pub fn gzip_bytes(payload: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(payload).unwrap();
    encoder.finish().unwrap()
}

/// Settings file contents pointing every URL at `base_url`.
pub fn settings_toml(base_url: &str) -> String {
    format!(
        r#"
["Build Info"]
TARGET = "i686-elf"

["Toolchain Versions"]
BINUTILS_VERSION = "2.41"
GCC_VERSION = "13.2.0"
NASM_VERSION = "2.16.01"

[Urls]
BINUTILS_URL = "{base}/binutils-BINUTILS_VERSION.tar.gz"
GCC_URL = "{base}/gcc-GCC_VERSION.tar.gz"
NASM_URL_WIN = "{base}/nasm-NASM_VERSION-installer-x64.exe"

[Executables]
NASM_EXE_WIN = "nasm-NASM_VERSION-installer-x64.exe"

[ADVANCED]
JOBS = 2
"#,
        base = base_url
    )
}

/// Write a settings file into `dir` and return its path.
pub fn write_settings(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("toolchain_settings.toml");
    std::fs::write(&path, settings_toml(base_url)).unwrap();
    path
}
