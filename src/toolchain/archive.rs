//! Source archive integrity checks and extraction.

use crate::error::BuildError;
use crate::orchestrator::executor::CommandSpec;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Fully decode a gzip file to make sure it is complete and really gzip.
///
/// Catches truncated transfers and HTML error pages saved under a `.tar.gz` name.
pub async fn verify_gzip(path: &Path) -> Result<u64, BuildError> {
    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || decode_all(&owned))
        .await
        .map_err(|e| BuildError::ArchiveCorrupt(format!("verification task failed: {}", e)))?
}

fn decode_all(path: &Path) -> Result<u64, BuildError> {
    let file = File::open(path)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));
    let size = io::copy(&mut decoder, &mut io::sink())
        .map_err(|e| BuildError::ArchiveCorrupt(format!("{}: {}", path.display(), e)))?;

    if size == 0 {
        return Err(BuildError::ArchiveCorrupt(format!(
            "{}: archive is empty",
            path.display()
        )));
    }
    Ok(size)
}

/// Verify a freshly downloaded archive, deleting it when it is unusable.
pub async fn accept_download(path: &Path) -> Result<(), BuildError> {
    match verify_gzip(path).await {
        Ok(size) => {
            log::debug!("[Archive] {} decodes to {} bytes", path.display(), size);
            Ok(())
        }
        Err(e) => {
            log::error!("[Archive] Removing corrupt download {}: {}", path.display(), e);
            if let Err(rm) = tokio::fs::remove_file(path).await {
                log::warn!("[Archive] Could not remove {}: {}", path.display(), rm);
            }
            Err(e)
        }
    }
}

/// Written into a source tree once `tar` has unpacked it completely.
pub const EXTRACTED_STAMP: &str = ".toolchain-bootstrap-extracted";

pub fn extraction_stamp(source_dir: &Path) -> PathBuf {
    source_dir.join(EXTRACTED_STAMP)
}

/// True only for a source tree unpacked by a run that saw `tar` succeed.
/// A bare directory may be left over from an interrupted extraction.
pub fn is_extracted(source_dir: &Path) -> bool {
    extraction_stamp(source_dir).is_file()
}

pub fn mark_extracted(source_dir: &Path) -> Result<(), BuildError> {
    std::fs::write(extraction_stamp(source_dir), b"")?;
    Ok(())
}

/// `tar -xf <archive>` run from the toolchain root.
pub fn extract_command(archive: &Path, root: &Path) -> CommandSpec {
    CommandSpec::new("tar")
        .arg("-xf")
        .arg(archive.to_string_lossy())
        .current_dir(root)
}
