// Publish pipeline: stage a zip of the working directory in a scratch
// directory, send it, and drop the scratch directory again.

use crate::api::{PackageTransport, UploadResponse};
use crate::archive::zip_directory;
use crate::error::{BjspmError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ARCHIVE_FILE_NAME: &str = "package.zip";

/// One publish run. Owns the scratch directory, which is deleted with
/// everything inside it when the job is dropped, on success or failure.
pub struct UploadJob {
    scratch: TempDir,
    archive_path: PathBuf,
    source_directory: PathBuf,
}

#[derive(Debug)]
pub struct PublishReport {
    pub archive_path: PathBuf,
    pub files: usize,
    pub response: UploadResponse,
}

impl UploadJob {
    /// Acquire a fresh scratch directory for archiving `source_directory`.
    pub fn new(source_directory: impl Into<PathBuf>) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("bjspm-")
            .tempdir()
            .map_err(|e| BjspmError::io("Failed to create temporary directory", std::env::temp_dir(), e))?;
        log::debug!("scratch directory {}", scratch.path().display());
        let archive_path = scratch.path().join(ARCHIVE_FILE_NAME);
        Ok(UploadJob {
            scratch,
            archive_path,
            source_directory: source_directory.into(),
        })
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Archive, then transmit. Stops at the first failing step.
    pub fn run(&self, transport: &dyn PackageTransport) -> Result<PublishReport> {
        let files = zip_directory(&self.source_directory, &self.archive_path)?;
        log::info!("archived {files} files into {}", self.archive_path.display());
        let response = transport.upload_package(&self.archive_path)?;
        log::info!("upload finished with status {}", response.status);
        Ok(PublishReport {
            archive_path: self.archive_path.clone(),
            files,
            response,
        })
    }

    /// Remove the scratch directory now and report any failure.
    /// Dropping the job does the same but ignores errors.
    pub fn close(self) -> Result<()> {
        let path = self.scratch.path().to_path_buf();
        self.scratch
            .close()
            .map_err(|e| BjspmError::io("Failed to remove temporary directory", path, e))
    }
}

/// Publish `source_directory` through `transport`. The scratch directory
/// is gone when this returns, whatever the outcome.
pub fn publish(source_directory: &Path, transport: &dyn PackageTransport) -> Result<PublishReport> {
    let job = UploadJob::new(source_directory)?;
    let report = job.run(transport)?;
    Ok(keep_report(report, job.close()))
}

/// The upload already happened, so a failed cleanup only gets a warning.
fn keep_report(report: PublishReport, cleanup: Result<()>) -> PublishReport {
    if let Err(e) = cleanup {
        log::warn!("{e}");
    }
    report
}
