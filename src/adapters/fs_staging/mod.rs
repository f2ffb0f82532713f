// Staging filesystem adapter - Temporary copies of uploads

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Outcome of deleting a set of files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseReport {
    pub removed: Vec<PathBuf>,
    /// Paths that were already gone
    pub missing: Vec<PathBuf>,
    /// Paths that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Temporary file store rooted at one session's staging directory
#[derive(Debug, Clone)]
pub struct TempFileStore {
    root: PathBuf,
}

impl TempFileStore {
    /// Create a store, making sure its directory exists
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            DomainError::Io(format!(
                "Failed to create staging directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write bytes to a new uniquely named file and return its path.
    ///
    /// Failures (disk full, permissions) are returned to the caller as-is.
    pub fn stage(&self, bytes: &[u8], suffix: &str) -> Result<PathBuf, DomainError> {
        let mut temp_file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(suffix)
            .tempfile_in(&self.root)?;

        temp_file.write_all(bytes)?;
        temp_file.flush()?;

        let (_, path) = temp_file
            .keep()
            .map_err(|e| DomainError::Io(format!("Failed to keep staged file: {}", e)))?;

        debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Stage an upload under the widget identity it arrived with
    pub fn stage_upload(&self, upload: &Upload, key: &IdentityToken) -> Result<StagedFile, DomainError> {
        let suffix = upload.kind.staging_suffix(&upload.name)?;
        let path = self.stage(&upload.bytes, &suffix)?;
        Ok(StagedFile {
            path,
            source_name: upload.name.clone(),
            byte_len: upload.byte_len(),
            upload_key: key.clone(),
        })
    }

    /// Delete files if present. Absent paths are not errors, so releasing twice is harmless.
    pub fn release<I, P>(&self, paths: I) -> ReleaseReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = ReleaseReport::default();

        for path in paths {
            let path = path.as_ref();
            match fs::remove_file(path) {
                Ok(()) => {
                    debug!("Released {}", path.display());
                    report.removed.push(path.to_path_buf());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    report.missing.push(path.to_path_buf());
                }
                Err(e) => {
                    warn!("Failed to release {}: {}", path.display(), e);
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        report
    }

    /// Delete staged files that no session entry references any more
    pub fn sweep(&self, keep: &[PathBuf]) -> ReleaseReport {
        let kept: HashSet<OsString> = keep
            .iter()
            .filter_map(|path| path.file_name().map(|name| name.to_os_string()))
            .collect();

        let orphans: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !kept.contains(entry.file_name()))
            .map(|entry| entry.into_path())
            .collect();

        if !orphans.is_empty() {
            debug!("Sweeping {} orphaned staged files", orphans.len());
        }
        self.release(orphans)
    }
}
