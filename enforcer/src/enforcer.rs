//! Ownership and mode repair for disk images.
//!
//! The hypervisor runs as an unprivileged user that did not create the disk
//! images, so every image under the disk root is made group/world writable and
//! handed to that user before the domain is started.

use crate::error::EnforcerError;
use crate::ops::{HostOps, MetadataOps};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_DISK_ROOT: &str = "/var/run/kubevirt-private/vmi-disks";
pub const IMAGE_SUFFIX: &str = "img";
pub const INSECURE_MODE: u32 = 0o666;
pub const QEMU_UID: u32 = 107;
pub const QEMU_GID: u32 = 107;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcerConfig {
    pub root: PathBuf,
    pub suffix: String,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_DISK_ROOT),
            suffix: IMAGE_SUFFIX.to_string(),
            mode: INSECURE_MODE,
            uid: QEMU_UID,
            gid: QEMU_GID,
        }
    }
}

/// Outcome of one pass over the disk root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnforceReport {
    /// Regular files carrying the image suffix.
    pub candidates: usize,
    /// Candidates whose mode was set.
    pub corrected: usize,
    /// Candidates whose owner could not be changed.
    pub owner_failures: usize,
    /// Entries that could not be inspected.
    pub skipped: usize,
}

pub struct DiskPermissionEnforcer<O = HostOps> {
    config: EnforcerConfig,
    ops: O,
}

impl DiskPermissionEnforcer<HostOps> {
    pub fn new(config: EnforcerConfig) -> Self {
        Self::with_ops(config, HostOps)
    }
}

impl<O: MetadataOps> DiskPermissionEnforcer<O> {
    pub fn with_ops(config: EnforcerConfig, ops: O) -> Self {
        Self { config, ops }
    }

    /// Walks the disk root and fixes mode and owner of every image file.
    ///
    /// Symlinks are never followed. Entries that cannot be read are logged and
    /// skipped. A failed mode change ends the walk with an error; a failed owner
    /// change is logged and the walk goes on. A missing root is not an error.
    pub fn enforce(&self) -> Result<EnforceReport, EnforcerError> {
        let root = &self.config.root;
        if let Err(e) = std::fs::symlink_metadata(root) {
            if e.kind() == std::io::ErrorKind::NotFound {
                tracing::debug!(root = ?root, "disk root does not exist, nothing to do");
                return Ok(EnforceReport::default());
            }
        }

        tracing::info!(root = ?root, "looking for disk images");

        let report = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .try_fold(EnforceReport::default(), |report, entry| {
                self.visit(report, entry)
            })?;

        tracing::info!(
            root = ?root,
            candidates = report.candidates,
            corrected = report.corrected,
            owner_failures = report.owner_failures,
            skipped = report.skipped,
            "disk permission pass finished"
        );
        Ok(report)
    }

    fn visit(
        &self,
        mut report: EnforceReport,
        entry: walkdir::Result<DirEntry>,
    ) -> Result<EnforceReport, EnforcerError> {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(path = ?e.path(), error = %e, "failed walking path");
                report.skipped += 1;
                return Ok(report);
            }
        };

        if !self.is_candidate(&entry) {
            return Ok(report);
        }
        report.candidates += 1;

        let path = entry.path();
        tracing::info!(file = ?path, "is a candidate");

        self.apply_mode(path)?;
        report.corrected += 1;

        let (uid, gid) = (self.config.uid, self.config.gid);
        if let Err(e) = self.ops.set_owner(path, uid, gid) {
            tracing::error!(path = ?path, error = %e, "failed to change file owner");
            report.owner_failures += 1;
        }

        tracing::info!(
            uid,
            gid,
            path = ?path,
            mode = %format!("{:#o}", self.config.mode),
            "set ownership/permission on file"
        );
        Ok(report)
    }

    fn apply_mode(&self, path: &Path) -> Result<(), EnforcerError> {
        let mode = self.config.mode;
        self.ops.set_mode(path, mode).map_err(|source| {
            tracing::error!(path = ?path, error = %source, "failed to change file permissions");
            EnforcerError::SetMode {
                path: path.to_path_buf(),
                mode,
                source,
            }
        })
    }

    fn is_candidate(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(self.config.suffix.as_str()))
    }
}
