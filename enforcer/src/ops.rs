use std::fs::OpenOptions;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// File metadata operations applied to disk images.
pub trait MetadataOps: Send + Sync {
    fn set_mode(&self, path: &Path, mode: u32) -> std::io::Result<()>;

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> std::io::Result<()>;
}

/// Applies changes to the local filesystem. Neither operation follows a
/// symlink at `path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostOps;

impl MetadataOps for HostOps {
    fn set_mode(&self, path: &Path, mode: u32) -> std::io::Result<()> {
        // O_NONBLOCK keeps a fifo swapped in at `path` from blocking the open.
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOFOLLOW | libc::O_NONBLOCK)
            .open(path)?;
        if !file.metadata()?.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        file.set_permissions(std::fs::Permissions::from_mode(mode))
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
        std::os::unix::fs::lchown(path, Some(uid), Some(gid))
    }
}

impl<T: MetadataOps + ?Sized> MetadataOps for std::sync::Arc<T> {
    fn set_mode(&self, path: &Path, mode: u32) -> std::io::Result<()> {
        (**self).set_mode(path, mode)
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
        (**self).set_owner(path, uid, gid)
    }
}
