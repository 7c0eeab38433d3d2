mod enforcer;
mod error;
mod ops;

pub use enforcer::{
    DEFAULT_DISK_ROOT, DiskPermissionEnforcer, EnforceReport, EnforcerConfig, IMAGE_SUFFIX,
    INSECURE_MODE, QEMU_GID, QEMU_UID,
};
pub use error::EnforcerError;
pub use ops::{HostOps, MetadataOps};
