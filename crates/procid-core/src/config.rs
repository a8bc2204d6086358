//! Configuration for opening a proc filesystem.

use std::path::PathBuf;

/// Default mount point of the proc filesystem.
pub const DEFAULT_MOUNT_POINT: &str = "/proc";

/// Settings used by `ProcFs::from_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcConfig {
    /// Where the proc filesystem is mounted.
    pub mount_point: PathBuf,
    /// Check that the mount point is a live procfs for this process before use.
    pub verify_mount: bool,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            verify_mount: true,
        }
    }
}

impl ProcConfig {
    pub fn new(mount_point: impl Into<PathBuf>, verify_mount: bool) -> Self {
        Self {
            mount_point: mount_point.into(),
            verify_mount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcConfig::default();
        assert_eq!(config.mount_point, PathBuf::from("/proc"));
        assert!(config.verify_mount);
    }

    #[test]
    fn test_custom_config() {
        let config = ProcConfig::new("/host/proc", false);
        assert_eq!(config.mount_point, PathBuf::from("/host/proc"));
        assert!(!config.verify_mount);
    }
}
