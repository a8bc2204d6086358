//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets `ProcFs` read from the real `/proc` mount on
//! Linux or from an in-memory `MockFs` in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// Implementations are pure pass-through: no retries and no caching.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads the entire contents of a file as a string.
    ///
    /// Fails with `InvalidData` when the contents are not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns the target of a symbolic link.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdline");
        std::fs::write(&path, b"ls\0-la\0").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read(&path).unwrap(), b"ls\0-la\0");
    }

    #[test]
    fn test_real_fs_read_to_string_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stat");
        std::fs::write(&path, [0xff, 0xfe]).unwrap();

        let err = RealFs::new().read_to_string(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_real_fs_exists_and_is_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("boot_id");
        std::fs::write(&file, "abc\n").unwrap();

        let fs = RealFs::new();
        assert!(fs.exists(&file));
        assert!(!fs.is_dir(&file));
        assert!(fs.is_dir(dir.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_read_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("self");
        std::os::unix::fs::symlink("4242", &link).unwrap();

        assert_eq!(RealFs::new().read_link(&link).unwrap(), PathBuf::from("4242"));
    }

    #[test]
    fn test_real_fs_missing_file() {
        let err = RealFs::new()
            .read(Path::new("/nonexistent/path/12345"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
