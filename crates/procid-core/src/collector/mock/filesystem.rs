//! In-memory mock filesystem for testing without a real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for testing.
///
/// Stores files, directories and symlinks in memory. Every `read` is counted
/// per path; the counters are shared between clones so a test can keep a
/// handle while a `ProcFs` owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, Vec<u8>>,
    /// Set of directories.
    directories: HashSet<PathBuf>,
    /// Map from link path to link target.
    links: HashMap<PathBuf, PathBuf>,
    /// Paths whose reads fail with `PermissionDenied`.
    denied: HashSet<PathBuf>,
    reads: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.links.insert(path, target.as_ref().to_path_buf());
    }

    /// Makes reads of `path` fail with `PermissionDenied` even if it exists.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        self.denied.insert(path.as_ref().to_path_buf());
    }

    /// Adds a process with the `/proc/[pid]/` files used for identity lookup.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `cgroup` - Content of `/proc/[pid]/cgroup`
    /// * `cmdline` - Content of `/proc/[pid]/cmdline` (NUL-separated)
    pub fn add_process(&mut self, pid: i32, stat: &str, cgroup: &str, cmdline: &[u8]) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("cgroup"), cgroup);
        self.add_file(base.join("cmdline"), cmdline);
    }

    /// Sets `/proc/sys/kernel/random/boot_id`.
    pub fn set_boot_id(&mut self, boot_id: &str) {
        self.add_file("/proc/sys/kernel/random/boot_id", format!("{}\n", boot_id));
    }

    /// Points `/proc/self` at the pid of the running test process.
    pub fn link_self(&mut self) {
        self.add_symlink("/proc/self", std::process::id().to_string());
    }

    /// Number of `read` calls made for `path` so far.
    pub fn reads(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(path.as_ref()).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn count_read(&self, path: &Path) {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(path.to_path_buf()).or_default() += 1;
        }
    }
}

impl FileSystem for MockFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.count_read(path);

        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }

        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.links.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {:?}", path),
            )
        })
    }
}
