//! Per-process lookups against a proc filesystem mount.

use crate::collector::procfs::error::ProcError;
use crate::collector::procfs::parser::{
    Cgroup, container_id, parse_boot_id, parse_cgroups, parse_cmdline, parse_self_link,
};
use crate::collector::procfs::status::ProcessStatus;
use crate::collector::traits::{FileSystem, RealFs};
use crate::config::ProcConfig;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Location of the boot id, relative to the mount point.
pub const BOOT_ID_PATH: &str = "sys/kernel/random/boot_id";

/// A mounted proc filesystem.
///
/// All lookups resolve paths relative to `mount_point`. When running inside
/// a container the default `/proc` reflects the container's pid namespace;
/// the unique id of a process is the same from either side.
pub struct ProcFs<F: FileSystem> {
    fs: F,
    mount_point: PathBuf,
    /// Read at most once, success or failure.
    boot_id: OnceLock<Result<String, ProcError>>,
}

impl<F: FileSystem> ProcFs<F> {
    /// Creates a handle without checking the mount point.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `mount_point` - Base path of the proc filesystem (usually "/proc")
    pub fn new(fs: F, mount_point: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            mount_point: mount_point.into(),
            boot_id: OnceLock::new(),
        }
    }

    /// Creates a handle from `config`, verifying the mount if requested.
    pub fn from_config(fs: F, config: &ProcConfig) -> Result<Self, ProcError> {
        let procfs = Self::new(fs, config.mount_point.clone());
        if config.verify_mount {
            procfs.verify_mount()?;
        }
        Ok(procfs)
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Resolves `relative` against the mount point.
    ///
    /// A leading `/` is ignored, so `/sys/kernel/random/boot_id` and
    /// `sys/kernel/random/boot_id` name the same file.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        self.mount_point
            .join(relative.strip_prefix("/").unwrap_or(relative))
    }

    /// Returns the contents of the file at `relative`.
    pub fn read_file(&self, relative: impl AsRef<Path>) -> Result<Vec<u8>, ProcError> {
        let path = self.path(relative);
        self.fs.read(&path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "read failed");
            ProcError::from_io(&path, &e)
        })
    }

    /// Checks that the mount point is a proc filesystem for this process.
    ///
    /// The mount point must be a directory and `<mount>/self` must link to
    /// the pid of the running process.
    pub fn verify_mount(&self) -> Result<(), ProcError> {
        let mount = &self.mount_point;
        if !self.fs.exists(mount) {
            return Err(ProcError::unavailable(mount, "not found"));
        }
        if !self.fs.is_dir(mount) {
            return Err(ProcError::unavailable(mount, "not a directory"));
        }

        let self_link = self.path("self");
        let target = self
            .fs
            .read_link(&self_link)
            .map_err(|e| ProcError::unavailable(&self_link, format!("couldn't read link: {}", e)))?;
        let pid = parse_self_link(&target)
            .map_err(|e| ProcError::unavailable(&self_link, e.message))?;

        let own = std::process::id();
        if pid != own {
            return Err(ProcError::unavailable(
                &self_link,
                format!("points to wrong pid: {} (expected {})", pid, own),
            ));
        }

        debug!(mount = %mount.display(), pid, "verified proc mount");
        Ok(())
    }

    /// Full command-line arguments of `pid`.
    ///
    /// Short-lived processes may already be gone by the time this runs; that
    /// surfaces as `NotFound` or an empty list.
    pub fn command_line(&self, pid: i32) -> Result<Vec<String>, ProcError> {
        let content = self.read_file(format!("{}/cmdline", pid))?;
        Ok(parse_cmdline(&content))
    }

    /// Cgroup membership of `pid`, in file order.
    pub fn cgroups(&self, pid: i32) -> Result<Vec<Cgroup>, ProcError> {
        let relative = format!("{}/cgroup", pid);
        let content = self.read_file(&relative)?;
        parse_cgroups(&String::from_utf8_lossy(&content))
            .map_err(|e| ProcError::malformed(&self.path(&relative), e.message))
    }

    /// Docker container id of `pid`, or `None` when it is not in a
    /// (legacy cgroup v1) Docker container.
    pub fn container_id(&self, pid: i32) -> Result<Option<String>, ProcError> {
        let cgroups = self.cgroups(pid)?;
        Ok(container_id(&cgroups).map(str::to_string))
    }

    /// Reads `/proc/[pid]/stat`. Fields are parsed on demand.
    pub fn stat(&self, pid: i32) -> Result<ProcessStatus, ProcError> {
        let relative = format!("{}/stat", pid);
        let content = self.read_file(&relative)?;
        Ok(ProcessStatus::parse(
            self.path(&relative),
            &String::from_utf8_lossy(&content),
        ))
    }

    /// Reproducible namespace-independent unique id of `pid`.
    pub fn unique_id(&self, pid: i32) -> Result<String, ProcError> {
        let status = self.stat(pid)?;
        let boot_id = self.boot_id()?;
        status.unique_id(boot_id).map(str::to_string)
    }

    /// Boot id of the running kernel.
    ///
    /// The file is read once per handle, even under concurrent first calls;
    /// a failed read is cached too and reported as `SourceUnavailable`.
    pub fn boot_id(&self) -> Result<&str, ProcError> {
        self.boot_id
            .get_or_init(|| self.load_boot_id())
            .as_ref()
            .map(String::as_str)
            .map_err(Clone::clone)
    }

    fn load_boot_id(&self) -> Result<String, ProcError> {
        let path = self.path(BOOT_ID_PATH);
        let content = self
            .fs
            .read(&path)
            .map_err(|e| ProcError::unavailable(&path, e.to_string()))?;
        let boot_id = parse_boot_id(&String::from_utf8_lossy(&content))
            .map_err(|e| ProcError::malformed(&path, e.message))?;
        debug!(boot_id = %boot_id, "loaded boot id");
        Ok(boot_id)
    }
}

static HOST: OnceLock<Result<ProcFs<RealFs>, ProcError>> = OnceLock::new();

/// The process-wide handle for the default `/proc` mount.
///
/// Created and verified on first use; later calls return the same handle
/// (or the same verification error).
pub fn host() -> Result<&'static ProcFs<RealFs>, ProcError> {
    HOST.get_or_init(|| ProcFs::from_config(RealFs::new(), &ProcConfig::default()))
        .as_ref()
        .map_err(Clone::clone)
}
