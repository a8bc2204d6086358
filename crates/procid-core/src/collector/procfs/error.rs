//! Error taxonomy for `/proc` lookups and the caller-chosen fatality policy.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Coarse classification of a [`ProcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The process or file does not exist (or the process has exited).
    NotFound,
    /// The file exists but cannot be read by this process.
    PermissionDenied,
    /// The file was read but its contents do not follow the kernel format.
    MalformedRecord,
    /// The source could not be read for any other reason.
    SourceUnavailable,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::NotFound,
        ErrorKind::PermissionDenied,
        ErrorKind::MalformedRecord,
        ErrorKind::SourceUnavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::MalformedRecord => "malformed",
            ErrorKind::SourceUnavailable => "source-unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for `/proc` lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcError {
    /// File is missing, usually because the process is gone.
    NotFound { path: PathBuf },
    /// File exists but is not readable.
    PermissionDenied { path: PathBuf },
    /// File contents could not be parsed.
    MalformedRecord { path: PathBuf, message: String },
    /// Any other read failure, including an unusable mount point.
    SourceUnavailable { path: PathBuf, message: String },
}

impl ProcError {
    /// Classifies an I/O error raised while reading `path`.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => ProcError::NotFound { path },
            io::ErrorKind::PermissionDenied => ProcError::PermissionDenied { path },
            _ => ProcError::SourceUnavailable {
                path,
                message: err.to_string(),
            },
        }
    }

    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        ProcError::MalformedRecord {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn unavailable(path: &Path, message: impl Into<String>) -> Self {
        ProcError::SourceUnavailable {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcError::NotFound { .. } => ErrorKind::NotFound,
            ProcError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ProcError::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            ProcError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
        }
    }

    /// Path of the file the error relates to.
    pub fn path(&self) -> &Path {
        match self {
            ProcError::NotFound { path }
            | ProcError::PermissionDenied { path }
            | ProcError::MalformedRecord { path, .. }
            | ProcError::SourceUnavailable { path, .. } => path,
        }
    }
}

impl fmt::Display for ProcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcError::NotFound { path } => write!(f, "{} not found", path.display()),
            ProcError::PermissionDenied { path } => {
                write!(f, "permission denied reading {}", path.display())
            }
            ProcError::MalformedRecord { path, message } => {
                write!(f, "malformed record in {}: {}", path.display(), message)
            }
            ProcError::SourceUnavailable { path, message } => {
                write!(f, "{} unavailable: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ProcError {}

/// Decides which error kinds abort a lookup and which mean "absent".
///
/// The default treats a missing or unreadable process as absent and a
/// corrupt kernel interface as fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPolicy {
    fatal: Vec<ErrorKind>,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::new([ErrorKind::MalformedRecord, ErrorKind::SourceUnavailable])
    }
}

impl ErrorPolicy {
    pub fn new(fatal: impl IntoIterator<Item = ErrorKind>) -> Self {
        let mut kinds: Vec<ErrorKind> = Vec::new();
        for kind in fatal {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Self { fatal: kinds }
    }

    /// Every error is fatal.
    pub fn strict() -> Self {
        Self::new(ErrorKind::ALL)
    }

    /// No error is fatal; every failure reads as an absent result.
    pub fn lenient() -> Self {
        Self::new([])
    }

    pub fn is_fatal(&self, kind: ErrorKind) -> bool {
        self.fatal.contains(&kind)
    }

    pub fn fatal_kinds(&self) -> &[ErrorKind] {
        &self.fatal
    }

    /// Turns non-fatal errors into `Ok(None)` and propagates fatal ones.
    pub fn absorb<T>(&self, result: Result<T, ProcError>) -> Result<Option<T>, ProcError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.is_fatal(e.kind()) => Err(e),
            Err(_) => Ok(None),
        }
    }
}
