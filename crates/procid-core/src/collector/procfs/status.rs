//! Lazily parsed `/proc/[pid]/stat` record.

use crate::collector::procfs::error::ProcError;
use crate::collector::procfs::parser::{
    ParseError, parse_i32_field, parse_u64_field, stat_field, strip_comm, tokenize_stat,
};
use crate::identity::derive_unique_id;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

/// 0-based positions of the fields read from `/proc/[pid]/stat`.
const PID_FIELD: usize = 0;
const COMM_FIELD: usize = 1;
const PPID_FIELD: usize = 3;
const STARTTIME_FIELD: usize = 22 - 1;
const STARTSTACK_FIELD: usize = 28 - 1;

/// Process status read from `/proc/[pid]/stat`.
///
/// Only tokenization happens up front. Each typed field is parsed on first
/// access and cached in a `OnceLock`, so a record can be shared between
/// threads and a corrupt field only fails the accessors that need it.
#[derive(Debug)]
pub struct ProcessStatus {
    source: PathBuf,
    fields: Vec<String>,
    pid: OnceLock<i32>,
    ppid: OnceLock<i32>,
    start_time: OnceLock<u64>,
    start_stack: OnceLock<u64>,
    unique_id: OnceLock<String>,
}

impl ProcessStatus {
    /// Builds a record from the contents of the stat file at `source`.
    pub fn parse(source: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            source: source.into(),
            fields: tokenize_stat(content),
            pid: OnceLock::new(),
            ppid: OnceLock::new(),
            start_time: OnceLock::new(),
            start_stack: OnceLock::new(),
            unique_id: OnceLock::new(),
        }
    }

    /// Path the record was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Raw positional fields, command name still parenthesised.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// PID of the process (field 1).
    pub fn pid(&self) -> Result<i32, ProcError> {
        self.cached(&self.pid, || parse_i32_field(&self.fields, PID_FIELD, "pid"))
    }

    /// Command name (the kernel's `comm`), without its parentheses.
    pub fn command(&self) -> Result<&str, ProcError> {
        stat_field(&self.fields, COMM_FIELD, "comm")
            .map(strip_comm)
            .map_err(|e| self.malformed(e))
    }

    /// PID of the parent process (field 4).
    pub fn parent_pid(&self) -> Result<i32, ProcError> {
        self.cached(&self.ppid, || parse_i32_field(&self.fields, PPID_FIELD, "ppid"))
    }

    /// Start time in clock ticks after system boot (field 22).
    pub fn start_time(&self) -> Result<u64, ProcError> {
        self.cached(&self.start_time, || {
            parse_u64_field(&self.fields, STARTTIME_FIELD, "starttime")
        })
    }

    /// Address of the start (bottom) of the stack (field 28).
    pub fn start_stack(&self) -> Result<u64, ProcError> {
        self.cached(&self.start_stack, || {
            parse_u64_field(&self.fields, STARTSTACK_FIELD, "startstack")
        })
    }

    /// Reproducible unique id of this process instance.
    ///
    /// `boot_id` must be the boot id of the host the record was read on; the
    /// first computed value is cached for the lifetime of the record.
    pub fn unique_id(&self, boot_id: &str) -> Result<&str, ProcError> {
        if let Some(id) = self.unique_id.get() {
            return Ok(id.as_str());
        }
        let id = derive_unique_id(boot_id, self.start_stack()?, self.start_time()?);
        Ok(self.unique_id.get_or_init(|| id).as_str())
    }

    fn cached<T: Copy>(
        &self,
        cell: &OnceLock<T>,
        parse: impl FnOnce() -> Result<T, ParseError>,
    ) -> Result<T, ProcError> {
        if let Some(value) = cell.get() {
            return Ok(*value);
        }
        let value = parse().map_err(|e| self.malformed(e))?;
        Ok(*cell.get_or_init(|| value))
    }

    fn malformed(&self, err: ParseError) -> ProcError {
        warn!(path = %self.source.display(), error = %err.message, "malformed stat record");
        ProcError::malformed(&self.source, err.message)
    }
}
