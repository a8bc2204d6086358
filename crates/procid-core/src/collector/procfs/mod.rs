//! Readers for the Linux `/proc` filesystem.
//!
//! This module provides the parsers, the lazily parsed status record and
//! the `ProcFs` handle that ties them to a mount point.

pub mod error;
pub mod parser;
pub mod process;
pub mod status;

pub use error::{ErrorKind, ErrorPolicy, ProcError};
pub use parser::{Cgroup, ParseError};
pub use process::{BOOT_ID_PATH, ProcFs, host};
pub use status::ProcessStatus;
