//! Process identity lookups for Linux.
//!
//! This module reads per-process records from the `/proc` filesystem and
//! turns them into structured metadata and a namespace-independent unique
//! id, with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          ProcFs                             │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │   ProcessStatus     │   │     parser                  │  │
//! │  │  - /proc/[pid]/stat │   │  - /proc/[pid]/cgroup       │  │
//! │  │  - unique id        │   │  - /proc/[pid]/cmdline      │  │
//! │  └──────────┬──────────┘   │  - boot_id, /proc/self      │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procid_core::collector::host;
//!
//! let procfs = host()?;
//! let id = procfs.unique_id(std::process::id() as i32)?;
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procid_core::collector::{MockFs, ProcFs};
//!
//! let procfs = ProcFs::new(MockFs::typical_host(), "/proc");
//! assert_eq!(procfs.stat(1234).unwrap().command(), Ok("bash"));
//! assert_eq!(procfs.unique_id(1234).unwrap().len(), 64);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{
    Cgroup, ErrorKind, ErrorPolicy, ProcError, ProcFs, ProcessStatus, host,
};
pub use traits::{FileSystem, RealFs};
