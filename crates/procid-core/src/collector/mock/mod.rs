//! Mock filesystem and fixture scenarios.
//!
//! `MockFs` backs every test in this crate; the scenarios build realistic
//! `/proc` trees for hosts and containerised processes.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{SCENARIO_BOOT_ID, SCENARIO_CONTAINER_ID, stat_line};
