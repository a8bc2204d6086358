//! procid-core — process identity resolution on top of `/proc`.
//!
//! Provides:
//! - `collector` — filesystem abstraction, `/proc` parsers, `ProcFs` handle
//! - `identity` — the namespace-independent unique id construction
//! - `config` — mount point settings

pub mod collector;
pub mod config;
pub mod identity;
