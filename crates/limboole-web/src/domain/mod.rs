//! Domain layer for limboole-web.
//!
//! Only plain configuration types live here.  Reading them from disk is the
//! job of `infrastructure::config_store`; overriding them from the command
//! line happens in `main.rs`.

pub mod config;

pub use config::{LogConfig, OutputConfig, SolverConfig, WebConfig};
