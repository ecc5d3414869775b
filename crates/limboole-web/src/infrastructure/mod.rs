//! Infrastructure layer for limboole-web.
//!
//! Everything that touches the outside world lives here.
//!
//! # Responsibilities
//!
//! - Locating the solver executable and driving it over pipes
//! - Presenting the page on the terminal
//! - Reading the TOML configuration file
//! - Providing a scripted in-process solver for tests and demos
//!
//! # What does NOT belong here?
//!
//! - Deciding when to run or what to do with a rejection (application layer)
//! - Configuration types themselves (domain layer)

pub mod config_store;
pub mod process_module;
pub mod scripted;
pub mod terminal_page;

pub use config_store::{load_config, parse_config, ConfigError};
pub use process_module::{ProcessModule, ProcessModuleLoader};
pub use terminal_page::TerminalPage;
