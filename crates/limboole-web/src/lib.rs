//! limboole-web library crate.
//!
//! This crate hosts the Limboole solver behind a page-like front-end: the
//! user types a formula, picks a mode, and the solver's verdict appears line
//! by line in the output pane.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Page (input area, panes, selector, URL fragment)
//!         ↕
//! [limboole-web]
//!   ├── domain/           Pure types: WebConfig
//!   ├── application/
//!   │     ├── processor/  Async module load, readiness, synchronous runs
//!   │     ├── wrapper/    Named modes bound to the shared processor
//!   │     └── controller/ Page glue: run, URL fragment, drop, shortcut
//!   └── infrastructure/
//!         ├── process_module/ Solver executable driven over pipes
//!         ├── scripted/       Deterministic in-process solver double
//!         ├── terminal_page/  `Page` backed by stdout/stderr
//!         └── config_store/   TOML config file loading
//!         ↕
//! limboole-core (byte-stream bridge, dispatch slot, modes, URL codec)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain`, `limboole-core` and tokio's sync
//!   primitives only; every outside collaborator is a trait (`ModuleLoader`,
//!   `Page`).
//! - `infrastructure` implements those traits against processes, files and
//!   the terminal.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: processor, modes and page controller.
pub mod application;

/// Infrastructure layer: solver process, terminal page, config file.
pub mod infrastructure;
