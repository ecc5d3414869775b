//! Application layer for limboole-web.
//!
//! The application layer decides *when* the solver runs and *where* its
//! output goes, but never *how* the solver is reached: that is hidden behind
//! [`ModuleLoader`] and [`ForeignModule`](limboole_core::ForeignModule), and
//! the page behind [`Page`].
//!
//! # Responsibilities
//!
//! - Loading the solver module once and announcing readiness
//! - Running one request at a time through the byte-stream bridge
//! - Offering the named modes and rejecting disabled or premature runs
//! - Keeping the page, the URL fragment and the run in step
//!
//! # What does NOT belong here?
//!
//! - Spawning processes or reading files (that is infrastructure)
//! - Rendering anything (the `Page` implementation does that)

pub mod controller;
pub mod processor;
pub mod wrapper;

pub use controller::{DroppedFile, EventDisposition, KeyPress, Page, UiController, UiEvent};
pub use processor::{LoadError, ModuleLoader, Processor, Readiness, RunError};
pub use wrapper::{standard_modes, ProcessorWrapper};
