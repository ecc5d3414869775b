//! # limboole-core
//!
//! Shared library for the Limboole web front-end containing the run modes,
//! the URL-fragment codec, and the synchronous byte-stream bridge that lets a
//! blocking, byte-oriented solver run inside an event-driven host.
//!
//! This crate has no dependencies on async runtimes, processes, or UI
//! toolkits.  Everything in it is synchronous and deterministic.
//!
//! # Architecture overview (for beginners)
//!
//! The solver ("foreign module") was written as a classic command-line tool:
//! it calls `getchar()` to read its input one byte at a time and `putchar()`
//! to print one byte at a time.  It has no idea who is calling it.  The host
//! on the other hand thinks in *lines* and *callbacks*: "append this line to
//! the output pane".
//!
//! - **`domain`** – The vocabulary of a run: which mode to use
//!   ([`ModeKind`]), what was asked ([`RunRequest`]), what came back
//!   ([`RunResult`]), and how the last run is echoed into the URL fragment
//!   ([`UrlState`]).
//!
//! - **`bridge`** – The adapter between the two worlds.  A [`BridgeContext`]
//!   owns the input cursor and one [`LineBuffer`] per output channel.  The
//!   free functions in [`bridge::dispatch`] are the hooks the solver calls;
//!   they forward to whichever context is currently active.
//!
//! - **`foreign`** – The [`ForeignModule`] trait: the narrow call contract
//!   every solver back-end implements.

pub mod bridge;
pub mod domain;
pub mod foreign;

// Re-export the most-used types at the crate root so callers can write
// `limboole_core::ModeKind` instead of `limboole_core::domain::mode::ModeKind`.
pub use bridge::context::{BridgeContext, LineSink};
pub use bridge::dispatch::{ActiveContext, DispatchError};
pub use bridge::line_buffer::{BlankLinePolicy, LineBuffer};
pub use domain::mode::ModeKind;
pub use domain::run::{Channel, OutputLine, RunRequest, RunResult, RunStatus};
pub use domain::url_state::{UrlState, UrlStateError};
pub use foreign::ForeignModule;
