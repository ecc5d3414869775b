//! The synchronous byte-stream bridge.
//!
//! The solver pulls its input one byte at a time and pushes its output one
//! byte at a time, without any notion of *who* it is running for.  The host
//! wants whole lines delivered to callbacks.  This module connects the two:
//!
//! ```text
//!  solver                      dispatch slot               BridgeContext
//!  ──────                      ─────────────               ─────────────
//!  read_byte()          ──>   active context?   ──>   pull_input_byte()  (cursor)
//!  write_stdout_byte(b) ──>   active context?   ──>   LineBuffer ─ '\n' ─> on_stdout(line)
//!  write_stderr_byte(b) ──>   active context?   ──>   LineBuffer ─ '\n' ─> on_stderr(line)
//! ```
//!
//! - [`line_buffer`]: byte accumulation and newline framing.
//! - [`context`]: one run's input cursor, buffers and sinks.
//! - [`dispatch`]: the thread-local slot plus the hook functions the solver
//!   calls, and the guard that activates a context for exactly one run.

pub mod context;
pub mod dispatch;
pub mod line_buffer;

pub use context::{BridgeContext, LineSink};
pub use dispatch::{ActiveContext, DispatchError};
pub use line_buffer::{BlankLinePolicy, LineBuffer};
