//! Domain types for a single solver run.
//!
//! Nothing in here performs I/O.  The types describe *what* a run is (mode,
//! input, output lines, status) and how a finished run is persisted in the
//! URL fragment.

pub mod mode;
pub mod run;
pub mod url_state;

pub use mode::ModeKind;
pub use run::{Channel, OutputLine, RunRequest, RunResult, RunStatus};
pub use url_state::{UrlState, UrlStateError};
