//! Requests, output lines and results of a solver run.

use serde::{Deserialize, Serialize};

use super::mode::ModeKind;

/// The formula text and the mode it should be checked with.
///
/// A request is immutable once built; a new run needs a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    input_text: String,
    mode: ModeKind,
}

impl RunRequest {
    pub fn new(input_text: impl Into<String>, mode: ModeKind) -> Self {
        Self {
            input_text: input_text.into(),
            mode,
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn mode(&self) -> ModeKind {
        self.mode
    }
}

/// Output channel of the foreign module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
        }
    }
}

/// One line emitted by the solver, including its trailing newline when the
/// solver printed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub channel: Channel,
    pub text: String,
}

/// Status code returned by the solver's entry point.
///
/// Zero means the solver ran to completion.  Non-zero values are reported
/// as-is; the solver prints its own diagnostic to stderr before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus(pub i32);

impl RunStatus {
    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// Everything a run produced, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub lines: Vec<OutputLine>,
    pub status: RunStatus,
}

impl RunResult {
    /// Concatenation of all lines on `channel`.
    pub fn text(&self, channel: Channel) -> String {
        self.lines
            .iter()
            .filter(|l| l.channel == channel)
            .map(|l| l.text.as_str())
            .collect()
    }

    pub fn stdout(&self) -> String {
        self.text(Channel::Stdout)
    }

    pub fn stderr(&self) -> String {
        self.text(Channel::Stderr)
    }
}
