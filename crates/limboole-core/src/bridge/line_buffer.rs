//! Newline framing for one output channel.
//!
//! Bytes are accumulated until a `\n` arrives; the buffered bytes plus the
//! newline then form one completed line.  Bytes are decoded as UTF-8 only
//! when a line is complete, so a multi-byte character split across several
//! pushes comes out intact.  Invalid sequences are replaced with U+FFFD.

use serde::{Deserialize, Serialize};

/// What to do with a newline that arrives while the buffer is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankLinePolicy {
    /// Emit `"\n"` as its own line, so blank output lines survive.
    #[default]
    Preserve,
    /// Drop the newline, so consecutive newlines collapse into one.
    Collapse,
}

/// Accumulates bytes of one channel into lines.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    policy: BlankLinePolicy,
}

impl LineBuffer {
    pub fn new(policy: BlankLinePolicy) -> Self {
        Self {
            buf: Vec::new(),
            policy,
        }
    }

    /// Appends one byte.  Returns the completed line (with its trailing
    /// newline) when `byte` is `\n`.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte != b'\n' {
            self.buf.push(byte);
            return None;
        }

        if self.buf.is_empty() && self.policy == BlankLinePolicy::Collapse {
            return None;
        }

        self.buf.push(b'\n');
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line)
    }

    /// Takes whatever partial line is left, or `None` if nothing is buffered.
    pub fn take_residue(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let residue = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(residue)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn policy(&self) -> BlankLinePolicy {
        self.policy
    }
}
