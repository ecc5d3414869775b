//! Per-run bridge state.
//!
//! A [`BridgeContext`] is created for exactly one run.  It owns the input
//! bytes and the cursor into them, one [`LineBuffer`] per output channel,
//! and the two line sinks supplied by the caller.  Because every run gets a
//! fresh context, nothing buffered in one run can leak into the next.

use std::fmt;

use tracing::debug;

use super::line_buffer::{BlankLinePolicy, LineBuffer};
use crate::domain::run::Channel;

/// Receives completed lines of one channel, synchronously, in order.
pub type LineSink = Box<dyn FnMut(&str)>;

/// Input cursor, output buffers and sinks of the current run.
pub struct BridgeContext {
    input: Vec<u8>,
    cursor: usize,
    stdout: LineBuffer,
    stderr: LineBuffer,
    on_stdout: LineSink,
    on_stderr: LineSink,
}

impl BridgeContext {
    pub fn new(
        input: &str,
        policy: BlankLinePolicy,
        on_stdout: LineSink,
        on_stderr: LineSink,
    ) -> Self {
        Self {
            input: input.as_bytes().to_vec(),
            cursor: 0,
            stdout: LineBuffer::new(policy),
            stderr: LineBuffer::new(policy),
            on_stdout,
            on_stderr,
        }
    }

    /// Context used while the module runs its one-time startup routine:
    /// empty input, and output only goes to the debug log.
    pub fn startup(policy: BlankLinePolicy) -> Self {
        Self::new(
            "",
            policy,
            Box::new(|line| debug!(target: "limboole::startup", "stdout: {}", line.trim_end())),
            Box::new(|line| debug!(target: "limboole::startup", "stderr: {}", line.trim_end())),
        )
    }

    /// Next input byte, or `None` once the input is exhausted.
    ///
    /// Never blocks and never suspends; once `None` has been returned every
    /// further call returns `None` as well.
    pub fn pull_input_byte(&mut self) -> Option<u8> {
        let byte = self.input.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    pub fn push_output_byte(&mut self, byte: u8) {
        if let Some(line) = self.stdout.push(byte) {
            (self.on_stdout)(&line);
        }
    }

    pub fn push_error_byte(&mut self, byte: u8) {
        if let Some(line) = self.stderr.push(byte) {
            (self.on_stderr)(&line);
        }
    }

    pub fn push(&mut self, channel: Channel, byte: u8) {
        match channel {
            Channel::Stdout => self.push_output_byte(byte),
            Channel::Stderr => self.push_error_byte(byte),
        }
    }

    /// Number of input bytes consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ends the run: any unterminated residue of each channel is delivered
    /// to that channel's own sink.
    pub fn finish(mut self) {
        if let Some(residue) = self.stdout.take_residue() {
            (self.on_stdout)(&residue);
        }
        if let Some(residue) = self.stderr.take_residue() {
            (self.on_stderr)(&residue);
        }
    }
}

impl fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeContext")
            .field("input_len", &self.input.len())
            .field("cursor", &self.cursor)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .finish_non_exhaustive()
    }
}
