//! A [`Page`] rendered on the terminal.
//!
//! The stdout pane is the process's stdout and the stderr pane is its
//! stderr, so solver output can be piped like the native binary's.  Notices
//! and the share fragment go to the stderr writer with a prefix; state
//! changes that have no terminal equivalent (loading, run button) are only
//! logged.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::application::controller::Page;

/// Terminal-backed page.  Generic over the writers so tests can capture
/// output in `Vec<u8>`.
#[derive(Debug)]
pub struct TerminalPage<O: Write, E: Write> {
    input: String,
    options: Vec<(String, bool)>,
    selected: usize,
    fragment: Option<String>,
    out: O,
    err: E,
}

impl<O: Write, E: Write> TerminalPage<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            input: String::new(),
            options: Vec::new(),
            selected: 0,
            fragment: None,
            out,
            err,
        }
    }

    /// Starts with `fragment` as the location, as if opened from a shared link.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_selected_mode(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    /// Label and enabled flag of every selector option.
    pub fn options(&self) -> &[(String, bool)] {
        &self.options
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_out(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            warn!(error = %e, "failed to write to stdout pane");
        }
    }

    fn write_err(&mut self, text: &str) {
        if let Err(e) = self.err.write_all(text.as_bytes()) {
            warn!(error = %e, "failed to write to stderr pane");
        }
    }
}

impl<O: Write, E: Write> Page for TerminalPage<O, E> {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn set_input_text(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn clear_output(&mut self) {
        // A terminal cannot take back what it printed; flush what is pending.
        let _ = self.out.flush();
        let _ = self.err.flush();
    }

    fn append_stdout(&mut self, line: &str) {
        self.write_out(line);
    }

    fn append_stderr(&mut self, line: &str) {
        self.write_err(line);
    }

    fn add_mode_option(&mut self, index: usize, label: &str, enabled: bool) {
        debug!(index, label, enabled, "mode option");
        self.options.push((label.to_string(), enabled));
    }

    fn selected_mode(&self) -> usize {
        self.selected
    }

    fn select_mode(&mut self, index: usize) {
        self.selected = index;
    }

    fn fragment(&self) -> Option<String> {
        self.fragment.clone()
    }

    fn set_fragment(&mut self, fragment: &str) {
        info!(fragment, "share link updated");
        self.fragment = Some(fragment.to_string());
        self.write_err(&format!("share: {fragment}\n"));
    }

    fn show_notice(&mut self, message: &str) {
        warn!(notice = message, "notice shown");
        self.write_err(&format!("limboole-web: {message}\n"));
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            info!("loading solver");
        } else {
            info!("solver loaded");
        }
    }

    fn set_run_enabled(&mut self, enabled: bool) {
        debug!(enabled, "run control");
    }
}
