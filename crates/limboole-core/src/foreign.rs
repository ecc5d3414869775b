//! The call contract of the foreign solver module.
//!
//! A foreign module is a blocking computation that talks to the world only
//! through the hooks in [`crate::bridge::dispatch`]: it pulls input with
//! `read_byte()` and pushes output with `write_stdout_byte()` /
//! `write_stderr_byte()`.  The host never hands it a callback or a context
//! object; the dispatch slot does the routing.
//!
//! Implementations must be driven from one thread and are not reentrant.

/// A loaded solver that can be invoked synchronously.
pub trait ForeignModule {
    /// One-time startup routine, run once right after loading and before
    /// the first [`solve`](ForeignModule::solve).  Hooks are live while it
    /// runs (empty input, output goes to the log).  Returns the routine's
    /// status code.
    fn start(&mut self) -> i32;

    /// Solves `input` in the mode given by `mode_selector`.
    ///
    /// `args` is an argv-style vector of which the first `arg_count` entries
    /// are meaningful; entry 0 is the program name.  `input_len` is the byte
    /// length of `input`.  The module may read the input either from `input`
    /// or through the stdin hook.  Returns the solver's status code; non-zero
    /// codes are accompanied by a diagnostic written to stderr.
    fn solve(
        &mut self,
        arg_count: usize,
        args: &[String],
        mode_selector: i32,
        input: &str,
        input_len: usize,
    ) -> i32;
}
