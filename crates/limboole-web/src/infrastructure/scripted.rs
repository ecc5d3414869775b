//! Deterministic in-process solver for tests and demos.
//!
//! [`ScriptedModule`] behaves like a real foreign module as far as the
//! bridge can tell: it drains its input through the stdin hook and prints
//! its reply byte by byte through the stdout/stderr hooks.  What it prints
//! is decided by a closure, so tests can script any solver behaviour
//! without a solver binary.
//!
//! Every `solve` call is recorded and can be inspected through a
//! [`ScriptedHandle`] after the module has been moved into a processor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use limboole_core::bridge::dispatch;
use limboole_core::ForeignModule;

use crate::application::processor::{LoadError, ModuleLoader};

/// What the scripted solver prints and returns for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl Reply {
    /// Successful reply with stdout output only.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            ..Self::default()
        }
    }
}

/// One recorded `solve` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveCall {
    pub arg_count: usize,
    pub args: Vec<String>,
    pub mode_selector: i32,
    pub input: String,
    pub input_len: usize,
    /// What was read through the stdin hook.
    pub pulled: String,
    /// `true` if the very first `read_byte()` returned end of input.
    pub first_pull_was_eof: bool,
}

type Responder = Box<dyn Fn(i32, &str) -> Reply>;

/// A foreign module whose output is produced by a closure.
pub struct ScriptedModule {
    respond: Responder,
    calls: Rc<RefCell<Vec<SolveCall>>>,
    starts: Rc<Cell<u32>>,
}

/// Read-only view of a [`ScriptedModule`]'s call log.
#[derive(Debug, Clone)]
pub struct ScriptedHandle {
    calls: Rc<RefCell<Vec<SolveCall>>>,
    starts: Rc<Cell<u32>>,
}

impl ScriptedModule {
    /// `respond` receives the mode selector and the input read through the
    /// stdin hook.
    pub fn new(respond: impl Fn(i32, &str) -> Reply + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Rc::new(RefCell::new(Vec::new())),
            starts: Rc::new(Cell::new(0)),
        }
    }

    pub fn handle(&self) -> ScriptedHandle {
        ScriptedHandle {
            calls: Rc::clone(&self.calls),
            starts: Rc::clone(&self.starts),
        }
    }
}

impl ScriptedHandle {
    pub fn calls(&self) -> Vec<SolveCall> {
        self.calls.borrow().clone()
    }

    pub fn start_count(&self) -> u32 {
        self.starts.get()
    }
}

impl ForeignModule for ScriptedModule {
    fn start(&mut self) -> i32 {
        self.starts.set(self.starts.get() + 1);
        // Startup sees an empty stdin, like the solver's initial main().
        let _ = dispatch::read_byte();
        dispatch::write_stdout_str("scripted solver ready\n");
        0
    }

    fn solve(
        &mut self,
        arg_count: usize,
        args: &[String],
        mode_selector: i32,
        input: &str,
        input_len: usize,
    ) -> i32 {
        let mut pulled = Vec::with_capacity(input_len);
        while let Some(b) = dispatch::read_byte() {
            pulled.push(b);
        }
        let pulled = String::from_utf8_lossy(&pulled).into_owned();

        self.calls.borrow_mut().push(SolveCall {
            arg_count,
            args: args.to_vec(),
            mode_selector,
            input: input.to_string(),
            input_len,
            first_pull_was_eof: pulled.is_empty(),
            pulled: pulled.clone(),
        });

        let reply = (self.respond)(mode_selector, &pulled);
        dispatch::write_stdout_str(&reply.stdout);
        dispatch::write_stderr_str(&reply.stderr);
        reply.status
    }
}

/// Loader handing out a prepared [`ScriptedModule`] (or a prepared error).
pub struct ScriptedLoader {
    outcome: RefCell<Option<Result<ScriptedModule, LoadError>>>,
}

impl ScriptedLoader {
    pub fn new(module: ScriptedModule) -> Self {
        Self {
            outcome: RefCell::new(Some(Ok(module))),
        }
    }

    pub fn failing(error: LoadError) -> Self {
        Self {
            outcome: RefCell::new(Some(Err(error))),
        }
    }
}

#[async_trait(?Send)]
impl ModuleLoader for ScriptedLoader {
    async fn load(&self) -> Result<Box<dyn ForeignModule>, LoadError> {
        let outcome = self
            .outcome
            .borrow_mut()
            .take()
            .unwrap_or(Err(LoadError::AlreadyLoaded));
        outcome.map(|m| Box::new(m) as Box<dyn ForeignModule>)
    }
}

/// Loader whose load never completes: the processor stays loading forever.
#[derive(Debug, Default)]
pub struct NeverLoader;

#[async_trait(?Send)]
impl ModuleLoader for NeverLoader {
    async fn load(&self) -> Result<Box<dyn ForeignModule>, LoadError> {
        std::future::pending().await
    }
}
