//! The processor: one loaded solver module and the runs executed against it.
//!
//! # Lifecycle
//!
//! ```text
//! Processor::spawn(loader)
//!     │  (async, on the LocalSet)
//!     ▼
//! loader.load()  ──Err──>  readiness = Failed(..)   (never becomes ready)
//!     │ Ok(module)
//!     ▼
//! module.start() inside the startup context
//!     ▼
//! ready = true, readiness = Ready   (exactly once, never reverts)
//! ```
//!
//! # Runs
//!
//! [`Processor::run`] is synchronous.  It builds a fresh
//! [`BridgeContext`](limboole_core::BridgeContext) for the run, activates
//! it in the dispatch slot, calls the module's `solve` entry point, and
//! flushes each channel's unterminated residue to that channel's sink once
//! the call returns.  The host thread is busy for the whole solve; this is
//! inherent to a blocking foreign computation.
//!
//! # Why `Rc` and `Cell` instead of `Arc` and `Mutex`?
//!
//! The host is single-threaded: the processor lives on a tokio `LocalSet`
//! and the dispatch slot is thread-local.  Interior mutability with `Cell`
//! and `RefCell` is enough, and it makes the "one run at a time" rule a
//! simple flag check instead of a lock.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use limboole_core::{
    ActiveContext, BlankLinePolicy, BridgeContext, Channel, DispatchError, ForeignModule,
    ModeKind, OutputLine, RunRequest, RunResult, RunStatus,
};

// ── Error types ───────────────────────────────────────────────────────────────

/// Reasons a run request is rejected before or while reaching the solver.
///
/// A non-zero solver status is *not* an error: it is returned in
/// [`RunStatus`] and the solver's own diagnostic is in the stderr output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    /// The solver module has not finished loading.
    #[error("the solver is still loading, please try again in a moment")]
    NotReady,

    /// The selected mode is listed but reserved.
    #[error("{0} is not available yet")]
    ModeDisabled(String),

    /// The selector pointed past the list of modes.
    #[error("no mode at index {0}")]
    UnknownMode(usize),

    /// Another run is still in flight on this processor.
    #[error("a solver run is already in progress")]
    Busy,
}

impl From<DispatchError> for RunError {
    fn from(_: DispatchError) -> Self {
        RunError::Busy
    }
}

/// Failures while loading the solver module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The configured solver executable could not be found.
    #[error("solver executable not found: {}", .0.display())]
    SolverNotFound(PathBuf),

    /// Loading failed for another reason (I/O, startup).
    #[error("failed to load solver: {0}")]
    Failed(String),

    /// `load` was called a second time on the same processor.
    #[error("solver module is already loading or loaded")]
    AlreadyLoaded,

    /// A configured extra argument would override the mode's own flags.
    #[error("extra solver argument '{0}' conflicts with the mode flags")]
    ConflictingArgument(String),
}

// ── Loader trait ──────────────────────────────────────────────────────────────

/// Produces the foreign module asynchronously.
///
/// `?Send` because modules are driven from the single host thread.
#[async_trait(?Send)]
pub trait ModuleLoader {
    /// Loads (or locates) the solver and returns it ready for `start`.
    async fn load(&self) -> Result<Box<dyn ForeignModule>, LoadError>;
}

// ── Readiness ─────────────────────────────────────────────────────────────────

/// Published state of the module load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(String),
}

// ── Processor ─────────────────────────────────────────────────────────────────

/// Owns one foreign module and runs requests against it.
pub struct Processor {
    module: RefCell<Option<Box<dyn ForeignModule>>>,
    ready: Cell<bool>,
    load_started: Cell<bool>,
    in_flight: Cell<bool>,
    policy: BlankLinePolicy,
    readiness: watch::Sender<Readiness>,
}

impl Processor {
    /// Creates a processor that is not loading anything yet.
    pub fn new(policy: BlankLinePolicy) -> Rc<Self> {
        let (readiness, _) = watch::channel(Readiness::Loading);
        Rc::new(Self {
            module: RefCell::new(None),
            ready: Cell::new(false),
            load_started: Cell::new(false),
            in_flight: Cell::new(false),
            policy,
            readiness,
        })
    }

    /// Creates a processor and starts loading its module in the background.
    ///
    /// Must be called from within a tokio `LocalSet`.
    pub fn spawn<L>(loader: L, policy: BlankLinePolicy) -> Rc<Self>
    where
        L: ModuleLoader + 'static,
    {
        let processor = Self::new(policy);
        let task = Rc::clone(&processor);
        tokio::task::spawn_local(async move {
            // Failures are logged and published through `readiness`.
            let _ = task.load(&loader).await;
        });
        processor
    }

    /// Loads the module through `loader`, runs its startup routine and
    /// marks the processor ready.
    ///
    /// # Errors
    ///
    /// - [`LoadError::AlreadyLoaded`] if a load was started before.
    /// - Whatever the loader reports; the processor then stays not-ready.
    pub async fn load(&self, loader: &dyn ModuleLoader) -> Result<(), LoadError> {
        if self.load_started.replace(true) {
            warn!("ignoring second load request");
            return Err(LoadError::AlreadyLoaded);
        }

        info!("loading solver module");
        let result = match loader.load().await {
            Ok(module) => self.install(module),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!(error = %e, "solver module failed to load");
            self.readiness.send_replace(Readiness::Failed(e.to_string()));
        }
        result
    }

    fn install(&self, mut module: Box<dyn ForeignModule>) -> Result<(), LoadError> {
        debug!("running solver startup routine");
        let startup = BridgeContext::startup(self.policy);
        let status = with_context(startup, || module.start())
            .map_err(|e| LoadError::Failed(e.to_string()))?;

        *self.module.borrow_mut() = Some(module);
        self.ready.set(true);
        self.readiness.send_replace(Readiness::Ready);
        info!(startup_status = status, "solver module ready");
        Ok(())
    }

    /// `true` once the module has loaded and started.  Never reverts.
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    /// A receiver observing the load state; any number may be taken.
    pub fn readiness(&self) -> watch::Receiver<Readiness> {
        self.readiness.subscribe()
    }

    /// Resolves once the module is ready, or with the load error.
    ///
    /// # Errors
    ///
    /// [`LoadError::Failed`] carrying the loader's message.
    pub async fn wait_ready(&self) -> Result<(), LoadError> {
        let mut rx = self.readiness.subscribe();
        // The sender lives in `self`, which this future borrows, so the
        // channel cannot close while we wait.  Receivers taken through
        // `readiness()` are the only ones that can outlive it.
        let state = rx
            .wait_for(|r| *r != Readiness::Loading)
            .await
            .map_err(|_| LoadError::Failed("readiness channel closed".to_string()))?
            .clone();
        match state {
            Readiness::Failed(message) => Err(LoadError::Failed(message)),
            _ => Ok(()),
        }
    }

    /// Runs the solver once, delivering output lines synchronously to the
    /// two sinks as they complete.
    ///
    /// # Errors
    ///
    /// - [`RunError::NotReady`] before the module is ready; the module is
    ///   not touched.
    /// - [`RunError::Busy`] if called while another run is in flight.
    pub fn run(
        &self,
        input: &str,
        mode: ModeKind,
        on_stdout: impl FnMut(&str) + 'static,
        on_stderr: impl FnMut(&str) + 'static,
    ) -> Result<RunStatus, RunError> {
        if !self.ready.get() {
            debug!(mode = ?mode, "run rejected: solver not ready");
            return Err(RunError::NotReady);
        }
        if self.in_flight.replace(true) {
            return Err(RunError::Busy);
        }
        let _in_flight = InFlight(&self.in_flight);

        let mut slot = self.module.try_borrow_mut().map_err(|_| RunError::Busy)?;
        let module = slot.as_mut().ok_or(RunError::NotReady)?;

        debug!(mode = ?mode, input_len = input.len(), "starting solver run");
        let ctx = BridgeContext::new(input, self.policy, Box::new(on_stdout), Box::new(on_stderr));
        let args = [String::new()];
        let code = with_context(ctx, || {
            module.solve(args.len(), &args, mode.selector(), input, input.len())
        })?;

        let status = RunStatus(code);
        if status.is_success() {
            debug!(mode = ?mode, "solver run finished");
        } else {
            warn!(mode = ?mode, status = code, "solver returned non-zero status");
        }
        Ok(status)
    }

    /// Runs `request` and collects every output line.
    ///
    /// # Errors
    ///
    /// Same as [`Processor::run`].
    pub fn run_request(&self, request: &RunRequest) -> Result<RunResult, RunError> {
        let lines: Rc<RefCell<Vec<OutputLine>>> = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&lines);
        let err = Rc::clone(&lines);

        let status = self.run(
            request.input_text(),
            request.mode(),
            move |text| {
                out.borrow_mut().push(OutputLine {
                    channel: Channel::Stdout,
                    text: text.to_string(),
                })
            },
            move |text| {
                err.borrow_mut().push(OutputLine {
                    channel: Channel::Stderr,
                    text: text.to_string(),
                })
            },
        )?;

        Ok(RunResult {
            lines: lines.take(),
            status,
        })
    }
}

/// Clears the in-flight flag when the run ends, including by panic.
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Activates `ctx` for the duration of `f`, then flushes its residue.
fn with_context<R>(ctx: BridgeContext, f: impl FnOnce() -> R) -> Result<R, DispatchError> {
    let guard = ActiveContext::enter(ctx)?;
    let value = f();
    if let Some(ctx) = guard.release() {
        ctx.finish();
    }
    Ok(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
