//! The solver executable, driven over pipes.
//!
//! [`ProcessModule`] implements [`ForeignModule`] by running the Limboole
//! binary once per `solve` call.  From the bridge's point of view it is
//! indistinguishable from an in-process solver:
//!
//! 1. the formula is pulled byte by byte through the stdin hook,
//! 2. the child is started with the mode's command-line flags,
//! 3. the formula is written to the child's stdin from a helper thread,
//! 4. the child's stdout and stderr are read on two reader threads and
//!    every chunk is pushed through the matching hook as soon as it arrives,
//! 5. the child's exit code becomes the run status.
//!
//! The hooks are thread-local, so step 4 always pushes on the calling
//! thread.  The reader threads only forward tagged chunks over a channel,
//! which keeps the relative order of stdout and stderr output.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use limboole_core::bridge::dispatch;
use limboole_core::{Channel, ForeignModule, ModeKind};
use tracing::{debug, info, warn};

use crate::application::processor::{LoadError, ModuleLoader};
use crate::domain::SolverConfig;

/// Status reported when the solver could not be started at all.
pub const SPAWN_FAILURE_STATUS: i32 = 127;

/// Flags that pick the solver back-end or the question asked.  The mode owns
/// them, so they are refused in `extra_args`.
pub const MODE_CONTROLLED_FLAGS: [&str; 4] = ["-s", "--depqbf", "--picosat", "--lingeling"];

/// Command-line flags selecting a mode, or `None` for an unknown selector.
///
/// | Selector | Mode                     | Flags            |
/// |----------|--------------------------|------------------|
/// | 0        | validity                 | (none)           |
/// | 1        | satisfiability           | `-s`             |
/// | 2        | QBF validity             | `--depqbf`       |
/// | 3        | QBF satisfiability       | `--depqbf -s`    |
pub fn mode_flags(selector: i32) -> Option<Vec<&'static str>> {
    let mode = ModeKind::from_selector(selector)?;
    let mut flags = Vec::new();
    if mode.uses_qbf() {
        flags.push("--depqbf");
    }
    if mode.checks_satisfiability() {
        flags.push("-s");
    }
    Some(flags)
}

/// Runs the solver executable for every request.
#[derive(Debug, Clone)]
pub struct ProcessModule {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl ProcessModule {
    pub fn new(program: impl Into<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn_failed(&self, e: &std::io::Error) -> i32 {
        warn!(program = %self.program.display(), error = %e, "could not start solver");
        dispatch::write_stderr_str(&format!(
            "*** could not start '{}': {e}\n",
            self.program.display()
        ));
        SPAWN_FAILURE_STATUS
    }
}

impl ForeignModule for ProcessModule {
    fn start(&mut self) -> i32 {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(output) => {
                push_all(Channel::Stdout, &output.stdout);
                push_all(Channel::Stderr, &output.stderr);
                exit_code(output.status)
            }
            Err(e) => self.spawn_failed(&e),
        }
    }

    fn solve(
        &mut self,
        _arg_count: usize,
        _args: &[String],
        mode_selector: i32,
        _input: &str,
        input_len: usize,
    ) -> i32 {
        let Some(flags) = mode_flags(mode_selector) else {
            dispatch::write_stderr_str(&format!("*** unknown mode selector {mode_selector}\n"));
            return 1;
        };

        // The formula always comes through the hook, never from `_input`.
        let mut formula = Vec::with_capacity(input_len);
        while let Some(b) = dispatch::read_byte() {
            formula.push(b);
        }

        debug!(
            program = %self.program.display(),
            ?flags,
            bytes = formula.len(),
            "spawning solver"
        );
        let spawned = Command::new(&self.program)
            .args(&flags)
            .args(&self.extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return self.spawn_failed(&e),
        };

        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || {
                if let Err(e) = stdin.write_all(&formula) {
                    debug!(error = %e, "solver closed stdin early");
                }
            })
        });

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, Channel::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, Channel::Stderr, tx));
        }

        // Ends once both readers hit end of file and drop their senders.
        for (channel, chunk) in rx {
            push_all(channel, &chunk);
        }

        if let Some(writer) = writer {
            join_logged(writer, "stdin writer");
        }
        for reader in readers {
            join_logged(reader, "output reader");
        }

        match child.wait() {
            Ok(status) => exit_code(status),
            Err(e) => {
                dispatch::write_stderr_str(&format!("*** solver I/O failed: {e}\n"));
                1
            }
        }
    }
}

/// Reads `source` until end of file, sending each chunk tagged with `channel`.
fn spawn_reader(
    mut source: impl Read + Send + 'static,
    channel: Channel,
    tx: mpsc::Sender<(Channel, Vec<u8>)>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send((channel, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(channel = channel.name(), error = %e, "solver output read failed");
                    break;
                }
            }
        }
    })
}

/// Joins a helper thread; a panic in it is logged, not propagated.
/// Returns `false` if the thread panicked.
fn join_logged(handle: JoinHandle<()>, role: &str) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!(role, "solver helper thread panicked");
            false
        }
    }
}

fn push_all(channel: Channel, bytes: &[u8]) {
    let hook: fn(u8) = match channel {
        Channel::Stdout => dispatch::write_stdout_byte,
        Channel::Stderr => dispatch::write_stderr_byte,
    };
    for &b in bytes {
        hook(b);
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    // Killed by a signal: report a generic failure.
    status.code().unwrap_or(1)
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Locates the solver executable and hands out a [`ProcessModule`].
#[derive(Debug, Clone)]
pub struct ProcessModuleLoader {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl ProcessModuleLoader {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Resolves the configured program to an existing executable.
    ///
    /// Paths are checked as given; bare names are searched on `PATH`.
    async fn resolve(&self) -> Result<PathBuf, LoadError> {
        let program = self.program.clone();
        let found = tokio::task::spawn_blocking(move || which::which(program))
            .await
            .map_err(|e| LoadError::Failed(e.to_string()))?;
        found.map_err(|e| {
            debug!(program = %self.program.display(), error = %e, "solver lookup failed");
            LoadError::SolverNotFound(self.program.clone())
        })
    }

    fn check_extra_args(&self) -> Result<(), LoadError> {
        match self
            .extra_args
            .iter()
            .find(|arg| MODE_CONTROLLED_FLAGS.contains(&arg.as_str()))
        {
            Some(arg) => Err(LoadError::ConflictingArgument(arg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl ModuleLoader for ProcessModuleLoader {
    async fn load(&self) -> Result<Box<dyn ForeignModule>, LoadError> {
        self.check_extra_args()?;
        let program = self.resolve().await?;
        info!(program = %program.display(), "solver executable located");
        Ok(Box::new(ProcessModule::new(program, self.extra_args.clone())))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
