//! Named modes bound to the shared processor.
//!
//! A [`ProcessorWrapper`] is what the mode selector lists: a label plus the
//! fixed [`ModeKind`] it passes to the solver.  All wrappers share one
//! [`Processor`], so the solver module is loaded once no matter how many
//! modes are offered.

use std::rc::Rc;

use limboole_core::{ModeKind, RunStatus};

use super::processor::{Processor, RunError};

/// A selectable mode: display name, invocation arguments, shared processor.
#[derive(Clone)]
pub struct ProcessorWrapper {
    processor: Rc<Processor>,
    name: String,
    kind: ModeKind,
    enabled: bool,
}

impl ProcessorWrapper {
    pub fn new(processor: Rc<Processor>, name: impl Into<String>, kind: ModeKind) -> Self {
        Self {
            processor,
            name: name.into(),
            kind,
            enabled: kind.is_enabled(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_ready(&self) -> bool {
        self.processor.is_ready()
    }

    /// Checks every precondition of [`run`](Self::run) without running.
    ///
    /// # Errors
    ///
    /// [`RunError::ModeDisabled`] or [`RunError::NotReady`].
    pub fn ensure_runnable(&self) -> Result<(), RunError> {
        if !self.enabled {
            return Err(RunError::ModeDisabled(self.name.clone()));
        }
        if !self.processor.is_ready() {
            return Err(RunError::NotReady);
        }
        Ok(())
    }

    /// Runs `input` in this mode.
    ///
    /// # Errors
    ///
    /// Rejected without side effects while the processor is loading or when
    /// the mode is disabled; see [`Processor::run`] for the rest.
    pub fn run(
        &self,
        input: &str,
        on_stdout: impl FnMut(&str) + 'static,
        on_stderr: impl FnMut(&str) + 'static,
    ) -> Result<RunStatus, RunError> {
        self.ensure_runnable()?;
        self.processor.run(input, self.kind, on_stdout, on_stderr)
    }
}

impl std::fmt::Debug for ProcessorWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorWrapper")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// The modes offered by the front-end, in menu order.  A mode's index in
/// this list is what the URL fragment stores, not its solver selector.
pub fn standard_modes(processor: &Rc<Processor>) -> Vec<ProcessorWrapper> {
    ModeKind::MENU_ORDER
        .into_iter()
        .map(|kind| ProcessorWrapper::new(Rc::clone(processor), kind.display_name(), kind))
        .collect()
}
