//! The hook table the foreign module calls, and the slot it dispatches to.
//!
//! The solver's stdio hooks take no instance argument: `read_byte()` has to
//! figure out on its own *which* run it belongs to.  This module keeps a
//! single thread-local slot holding the currently active [`BridgeContext`];
//! the hook functions forward to it.
//!
//! # Activation discipline
//!
//! A context is placed in the slot by [`ActiveContext::enter`] and removed
//! either by [`ActiveContext::release`] (normal path, returns the context so
//! its residue can be flushed) or by the guard's `Drop` (early return or
//! panic inside the solver).  The slot therefore never outlives its run.
//!
//! Entering while another context is active is refused, so a second run can
//! never overwrite the cursor or buffers of one already in flight.
//!
//! # Calls outside a run
//!
//! A hook call with no active context is a wiring bug in the host.  It is
//! logged at `error` and then panics with an `UNHANDLED <CHANNEL>` message,
//! rather than silently dropping the byte.

use std::cell::RefCell;
use std::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, error};

use super::context::BridgeContext;

thread_local! {
    static ACTIVE: RefCell<Option<BridgeContext>> = const { RefCell::new(None) };
}

/// Errors raised when activating a context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Another run still owns the dispatch slot on this thread.
    #[error("a bridge context is already active on this thread")]
    AlreadyActive,
}

/// Guard proving that a context occupies the dispatch slot.
///
/// The guard is `!Send`: the slot is thread-local, so the guard must be
/// dropped on the thread that created it.
#[must_use = "dropping the guard immediately deactivates the context"]
#[derive(Debug)]
pub struct ActiveContext {
    released: bool,
    _not_send: PhantomData<*const ()>,
}

impl ActiveContext {
    /// Makes `ctx` the target of all hook calls on this thread.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AlreadyActive`] if a context is already
    /// active; `ctx` is dropped in that case.
    pub fn enter(ctx: BridgeContext) -> Result<Self, DispatchError> {
        ACTIVE.with(|slot| {
            let mut slot = slot
                .try_borrow_mut()
                .map_err(|_| DispatchError::AlreadyActive)?;
            if slot.is_some() {
                return Err(DispatchError::AlreadyActive);
            }
            *slot = Some(ctx);
            Ok(())
        })?;
        debug!("bridge context activated");
        Ok(Self {
            released: false,
            _not_send: PhantomData,
        })
    }

    /// Deactivates the context and hands it back to the caller.
    pub fn release(mut self) -> Option<BridgeContext> {
        self.released = true;
        let ctx = ACTIVE.with(|slot| slot.borrow_mut().take());
        debug!("bridge context released");
        ctx
    }
}

impl Drop for ActiveContext {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Reached on early return or unwinding: discard the context.
        let _ = ACTIVE.try_with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                slot.take();
            }
        });
        debug!("bridge context dropped without release");
    }
}

/// `true` while a context occupies the slot on this thread.
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.try_borrow().map(|s| s.is_some()).unwrap_or(true))
}

// ── Hooks called by the foreign module ────────────────────────────────────────

/// Reads the next input byte of the active run; `None` is end of input.
pub fn read_byte() -> Option<u8> {
    with_active("stdin", BridgeContext::pull_input_byte)
}

/// Writes one byte to the active run's stdout channel.
pub fn write_stdout_byte(byte: u8) {
    with_active("stdout", |ctx| ctx.push_output_byte(byte));
}

/// Writes one byte to the active run's stderr channel.
pub fn write_stderr_byte(byte: u8) {
    with_active("stderr", |ctx| ctx.push_error_byte(byte));
}

/// Writes every byte of `text` to stdout, as `fputs` would.
pub fn write_stdout_str(text: &str) {
    text.bytes().for_each(write_stdout_byte);
}

/// Writes every byte of `text` to stderr, as `fputs` would.
pub fn write_stderr_str(text: &str) {
    text.bytes().for_each(write_stderr_byte);
}

fn with_active<R>(hook: &'static str, f: impl FnOnce(&mut BridgeContext) -> R) -> R {
    ACTIVE.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            error!(hook, "bridge hook re-entered from a line sink");
            panic!("bridge hook {hook} re-entered from a line sink");
        };
        match slot.as_mut() {
            Some(ctx) => f(ctx),
            None => unhandled(hook),
        }
    })
}

#[cold]
fn unhandled(hook: &str) -> ! {
    error!(hook, "solver used {hook} outside an active run");
    panic!(
        "UNHANDLED {}: no bridge context is active",
        hook.to_ascii_uppercase()
    );
}
