//! Page glue: runs, URL fragment, file drop and keyboard shortcut.
//!
//! The controller never touches a concrete UI.  Everything visible goes
//! through the [`Page`] trait, so the same controller drives the terminal
//! front-end in `main.rs` and the recording pages used in tests.
//!
//! # Run flow
//!
//! ```text
//! RunClicked / Ctrl+Enter / file drop
//!        │
//!        ▼
//! selected mode runnable?  ──no──>  page.show_notice(..)   (nothing else changes)
//!        │ yes
//!        ▼
//! clear panes ─> mode.run(input) ─> each line appended as it completes
//!        │
//!        ▼
//! page.set_fragment("#<mode><escaped input>")
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use limboole_core::{RunStatus, UrlState, UrlStateError};
use tracing::{debug, info, warn};

use super::processor::{LoadError, Processor, RunError};
use super::wrapper::ProcessorWrapper;

// ── Page abstraction ──────────────────────────────────────────────────────────

/// The visible surface the controller drives.
pub trait Page {
    fn input_text(&self) -> String;
    fn set_input_text(&mut self, text: &str);

    /// Empties both the stdout and the stderr pane.
    fn clear_output(&mut self);
    fn append_stdout(&mut self, line: &str);
    fn append_stderr(&mut self, line: &str);

    /// Adds one option to the mode selector; `index` is its value.
    fn add_mode_option(&mut self, index: usize, label: &str, enabled: bool);
    fn selected_mode(&self) -> usize;
    fn select_mode(&mut self, index: usize);

    /// Current location fragment including the leading `#`, if any.
    fn fragment(&self) -> Option<String>;
    fn set_fragment(&mut self, fragment: &str);

    /// Blocking, user-facing notice (an alert box in a browser).
    fn show_notice(&mut self, message: &str);
    fn set_loading(&mut self, loading: bool);
    fn set_run_enabled(&mut self, enabled: bool);
}

// ── Events ────────────────────────────────────────────────────────────────────

/// A key press as reported by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl+Enter, or Cmd+Enter on macOS.
    pub fn is_run_shortcut(&self) -> bool {
        self.key == "Enter" && (self.ctrl || self.meta) && !self.alt
    }
}

/// A file dropped onto the input area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// User interactions the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    RunClicked,
    Key(KeyPress),
    FileDropped(DroppedFile),
}

/// Whether the page should suppress the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Handled; the default action (e.g. form submission) must not run.
    Consumed,
    Ignored,
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Connects a [`Page`] to the modes and their shared processor.
pub struct UiController<P: Page> {
    page: Rc<RefCell<P>>,
    modes: Vec<ProcessorWrapper>,
    processor: Rc<Processor>,
}

impl<P: Page + 'static> UiController<P> {
    pub fn new(page: P, modes: Vec<ProcessorWrapper>, processor: Rc<Processor>) -> Self {
        Self {
            page: Rc::new(RefCell::new(page)),
            modes,
            processor,
        }
    }

    /// Shared handle to the page, e.g. for inspection after a run.
    pub fn page(&self) -> Rc<RefCell<P>> {
        Rc::clone(&self.page)
    }

    pub fn modes(&self) -> &[ProcessorWrapper] {
        &self.modes
    }

    /// Fills the selector with every mode, in order, value = index.
    pub fn populate_modes(&self) {
        let mut page = self.page.borrow_mut();
        for (index, mode) in self.modes.iter().enumerate() {
            page.add_mode_option(index, mode.name(), mode.is_enabled());
        }
    }

    /// Applies the page's URL fragment, if any, to the selector and input.
    ///
    /// Returns `true` when a fragment was restored and an automatic run is
    /// due once the solver is ready.
    pub fn restore_from_fragment(&self) -> bool {
        let fragment = self.page.borrow().fragment();
        let Some(fragment) = fragment else {
            return false;
        };

        match UrlState::decode(&fragment, self.modes.len()) {
            Ok(state) => {
                let Some(index) = self.runnable_index(state.mode_index) else {
                    warn!(mode_index = state.mode_index, "no runnable mode to restore");
                    return false;
                };
                let mut page = self.page.borrow_mut();
                page.select_mode(index);
                page.set_input_text(&state.input_text);
                info!(
                    mode_index = index,
                    requested = state.mode_index,
                    input_len = state.input_text.len(),
                    "restored run from URL fragment"
                );
                true
            }
            Err(UrlStateError::Empty) => false,
            Err(e) => {
                warn!(error = %e, "ignoring malformed URL fragment");
                false
            }
        }
    }

    /// `index` if that mode is enabled, else the closest enabled mode
    /// before it.  Fragments naming a reserved mode land on a runnable one.
    fn runnable_index(&self, index: usize) -> Option<usize> {
        let last = index.min(self.modes.len().checked_sub(1)?);
        (0..=last).rev().find(|&i| self.modes[i].is_enabled())
    }

    /// Runs the selected mode on the current input.
    ///
    /// Rejections are shown through [`Page::show_notice`] and also returned.
    ///
    /// # Errors
    ///
    /// See [`RunError`].
    pub fn execute_selected_mode(&self) -> Result<RunStatus, RunError> {
        let index = self.page.borrow().selected_mode();
        let result = self.execute_mode(index);
        if let Err(e) = &result {
            warn!(error = %e, mode_index = index, "run rejected");
            self.page.borrow_mut().show_notice(&e.to_string());
        }
        result
    }

    fn execute_mode(&self, index: usize) -> Result<RunStatus, RunError> {
        let mode = self.modes.get(index).ok_or(RunError::UnknownMode(index))?;
        mode.ensure_runnable()?;

        let input = self.page.borrow().input_text();
        self.page.borrow_mut().clear_output();

        let out = Rc::clone(&self.page);
        let err = Rc::clone(&self.page);
        let status = mode.run(
            &input,
            move |line| out.borrow_mut().append_stdout(line),
            move |line| err.borrow_mut().append_stderr(line),
        )?;

        let fragment = UrlState::new(index, input).encode();
        self.page.borrow_mut().set_fragment(&fragment);
        info!(mode = mode.name(), status = status.code(), "run finished");
        Ok(status)
    }

    /// Replaces the input with the dropped file's text and runs it.
    ///
    /// # Errors
    ///
    /// Same as [`execute_selected_mode`](Self::execute_selected_mode).
    pub fn load_dropped_file(&self, file: DroppedFile) -> Result<RunStatus, RunError> {
        let text = String::from_utf8_lossy(&file.contents);
        info!(file = %file.name, bytes = file.contents.len(), "loading dropped file");
        self.page.borrow_mut().set_input_text(&text);
        self.execute_selected_mode()
    }

    /// Dispatches one user interaction.
    pub fn handle_event(&self, event: UiEvent) -> EventDisposition {
        match event {
            UiEvent::RunClicked => {
                let _ = self.execute_selected_mode();
                EventDisposition::Consumed
            }
            UiEvent::Key(key) if key.is_run_shortcut() => {
                debug!(key = %key.key, "run shortcut");
                let _ = self.execute_selected_mode();
                EventDisposition::Consumed
            }
            UiEvent::Key(_) => EventDisposition::Ignored,
            UiEvent::FileDropped(file) => {
                let _ = self.load_dropped_file(file);
                EventDisposition::Consumed
            }
        }
    }

    /// Page start-up without the automatic run: show the loading state,
    /// fill the selector, restore the fragment, wait for the solver, then
    /// enable running.
    ///
    /// Returns `true` when a restored fragment asks for an automatic run.
    ///
    /// # Errors
    ///
    /// The load error if the solver never becomes ready; the page keeps
    /// showing the loading state and a notice explains why.
    pub async fn prepare(&self) -> Result<bool, LoadError> {
        {
            let mut page = self.page.borrow_mut();
            page.set_loading(true);
            page.set_run_enabled(false);
        }
        self.populate_modes();
        let auto_run = self.restore_from_fragment();

        if let Err(e) = self.processor.wait_ready().await {
            self.page
                .borrow_mut()
                .show_notice(&format!("The solver could not be loaded: {e}"));
            return Err(e);
        }

        {
            let mut page = self.page.borrow_mut();
            page.set_loading(false);
            page.set_run_enabled(true);
        }
        Ok(auto_run)
    }

    /// [`prepare`](Self::prepare), then the automatic run if the fragment
    /// asked for one.
    ///
    /// `Ok(None)` means no run was due.  `Ok(Some(Err(..)))` means the run
    /// was attempted and rejected; the notice has already been shown.
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    pub async fn start(&self) -> Result<Option<Result<RunStatus, RunError>>, LoadError> {
        if self.prepare().await? {
            return Ok(Some(self.execute_selected_mode()));
        }
        Ok(None)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::wrapper::standard_modes;
    use crate::infrastructure::scripted::{Reply, ScriptedHandle, ScriptedLoader, ScriptedModule};
    use limboole_core::BlankLinePolicy;
    use mockall::mock;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Debug, Default)]
    struct RecordingPage {
        input: String,
        stdout: String,
        stderr: String,
        options: Vec<(usize, String, bool)>,
        selected: usize,
        fragment: Option<String>,
        notices: Vec<String>,
        loading: bool,
        run_enabled: bool,
        clears: usize,
    }

    impl Page for RecordingPage {
        fn input_text(&self) -> String {
            self.input.clone()
        }
        fn set_input_text(&mut self, text: &str) {
            self.input = text.to_string();
        }
        fn clear_output(&mut self) {
            self.stdout.clear();
            self.stderr.clear();
            self.clears += 1;
        }
        fn append_stdout(&mut self, line: &str) {
            self.stdout.push_str(line);
        }
        fn append_stderr(&mut self, line: &str) {
            self.stderr.push_str(line);
        }
        fn add_mode_option(&mut self, index: usize, label: &str, enabled: bool) {
            self.options.push((index, label.to_string(), enabled));
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
            self.fragment = Some(fragment.to_string());
        }
        fn show_notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
        fn set_loading(&mut self, loading: bool) {
            self.loading = loading;
        }
        fn set_run_enabled(&mut self, enabled: bool) {
            self.run_enabled = enabled;
        }
    }

    mock! {
        StrictPage {}
        impl Page for StrictPage {
            fn input_text(&self) -> String;
            fn set_input_text(&mut self, text: &str);
            fn clear_output(&mut self);
            fn append_stdout(&mut self, line: &str);
            fn append_stderr(&mut self, line: &str);
            fn add_mode_option(&mut self, index: usize, label: &str, enabled: bool);
            fn selected_mode(&self) -> usize;
            fn select_mode(&mut self, index: usize);
            fn fragment(&self) -> Option<String>;
            fn set_fragment(&mut self, fragment: &str);
            fn show_notice(&mut self, message: &str);
            fn set_loading(&mut self, loading: bool);
            fn set_run_enabled(&mut self, enabled: bool);
        }
    }

    fn verdict_module() -> ScriptedModule {
        ScriptedModule::new(|selector, input| {
            if input.is_empty() {
                return Reply::stdout("% VALID formula\n");
            }
            match selector {
                1 => Reply::stdout("% SATISFIABLE formula\na = 1\n"),
                _ => Reply::stdout("% INVALID formula\na = 0\n"),
            }
        })
    }

    fn ready_controller(page: RecordingPage) -> (UiController<RecordingPage>, ScriptedHandle) {
        let processor = Processor::new(BlankLinePolicy::Preserve);
        let module = verdict_module();
        let handle = module.handle();
        tokio_test::block_on(processor.load(&ScriptedLoader::new(module))).unwrap();
        let modes = standard_modes(&processor);
        (UiController::new(page, modes, processor), handle)
    }

    fn loading_controller(page: RecordingPage) -> UiController<RecordingPage> {
        let processor = Processor::new(BlankLinePolicy::Preserve);
        let modes = standard_modes(&processor);
        UiController::new(page, modes, processor)
    }

    // ── Selector ──────────────────────────────────────────────────────────────

    #[test]
    fn test_populate_modes_lists_all_modes_in_order() {
        let controller = loading_controller(RecordingPage::default());

        controller.populate_modes();

        let page = controller.page();
        let options = &page.borrow().options;
        assert_eq!(options.len(), 4);
        assert_eq!(options[0], (0, "Validity Check".to_string(), true));
        assert_eq!(options[2], (2, "QBF Satisfiability Check".to_string(), true));
        assert_eq!(options[3], (3, "QBF Validity Check".to_string(), false));
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    #[test]
    fn test_execute_appends_lines_and_writes_fragment() {
        // Arrange
        let page = RecordingPage {
            input: "a & b".to_string(),
            stdout: "stale output".to_string(),
            ..RecordingPage::default()
        };
        let (controller, _) = ready_controller(page);

        // Act
        let status = controller.execute_selected_mode().unwrap();

        // Assert
        assert!(status.is_success());
        let page = controller.page();
        let page = page.borrow();
        assert_eq!(page.stdout, "% INVALID formula\na = 0\n");
        assert_eq!(page.fragment.as_deref(), Some("#0a%20%26%20b"));
        assert_eq!(page.clears, 1);
    }

    #[test]
    fn test_execute_while_loading_shows_notice_and_changes_nothing() {
        let page = RecordingPage {
            input: "a".to_string(),
            stdout: "previous".to_string(),
            ..RecordingPage::default()
        };
        let controller = loading_controller(page);

        let result = controller.execute_selected_mode();

        assert_eq!(result, Err(RunError::NotReady));
        let page = controller.page();
        let page = page.borrow();
        assert_eq!(page.notices.len(), 1);
        assert_eq!(page.stdout, "previous");
        assert_eq!(page.clears, 0);
        assert!(page.fragment.is_none());
    }

    #[test]
    fn test_not_ready_touches_only_selector_and_notice() {
        // Arrange: any page call other than the two expected ones fails.
        let mut page = MockStrictPage::new();
        page.expect_selected_mode().return_const(1usize);
        page.expect_show_notice()
            .withf(|message| message.contains("still loading"))
            .times(1)
            .return_const(());
        page.expect_clear_output().never();
        page.expect_set_fragment().never();
        let processor = Processor::new(BlankLinePolicy::Preserve);
        let controller = UiController::new(page, standard_modes(&processor), processor);

        // Act / Assert
        assert_eq!(controller.execute_selected_mode(), Err(RunError::NotReady));
    }

    #[test]
    fn test_disabled_mode_shows_notice() {
        let page = RecordingPage {
            selected: 3,
            ..RecordingPage::default()
        };
        let (controller, handle) = ready_controller(page);

        let result = controller.execute_selected_mode();

        assert!(matches!(result, Err(RunError::ModeDisabled(_))));
        assert!(handle.calls().is_empty());
        assert_eq!(controller.page().borrow().notices.len(), 1);
    }

    #[test]
    fn test_out_of_range_selection_is_rejected() {
        let page = RecordingPage {
            selected: 7,
            ..RecordingPage::default()
        };
        let (controller, _) = ready_controller(page);

        assert_eq!(
            controller.execute_selected_mode(),
            Err(RunError::UnknownMode(7))
        );
    }

    // ── URL fragment ──────────────────────────────────────────────────────────

    #[test]
    fn test_restore_from_fragment_sets_mode_and_input() {
        let page = RecordingPage {
            fragment: Some("#1a%20%7C%20b%0A".to_string()),
            ..RecordingPage::default()
        };
        let controller = loading_controller(page);

        assert!(controller.restore_from_fragment());

        let page = controller.page();
        let page = page.borrow();
        assert_eq!(page.selected, 1);
        assert_eq!(page.input, "a | b\n");
    }

    #[test]
    fn test_restore_of_disabled_mode_falls_back_to_runnable_one() {
        // Arrange: index 3 is the disabled QBF validity entry.
        let page = RecordingPage {
            fragment: Some("#3a".to_string()),
            ..RecordingPage::default()
        };
        let controller = loading_controller(page);

        // Act
        let restored = controller.restore_from_fragment();

        // Assert
        assert!(restored);
        let page = controller.page();
        let page = page.borrow();
        assert_eq!(page.selected, 2);
        assert_eq!(page.input, "a");
    }

    #[test]
    fn test_restore_clamps_large_digit_to_runnable_mode() {
        let page = RecordingPage {
            fragment: Some("#9a".to_string()),
            ..RecordingPage::default()
        };
        let controller = loading_controller(page);

        assert!(controller.restore_from_fragment());
        assert_eq!(controller.page().borrow().selected, 2);
    }

    #[test]
    fn test_restore_without_fragment_is_noop() {
        let controller = loading_controller(RecordingPage::default());
        assert!(!controller.restore_from_fragment());
        assert_eq!(controller.page().borrow().input, "");
    }

    #[test]
    fn test_restore_ignores_malformed_fragment() {
        let page = RecordingPage {
            fragment: Some("#zz".to_string()),
            input: "kept".to_string(),
            ..RecordingPage::default()
        };
        let controller = loading_controller(page);

        assert!(!controller.restore_from_fragment());
        assert_eq!(controller.page().borrow().input, "kept");
    }

    // ── Events ────────────────────────────────────────────────────────────────

    #[test]
    fn test_ctrl_enter_runs_and_is_consumed() {
        let page = RecordingPage {
            input: "a".to_string(),
            ..RecordingPage::default()
        };
        let (controller, handle) = ready_controller(page);

        let disposition = controller.handle_event(UiEvent::Key(KeyPress::new("Enter").with_ctrl()));

        assert_eq!(disposition, EventDisposition::Consumed);
        assert_eq!(handle.calls().len(), 1);
    }

    #[test]
    fn test_meta_enter_is_run_shortcut() {
        assert!(KeyPress::new("Enter").with_meta().is_run_shortcut());
    }

    #[test]
    fn test_plain_enter_is_ignored() {
        let (controller, handle) = ready_controller(RecordingPage::default());

        let disposition = controller.handle_event(UiEvent::Key(KeyPress::new("Enter")));

        assert_eq!(disposition, EventDisposition::Ignored);
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn test_file_drop_replaces_input_and_runs() {
        // Arrange
        let page = RecordingPage {
            input: "old formula".to_string(),
            selected: 1,
            ..RecordingPage::default()
        };
        let (controller, handle) = ready_controller(page);
        let file = DroppedFile {
            name: "formula.lim".to_string(),
            contents: b"x -> y".to_vec(),
        };

        // Act
        let disposition = controller.handle_event(UiEvent::FileDropped(file));

        // Assert
        assert_eq!(disposition, EventDisposition::Consumed);
        let calls = handle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].pulled, "x -> y");
        let page = controller.page();
        let page = page.borrow();
        assert_eq!(page.input, "x -> y");
        assert_eq!(page.stdout, "% SATISFIABLE formula\na = 1\n");
    }

    // ── Start-up ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_start_auto_runs_restored_fragment() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                // Arrange
                let module = verdict_module();
                let handle = module.handle();
                let processor =
                    Processor::spawn(ScriptedLoader::new(module), BlankLinePolicy::Preserve);
                let page = RecordingPage {
                    fragment: Some(UrlState::new(1, "a & b").encode()),
                    ..RecordingPage::default()
                };
                let controller = UiController::new(page, standard_modes(&processor), processor);

                // Act
                let status = controller.start().await.unwrap();

                // Assert
                assert_eq!(status, Some(Ok(RunStatus(0))));
                assert_eq!(handle.calls()[0].mode_selector, 1);
                let page = controller.page();
                let page = page.borrow();
                assert!(!page.loading);
                assert!(page.run_enabled);
                assert_eq!(page.stdout, "% SATISFIABLE formula\na = 1\n");
            })
            .await;
    }

    #[tokio::test]
    async fn test_start_on_disabled_mode_fragment_runs_qbf_satisfiability() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                // Arrange
                let module = verdict_module();
                let handle = module.handle();
                let processor =
                    Processor::spawn(ScriptedLoader::new(module), BlankLinePolicy::Preserve);
                let page = RecordingPage {
                    fragment: Some("#3a".to_string()),
                    ..RecordingPage::default()
                };
                let controller = UiController::new(page, standard_modes(&processor), processor);

                // Act
                let status = controller.start().await.unwrap();

                // Assert
                assert_eq!(status, Some(Ok(RunStatus(0))));
                let calls = handle.calls();
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].mode_selector, 3);
                assert!(controller.page().borrow().notices.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn test_prepare_restores_fragment_without_running() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                // Arrange
                let module = verdict_module();
                let handle = module.handle();
                let processor =
                    Processor::spawn(ScriptedLoader::new(module), BlankLinePolicy::Preserve);
                let page = RecordingPage {
                    fragment: Some(UrlState::new(1, "a & b").encode()),
                    ..RecordingPage::default()
                };
                let controller = UiController::new(page, standard_modes(&processor), processor);

                // Act
                let pending = controller.prepare().await.unwrap();

                // Assert
                assert!(pending);
                assert!(handle.calls().is_empty());
                let page = controller.page();
                let page = page.borrow();
                assert_eq!(page.input, "a & b");
                assert!(page.run_enabled);
                assert!(page.stdout.is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn test_start_without_fragment_only_enables_running() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let module = verdict_module();
                let handle = module.handle();
                let processor =
                    Processor::spawn(ScriptedLoader::new(module), BlankLinePolicy::Preserve);
                let controller = UiController::new(
                    RecordingPage::default(),
                    standard_modes(&processor),
                    processor,
                );

                let status = controller.start().await.unwrap();

                assert_eq!(status, None);
                assert!(handle.calls().is_empty());
                assert!(controller.page().borrow().run_enabled);
            })
            .await;
    }

    #[tokio::test]
    async fn test_start_reports_load_failure() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let processor = Processor::spawn(
                    ScriptedLoader::failing(LoadError::Failed("boom".to_string())),
                    BlankLinePolicy::Preserve,
                );
                let controller = UiController::new(
                    RecordingPage::default(),
                    standard_modes(&processor),
                    processor,
                );

                let result = controller.start().await;

                assert!(result.is_err());
                let page = controller.page();
                let page = page.borrow();
                assert!(page.loading);
                assert!(!page.run_enabled);
                assert!(page.notices[0].contains("boom"));
            })
            .await;
    }
}
