use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::steps::{StepAction, StepId, Transition};
use crate::ui::{
    install_panic_hook, InputTarget, StatusKind, TerminalGuard, WizardSnapshot, WizardView,
};
use crate::wizard::Wizard;

/// An action waiting for the next frame, so "working" is drawn before a
/// blocking model call
struct PendingAction {
    action: StepAction,
    done: &'static str,
}

pub struct App {
    config: Config,
    wizard: Wizard,
    view: WizardView,
    snapshot: WizardSnapshot,
    pending: Option<PendingAction>,
    /// Set by the first `R`; a second `R` confirms the reset
    reset_armed: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let wizard = Wizard::from_config(&config)?;
        Ok(Self::with_wizard(config, wizard))
    }

    pub fn with_wizard(config: Config, wizard: Wizard) -> Self {
        let snapshot = WizardSnapshot::capture(&wizard);
        let mut view = WizardView::default();
        view.platform.load(&snapshot.platform);
        Self {
            config,
            wizard,
            view,
            snapshot,
            pending: None,
            reset_armed: false,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let mut guard = TerminalGuard::new()?;
        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            guard
                .terminal()
                .draw(|f| self.view.render(f, &self.snapshot))?;

            if let Some(pending) = self.pending.take() {
                self.run_action(pending.action, pending.done).await;
                continue;
            }

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key).await;
                    }
                }
            }
        }

        guard.restore();
        Ok(())
    }

    fn refresh(&mut self) {
        self.snapshot = WizardSnapshot::capture(&self.wizard);
    }

    /// Dispatch now and report the outcome in the status line
    async fn run_action(&mut self, action: StepAction, done: &'static str) {
        let before = self.wizard.current_step();
        match self.wizard.dispatch(action).await {
            Ok(Transition::Stay) => self.view.set_status(StatusKind::Info, done),
            Ok(Transition::Advance(next)) => self
                .view
                .set_status(StatusKind::Info, format!("Now on: {}", next.name())),
            Ok(Transition::Restart) => {
                self.view = WizardView::default();
                self.view
                    .set_status(StatusKind::Info, "Started a new migration");
            }
            Err(e) => {
                let message = match e.hint() {
                    Some(hint) => format!("{e} ({hint})"),
                    None => e.to_string(),
                };
                self.view.set_status(StatusKind::Error, message);
            }
        }
        self.refresh();
        if self.wizard.current_step() != before {
            self.view.on_step_changed();
        }
    }

    /// Queue a gateway-backed action behind a "working" frame
    fn queue_slow(&mut self, action: StepAction, done: &'static str) {
        self.view
            .set_status(StatusKind::Working, "Working: waiting for the model...");
        self.pending = Some(PendingAction { action, done });
    }

    fn navigate(&mut self, step: StepId) {
        match self.wizard.navigate_to(step) {
            Ok(()) => {
                self.view.on_step_changed();
                self.view.status = None;
            }
            Err(e) => self.view.set_status(StatusKind::Error, e.to_string()),
        }
        self.refresh();
        if step == StepId::Platform {
            self.view.platform.load(&self.snapshot.platform);
        }
    }

    fn reset(&mut self) {
        match self.wizard.reset() {
            Ok(()) => {
                self.view = WizardView::default();
                self.view
                    .set_status(StatusKind::Info, "All progress cleared");
            }
            Err(e) => self.view.set_status(StatusKind::Error, e.to_string()),
        }
        self.refresh();
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.view.show_help {
            self.view.show_help = false;
            return;
        }

        if let Some(target) = self.view.editing {
            self.handle_input_key(target, key.code).await;
            return;
        }

        // the comment box takes every key except focus changes
        if self.snapshot.current == StepId::Evaluation && self.view.evaluation.editing_comment() {
            if key.code == KeyCode::Esc {
                self.view.evaluation.focus = 0;
            } else {
                self.view.evaluation.handle_key(key.code);
            }
            return;
        }

        let code = key.code;
        if code != KeyCode::Char('R') {
            self.reset_armed = false;
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.view.show_help = true,
            KeyCode::Char('R') => {
                if self.reset_armed {
                    self.reset_armed = false;
                    self.reset();
                } else {
                    self.reset_armed = true;
                    self.view.set_status(
                        StatusKind::Warning,
                        "Press R again to erase all progress and saved results",
                    );
                }
            }
            KeyCode::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                if let Some(step) = StepId::from_index(index) {
                    self.navigate(step);
                }
            }
            KeyCode::Char('n') => {
                if let Some(reason) = &self.snapshot.advance_blocker {
                    self.view.set_status(StatusKind::Warning, reason.clone());
                } else {
                    self.run_action(StepAction::Advance, "").await;
                }
            }
            KeyCode::PageDown => self.view.scroll = self.view.scroll.saturating_add(5),
            KeyCode::PageUp => self.view.scroll = self.view.scroll.saturating_sub(5),
            _ => self.handle_step_key(code).await,
        }
    }

    async fn handle_step_key(&mut self, code: KeyCode) {
        match (self.snapshot.current, code) {
            (StepId::Platform, KeyCode::Enter) => {
                let selection = self.view.platform.to_selection();
                self.run_action(StepAction::ConfirmPlatform(selection), "Platform saved")
                    .await;
            }
            (StepId::Platform, code) => {
                self.view.platform.handle_key(code);
            }
            (StepId::Upload, KeyCode::Enter | KeyCode::Char('i')) => {
                self.view.begin_edit(InputTarget::SourceImage);
            }
            (StepId::Extraction, KeyCode::Char('x')) => {
                self.queue_slow(StepAction::RunExtraction, "Extraction complete");
            }
            (StepId::Extraction, KeyCode::Char('a')) => {
                self.view.begin_edit(InputTarget::ChecklistItem);
            }
            (StepId::Extraction, KeyCode::Down | KeyCode::Char('j')) => {
                self.view.select_checklist(self.snapshot.checklist.len(), true);
            }
            (StepId::Extraction, KeyCode::Up | KeyCode::Char('k')) => {
                self.view.select_checklist(self.snapshot.checklist.len(), false);
            }
            (StepId::Extraction, KeyCode::Char(' ')) => {
                let selected = self
                    .view
                    .checklist_state
                    .selected()
                    .and_then(|i| self.snapshot.checklist.get(i))
                    .map(|(key, _)| key.clone());
                if let Some(key) = selected {
                    self.run_action(StepAction::ToggleChecklistItem(key), "Checklist updated")
                        .await;
                }
            }
            (StepId::Validation, KeyCode::Enter | KeyCode::Char('i')) => {
                self.view.begin_edit(InputTarget::Dataset);
            }
            (StepId::Validation, KeyCode::Char('x')) => {
                self.queue_slow(StepAction::AnalyzeData, "Compatibility analysis ready");
            }
            (StepId::Script, KeyCode::Char('x')) => {
                self.queue_slow(StepAction::GenerateScript, "Migration script saved");
            }
            (StepId::Comparison, KeyCode::Enter | KeyCode::Char('i')) => {
                self.view.begin_edit(InputTarget::TargetImage);
            }
            (StepId::Comparison, KeyCode::Char('x')) => {
                self.queue_slow(StepAction::CompareDashboards, "Comparison saved");
            }
            (StepId::Export, KeyCode::Char('x')) => {
                self.run_action(StepAction::ExportReport, "Report written").await;
            }
            (StepId::Evaluation, KeyCode::Char('s')) => {
                let input = self.view.evaluation.to_input();
                self.run_action(StepAction::SubmitEvaluation(input), "Thank you for the feedback")
                    .await;
            }
            (StepId::Evaluation, KeyCode::Char('r')) => {
                self.run_action(StepAction::Restart, "").await;
            }
            (StepId::Evaluation, code) => {
                self.view.evaluation.handle_key(code);
            }
            _ => {}
        }
    }

    async fn handle_input_key(&mut self, target: InputTarget, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.view.editing = None;
                self.view.input_mut(target).clear();
            }
            KeyCode::Enter => {
                let value = self.view.input_mut(target).value().trim().to_string();
                self.view.editing = None;
                self.view.input_mut(target).clear();
                if value.is_empty() {
                    return;
                }
                self.submit_input(target, value).await;
            }
            other => {
                self.view.input_mut(target).handle_key(other);
            }
        }
    }

    async fn submit_input(&mut self, target: InputTarget, value: String) {
        if target == InputTarget::ChecklistItem {
            self.run_action(StepAction::AddChecklistItem(value), "Item added")
                .await;
            return;
        }

        let path = expand_home(&value);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.view.set_status(
                    StatusKind::Error,
                    format!("Cannot read {}: {e}", path.display()),
                );
                return;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(value);

        let (action, done) = match target {
            InputTarget::SourceImage => (
                StepAction::UploadSourceImage { file_name, bytes },
                "Dashboard image stored",
            ),
            InputTarget::Dataset => (
                StepAction::LoadDataset { file_name, bytes },
                "Dataset loaded",
            ),
            InputTarget::TargetImage => (
                StepAction::UploadTargetImage { file_name, bytes },
                "Power BI screenshot stored",
            ),
            InputTarget::ChecklistItem => return,
        };
        self.run_action(action, done).await;
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    Path::new(raw).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::store::Store;
    use crate::wizard::WizardSettings;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_app(gateway: MockGateway) -> (TempDir, App) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("data")).unwrap();
        let settings = WizardSettings {
            output_dir: temp_dir.path().join("output"),
            default_model: "gpt-4o".to_string(),
            max_tokens: None,
            preview_rows: 5,
        };
        let wizard = Wizard::open(store, Arc::new(gateway), settings).unwrap();
        (temp_dir, App::with_wizard(Config::default(), wizard))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_enter_confirms_platform_and_advances() {
        let (_dir, mut app) = test_app(MockGateway::new());
        app.handle_key(press(KeyCode::Enter)).await;
        assert_eq!(app.snapshot.current, StepId::Upload);
        assert_eq!(app.snapshot.platform.origin, "MicroStrategy");
    }

    #[tokio::test]
    async fn test_digit_jumps_without_guard() {
        let (_dir, mut app) = test_app(MockGateway::new());
        app.handle_key(press(KeyCode::Char('5'))).await;
        assert_eq!(app.snapshot.current, StepId::Script);
        assert!(app.snapshot.readiness.is_blocked());
    }

    #[tokio::test]
    async fn test_blocked_advance_shows_reason() {
        let (_dir, mut app) = test_app(MockGateway::new());
        app.handle_key(press(KeyCode::Char('2'))).await;
        app.handle_key(press(KeyCode::Char('n'))).await;
        assert_eq!(app.snapshot.current, StepId::Upload);
        let status = app.view.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Warning);
    }

    #[tokio::test]
    async fn test_slow_action_is_queued_with_working_status() {
        let (_dir, mut app) = test_app(MockGateway::new());
        app.handle_key(press(KeyCode::Char('3'))).await;
        app.handle_key(press(KeyCode::Char('x'))).await;
        assert!(app.pending.is_some());
        assert_eq!(app.view.status.as_ref().unwrap().kind, StatusKind::Working);
    }

    #[tokio::test]
    async fn test_reset_needs_two_presses() {
        let (_dir, mut app) = test_app(MockGateway::new());
        app.handle_key(press(KeyCode::Char('4'))).await;
        app.handle_key(press(KeyCode::Char('R'))).await;
        assert_eq!(app.snapshot.current, StepId::Validation);
        app.handle_key(press(KeyCode::Char('R'))).await;
        assert_eq!(app.snapshot.current, StepId::Platform);
    }

    #[tokio::test]
    async fn test_rejected_key_shows_hint() {
        let gateway = MockGateway::new();
        gateway.fail(crate::gateway::GatewayError::unauthorized("openai"));
        let (_dir, mut app) = test_app(gateway);
        app.wizard
            .store()
            .put_asset(crate::store::Asset::SourceImage, &[0x89, b'P', b'N', b'G'])
            .unwrap();
        app.navigate(StepId::Extraction);

        app.run_action(StepAction::RunExtraction, "Extraction finished")
            .await;

        let status = app.view.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("rejected the API key"));
        assert_eq!(app.snapshot.current, StepId::Extraction);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/tmp/a.png"), PathBuf::from("/tmp/a.png"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/a.png"), home.join("a.png"));
        }
    }
}
