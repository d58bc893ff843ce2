//! Application state shared by every step handler

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use crate::config::Config;
use crate::gateway::{CompletionRequest, Gateway, ImageAttachment, OpenAiGateway};
use crate::report::{MarkdownReportExporter, ReportExporter};
use crate::steps::{
    handler_for, ChecklistDraft, Readiness, Sequencer, Session, StepAction, StepError, StepId,
    Transition,
};
use crate::store::{Slot, Store, StoreError};
use crate::types::{ChecklistState, OcrResult, PlatformSelection};

/// Values the handlers need from the configuration
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub output_dir: PathBuf,
    /// Model used when the selected one is not served by the gateway
    pub default_model: String,
    pub max_tokens: Option<u32>,
    pub preview_rows: usize,
}

impl WizardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_path(),
            default_model: config.gateway.default_model.clone(),
            max_tokens: config.gateway.max_tokens,
            preview_rows: config.ui.preview_rows,
        }
    }
}

/// The wizard: store, sequencer, session and gateway behind one value.
///
/// Handlers receive it by reference; there is no global state, so tests
/// build one per data directory.
pub struct Wizard {
    store: Store,
    sequencer: Sequencer,
    session: Session,
    gateway: Arc<dyn Gateway>,
    exporter: Box<dyn ReportExporter>,
    settings: WizardSettings,
    /// Slots found unreadable at open and replaced by their defaults
    repaired: Vec<String>,
}

impl Wizard {
    /// Open the wizard over `store`.
    ///
    /// Missing slots are created with their defaults. A slot that no longer
    /// parses is reset to its default and reported through
    /// [`Wizard::repaired_slots`] instead of failing the open.
    pub fn open(
        store: Store,
        gateway: Arc<dyn Gateway>,
        settings: WizardSettings,
    ) -> Result<Self, StoreError> {
        let repaired: Vec<String> = Sequencer::prepare_store(&store)?
            .iter()
            .map(|e| format!("{e} (reset to empty)"))
            .collect();
        let sequencer = Sequencer::load(store.clone())?;

        let mut wizard = Self {
            store,
            sequencer,
            session: Session::default(),
            gateway,
            exporter: Box::new(MarkdownReportExporter),
            settings,
            repaired,
        };
        wizard.reseed_checklist()?;
        Ok(wizard)
    }

    /// Open with the OpenAI gateway and paths from `config`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = Store::open(config.data_path()).context("Failed to open data directory")?;
        let gateway =
            OpenAiGateway::from_config(&config.gateway).context("Failed to build model gateway")?;
        Self::open(store, Arc::new(gateway), WizardSettings::from_config(config))
            .context("Failed to load wizard state")
    }

    pub fn with_exporter(mut self, exporter: Box<dyn ReportExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub(crate) fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub(crate) fn exporter(&self) -> &dyn ReportExporter {
        self.exporter.as_ref()
    }

    /// Messages for slots that were unreadable when the wizard opened
    pub fn repaired_slots(&self) -> &[String] {
        &self.repaired
    }

    pub fn current_step(&self) -> StepId {
        self.sequencer.current()
    }

    pub fn gateway_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    pub fn platform(&self) -> Result<PlatformSelection, StoreError> {
        self.store.get(Slot::Plataforma)
    }

    pub fn ocr_text(&self) -> Result<String, StoreError> {
        let ocr: OcrResult = self.store.get(Slot::OcrResult)?;
        Ok(ocr.text)
    }

    /// Origin platform named in prompts and the header
    pub fn origin(&self) -> String {
        self.platform()
            .map(|platform| platform.origin_or_default().to_string())
            .unwrap_or_else(|_| crate::types::DEFAULT_ORIGIN.to_string())
    }

    /// Model id sent to the gateway.
    ///
    /// Only OpenAI chat models are served; anything else in the catalog
    /// falls back to the configured default.
    pub fn model(&self) -> String {
        let selected = self.platform().map(|p| p.model).unwrap_or_default();
        if selected.starts_with("gpt-") && !selected.ends_with("-azure") {
            selected
        } else {
            self.settings.default_model.clone()
        }
    }

    /// Whether the current step can perform its main action
    pub fn readiness(&self) -> Readiness {
        handler_for(self.current_step()).readiness(self)
    }

    /// Why the current step cannot advance yet, if it cannot
    pub fn advance_blocker(&self) -> Option<String> {
        handler_for(self.current_step()).can_advance(self).err()
    }

    /// Route an action to the current step's handler and apply the result.
    ///
    /// A failed action leaves the pointer where it was.
    pub async fn dispatch(&mut self, action: StepAction) -> Result<Transition, StepError> {
        let step = self.current_step();
        let handler = handler_for(step);
        let label = action.label();
        tracing::debug!(step = step.name(), action = label, "Dispatching action");

        let result = match action {
            StepAction::Advance => handler.advance(self),
            action => handler.handle(self, action).await,
        };

        match result {
            Ok(transition) => {
                self.apply(transition)?;
                Ok(transition)
            }
            Err(e) => {
                tracing::warn!(step = step.name(), action = label, error = %e, "Step action failed");
                Err(e)
            }
        }
    }

    fn apply(&mut self, transition: Transition) -> Result<(), StepError> {
        match transition {
            Transition::Stay => {}
            Transition::Advance(next) => self.sequencer.navigate_to(next)?,
            Transition::Restart => self.reset()?,
        }
        Ok(())
    }

    /// Direct jump from the sidebar; no step guard applies
    pub fn navigate_to(&mut self, step: StepId) -> Result<(), StoreError> {
        self.sequencer.navigate_to(step)
    }

    /// Clear every slot and the session, back to the first step
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.sequencer.reset()?;
        self.session.clear();
        self.repaired.clear();
        self.reseed_checklist()
    }

    fn reseed_checklist(&mut self) -> Result<(), StoreError> {
        let state: ChecklistState = self.store.get(Slot::Checklist)?;
        let ocr_text = self.ocr_text()?;
        self.session.checklist = ChecklistDraft::from_state(&state, &ocr_text);
        Ok(())
    }

    /// Send one prompt, with optional images, to the gateway
    pub(crate) async fn ask(
        &self,
        prompt: String,
        images: Vec<ImageAttachment>,
        temperature: f32,
    ) -> Result<String, StepError> {
        let model = self.model();
        let image_count = images.len();
        let mut request = CompletionRequest::text(model.clone(), prompt, temperature)
            .with_max_tokens(self.settings.max_tokens);
        for image in images {
            request = request.with_image(image);
        }

        let started = Instant::now();
        let result = self.gateway.complete(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => tracing::info!(
                gateway = self.gateway.name(),
                model = %model,
                temperature,
                images = image_count,
                elapsed_ms,
                chars = text.len(),
                "Model call completed"
            ),
            Err(e) => tracing::error!(
                gateway = self.gateway.name(),
                model = %model,
                temperature,
                images = image_count,
                elapsed_ms,
                error = %e,
                "Model call failed"
            ),
        }
        result.map_err(StepError::from)
    }
}
