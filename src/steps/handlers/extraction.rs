use async_trait::async_trait;

use super::{unsupported, StepHandler};
use crate::gateway::ImageAttachment;
use crate::steps::prompts;
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::{Asset, Slot};
use crate::types::{ChecklistState, OcrResult};
use crate::wizard::Wizard;

/// Model-driven description of the uploaded dashboard and its checklist
pub struct ExtractionHandler;

impl ExtractionHandler {
    async fn extract(&self, wizard: &mut Wizard) -> Result<Transition, StepError> {
        if let Readiness::Blocked(reason) = self.readiness(wizard) {
            return Err(StepError::MissingInput(reason));
        }

        let image = ImageAttachment::from_bytes(wizard.store().read_asset(Asset::SourceImage)?);
        let prompt = prompts::extraction(&wizard.origin());
        let text = wizard
            .ask(prompt, vec![image], prompts::EXTRACTION_TEMPERATURE)
            .await?;

        wizard
            .store()
            .put(Slot::OcrResult, &OcrResult { text: text.clone() })?;
        wizard.session_mut().checklist.derive_from_ocr(&text);
        tracing::info!(
            items = wizard.session().checklist.len(),
            "Checklist derived from extraction"
        );
        Ok(Transition::Stay)
    }
}

#[async_trait]
impl StepHandler for ExtractionHandler {
    fn step(&self) -> StepId {
        StepId::Extraction
    }

    fn readiness(&self, wizard: &Wizard) -> Readiness {
        if wizard.store().has_asset(Asset::SourceImage) {
            Readiness::Ready
        } else {
            Readiness::Blocked("no dashboard image uploaded".to_string())
        }
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        match wizard.ocr_text() {
            Ok(text) if !text.trim().is_empty() => Ok(()),
            Ok(_) => Err("run the visual extraction first".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn before_advance(&self, wizard: &mut Wizard) -> Result<(), StepError> {
        let mut state: ChecklistState = wizard.store().get(Slot::Checklist)?;
        wizard.session_mut().checklist.flush_into(&mut state);
        wizard.store().put(Slot::Checklist, &state)?;
        tracing::info!(items = state.items.len(), "Checklist saved");
        Ok(())
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::RunExtraction => self.extract(wizard).await,
            StepAction::ToggleChecklistItem(key) => {
                if wizard.session_mut().checklist.toggle(&key) {
                    Ok(Transition::Stay)
                } else {
                    Err(StepError::InvalidInput(format!("no checklist item '{key}'")))
                }
            }
            StepAction::AddChecklistItem(label) => {
                match wizard.session_mut().checklist.add_manual(&label) {
                    Some(_) => Ok(Transition::Stay),
                    None => Err(StepError::InvalidInput(
                        "checklist item label is empty".to_string(),
                    )),
                }
            }
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
