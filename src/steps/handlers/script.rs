use async_trait::async_trait;

use super::{unsupported, StepHandler};
use crate::datasource::{DataSource, FileSource};
use crate::steps::prompts;
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::Slot;
use crate::types::RoteiroResult;
use crate::wizard::Wizard;

/// Migration script and DAX measures, saved together as the roteiro
pub struct ScriptHandler;

impl ScriptHandler {
    /// Columns from the session dataset, or from the first dataset on disk
    fn columns(&self, wizard: &Wizard) -> Result<String, StepError> {
        if let Some(dataset) = &wizard.session().dataset {
            return Ok(dataset.table.column_list());
        }
        let path = wizard
            .store()
            .find_dataset()?
            .ok_or_else(|| StepError::MissingInput("no dataset file found".to_string()))?;
        Ok(FileSource::new(path).load()?.column_list())
    }

    async fn generate(&self, wizard: &mut Wizard) -> Result<Transition, StepError> {
        if let Readiness::Blocked(reason) = self.readiness(wizard) {
            return Err(StepError::MissingInput(reason));
        }

        let origin = wizard.origin();
        let ocr_text = wizard.ocr_text()?;
        let columns = self.columns(wizard)?;

        let script = wizard
            .ask(
                prompts::migration_script(&origin, &ocr_text, &columns),
                Vec::new(),
                prompts::ANALYSIS_TEMPERATURE,
            )
            .await?;
        let measures = wizard
            .ask(
                prompts::dax_measures(&origin, &ocr_text, &columns),
                Vec::new(),
                prompts::ANALYSIS_TEMPERATURE,
            )
            .await?;

        wizard
            .store()
            .put(Slot::Roteiro, &RoteiroResult::compose(&script, &measures))?;
        Ok(Transition::Stay)
    }
}

#[async_trait]
impl StepHandler for ScriptHandler {
    fn step(&self) -> StepId {
        StepId::Script
    }

    fn readiness(&self, wizard: &Wizard) -> Readiness {
        let has_ocr = wizard
            .ocr_text()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false);
        if !has_ocr {
            return Readiness::Blocked("no extraction text; run the visual extraction".to_string());
        }

        let has_dataset = wizard.session().dataset.is_some()
            || matches!(wizard.store().find_dataset(), Ok(Some(_)));
        if has_dataset {
            Readiness::Ready
        } else {
            Readiness::Blocked("no dataset found; load one in data validation".to_string())
        }
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        match wizard.store().get::<RoteiroResult>(Slot::Roteiro) {
            Ok(roteiro) if !roteiro.is_empty() => Ok(()),
            Ok(_) => Err("generate the migration script first".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::GenerateScript => self.generate(wizard).await,
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
