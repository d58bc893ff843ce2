use async_trait::async_trait;
use chrono::Local;

use super::{unsupported, StepHandler};
use crate::report::ReportInput;
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::{Asset, Slot};
use crate::types::{checklist_sort_key, ChecklistState, RoteiroResult};
use crate::wizard::Wizard;

/// Executive report built from every saved artifact
pub struct ExportHandler;

impl ExportHandler {
    fn collect(&self, wizard: &Wizard) -> Result<ReportInput, StepError> {
        let store = wizard.store();
        let roteiro: RoteiroResult = store.get(Slot::Roteiro)?;
        let checklist: ChecklistState = store.get(Slot::Checklist)?;

        let mut items: Vec<(String, _)> = checklist.items.clone().into_iter().collect();
        items.sort_by_key(|(key, _)| checklist_sort_key(key));

        Ok(ReportInput {
            platform: wizard.platform()?,
            ocr_text: wizard.ocr_text()?,
            script_text: roteiro.content,
            comparison_text: checklist.comparison().unwrap_or_default().to_string(),
            checklist: items.into_iter().map(|(_, item)| item).collect(),
            progress: wizard.sequencer().progress().clone(),
            source_image: store
                .has_asset(Asset::SourceImage)
                .then(|| store.asset_path(Asset::SourceImage)),
            target_image: store
                .has_asset(Asset::TargetImage)
                .then(|| store.asset_path(Asset::TargetImage)),
            generated_at: Local::now(),
        })
    }
}

#[async_trait]
impl StepHandler for ExportHandler {
    fn step(&self) -> StepId {
        StepId::Export
    }

    fn readiness(&self, _wizard: &Wizard) -> Readiness {
        Readiness::Ready
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::ExportReport => {
                let input = self.collect(wizard)?;
                let out_dir = wizard.settings().output_dir.clone();
                let path = wizard
                    .exporter()
                    .export(&input, &out_dir)
                    .map_err(StepError::Report)?;
                wizard.session_mut().report_path = Some(path);
                Ok(Transition::Stay)
            }
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
