use async_trait::async_trait;

use super::{unsupported, validate_image, StepHandler};
use crate::gateway::ImageAttachment;
use crate::steps::prompts;
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::{Asset, Slot};
use crate::types::{ChecklistState, RoteiroResult};
use crate::wizard::Wizard;

/// Side-by-side review of the original and rebuilt dashboards
pub struct ComparisonHandler;

impl ComparisonHandler {
    async fn compare(&self, wizard: &mut Wizard) -> Result<Transition, StepError> {
        if let Readiness::Blocked(reason) = self.readiness(wizard) {
            return Err(StepError::MissingInput(reason));
        }

        let source = ImageAttachment::from_bytes(wizard.store().read_asset(Asset::SourceImage)?);
        let target = ImageAttachment::from_bytes(wizard.store().read_asset(Asset::TargetImage)?);
        let roteiro: RoteiroResult = wizard.store().get(Slot::Roteiro)?;

        let prompt = prompts::visual_comparison(&wizard.origin(), &roteiro.content);
        let narrative = wizard
            .ask(prompt, vec![source, target], prompts::COMPARISON_TEMPERATURE)
            .await?;

        let mut state: ChecklistState = wizard.store().get(Slot::Checklist)?;
        state.visual_comparison = Some(narrative);
        wizard.store().put(Slot::Checklist, &state)?;
        Ok(Transition::Stay)
    }
}

#[async_trait]
impl StepHandler for ComparisonHandler {
    fn step(&self) -> StepId {
        StepId::Comparison
    }

    fn readiness(&self, wizard: &Wizard) -> Readiness {
        if !wizard.store().has_asset(Asset::SourceImage) {
            Readiness::Blocked("the original dashboard image is missing".to_string())
        } else if !wizard.session().target_uploaded {
            Readiness::Blocked("upload the Power BI dashboard image first".to_string())
        } else {
            Readiness::Ready
        }
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        match wizard.store().get::<ChecklistState>(Slot::Checklist) {
            Ok(state) if state.comparison().is_some() => Ok(()),
            Ok(_) => Err("run the visual comparison first".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::UploadTargetImage { file_name, bytes } => {
                validate_image(&file_name, &bytes)?;
                wizard.store().put_asset(Asset::TargetImage, &bytes)?;
                wizard.session_mut().target_uploaded = true;
                Ok(Transition::Stay)
            }
            StepAction::CompareDashboards => self.compare(wizard).await,
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
