use async_trait::async_trait;

use super::{unsupported, validate_image, StepHandler};
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::Asset;
use crate::wizard::Wizard;

/// Screenshot of the dashboard on the origin platform
pub struct UploadHandler;

#[async_trait]
impl StepHandler for UploadHandler {
    fn step(&self) -> StepId {
        StepId::Upload
    }

    fn readiness(&self, _wizard: &Wizard) -> Readiness {
        Readiness::Ready
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        if wizard.session().source_uploaded && wizard.store().has_asset(Asset::SourceImage) {
            Ok(())
        } else {
            Err("upload a dashboard image first".to_string())
        }
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::UploadSourceImage { file_name, bytes } => {
                validate_image(&file_name, &bytes)?;
                wizard.store().put_asset(Asset::SourceImage, &bytes)?;
                wizard.session_mut().source_uploaded = true;
                Ok(Transition::Stay)
            }
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
