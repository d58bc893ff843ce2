use async_trait::async_trait;

use super::{unsupported, StepHandler};
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::store::Slot;
use crate::types::PlatformSelection;
use crate::wizard::Wizard;

/// Origin platform, versions and model choice
pub struct PlatformHandler;

impl PlatformHandler {
    fn confirm(
        &self,
        wizard: &mut Wizard,
        selection: PlatformSelection,
    ) -> Result<Transition, StepError> {
        if !selection.is_selected() {
            return Err(StepError::InvalidInput(
                "choose an origin platform first".to_string(),
            ));
        }
        wizard.store().put(Slot::Plataforma, &selection)?;
        tracing::info!(
            origin = %selection.origin,
            origin_version = %selection.origin_version,
            target_version = %selection.target_version,
            model = %selection.model,
            "Platform selection saved"
        );
        self.advance(wizard)
    }
}

#[async_trait]
impl StepHandler for PlatformHandler {
    fn step(&self) -> StepId {
        StepId::Platform
    }

    fn readiness(&self, _wizard: &Wizard) -> Readiness {
        Readiness::Ready
    }

    fn can_advance(&self, wizard: &Wizard) -> Result<(), String> {
        match wizard.platform() {
            Ok(platform) if platform.is_selected() => Ok(()),
            Ok(_) => Err("no platform confirmed".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn handle(
        &self,
        wizard: &mut Wizard,
        action: StepAction,
    ) -> Result<Transition, StepError> {
        match action {
            StepAction::ConfirmPlatform(selection) => self.confirm(wizard, selection),
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
