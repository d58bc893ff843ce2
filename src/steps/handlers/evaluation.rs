use async_trait::async_trait;

use super::{unsupported, StepHandler};
use crate::steps::{Readiness, StepAction, StepError, StepId, Transition};
use crate::types::{EvaluationLog, EvaluationRecord};
use crate::wizard::Wizard;

/// Feedback form shown after the export; can restart the wizard
pub struct EvaluationHandler;

#[async_trait]
impl StepHandler for EvaluationHandler {
    fn step(&self) -> StepId {
        StepId::Evaluation
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
            StepAction::SubmitEvaluation(input) => {
                let record =
                    EvaluationRecord::new(input.recommend, input.rating, input.comment.trim())?;
                EvaluationLog::in_dir(&wizard.settings().output_dir).append(&record)?;
                wizard.session_mut().evaluation_submitted = true;
                Ok(Transition::Stay)
            }
            StepAction::Restart => Ok(Transition::Restart),
            other => Err(unsupported(self.step(), &other)),
        }
    }
}
