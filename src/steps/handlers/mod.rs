//! One handler per wizard step, selected through [`handler_for`]

mod comparison;
mod evaluation;
mod export;
mod extraction;
mod platform;
mod script;
mod upload;
mod validation;

use async_trait::async_trait;
use std::path::Path;

use super::{Readiness, StepAction, StepError, StepId, Transition};
use crate::wizard::Wizard;

pub use comparison::ComparisonHandler;
pub use evaluation::EvaluationHandler;
pub use export::ExportHandler;
pub use extraction::ExtractionHandler;
pub use platform::PlatformHandler;
pub use script::ScriptHandler;
pub use upload::UploadHandler;
pub use validation::ValidationHandler;

/// Image extensions accepted for dashboard screenshots
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Behavior of a single wizard step
#[async_trait]
pub trait StepHandler: Send + Sync {
    fn step(&self) -> StepId;

    /// Whether the step's main action has its inputs
    fn readiness(&self, wizard: &Wizard) -> Readiness;

    /// Exit condition checked before advancing; `Err` holds the reason
    fn can_advance(&self, _wizard: &Wizard) -> Result<(), String> {
        Ok(())
    }

    /// Persist anything pending before the step is marked complete
    fn before_advance(&self, _wizard: &mut Wizard) -> Result<(), StepError> {
        Ok(())
    }

    /// Perform a step-specific action
    async fn handle(&self, wizard: &mut Wizard, action: StepAction)
        -> Result<Transition, StepError>;

    /// Mark the step complete and move to the next one
    fn advance(&self, wizard: &mut Wizard) -> Result<Transition, StepError> {
        let step = self.step();
        let next = step.next().ok_or_else(|| {
            StepError::NotReady(format!("'{}' is the last step", step.name()))
        })?;
        self.can_advance(wizard).map_err(StepError::NotReady)?;
        self.before_advance(wizard)?;
        wizard.sequencer_mut().mark_complete(step)?;
        Ok(Transition::Advance(next))
    }
}

static PLATFORM: PlatformHandler = PlatformHandler;
static UPLOAD: UploadHandler = UploadHandler;
static EXTRACTION: ExtractionHandler = ExtractionHandler;
static VALIDATION: ValidationHandler = ValidationHandler;
static SCRIPT: ScriptHandler = ScriptHandler;
static COMPARISON: ComparisonHandler = ComparisonHandler;
static EXPORT: ExportHandler = ExportHandler;
static EVALUATION: EvaluationHandler = EvaluationHandler;

/// Dispatch table from step to handler
pub fn handler_for(step: StepId) -> &'static dyn StepHandler {
    match step {
        StepId::Platform => &PLATFORM,
        StepId::Upload => &UPLOAD,
        StepId::Extraction => &EXTRACTION,
        StepId::Validation => &VALIDATION,
        StepId::Script => &SCRIPT,
        StepId::Comparison => &COMPARISON,
        StepId::Export => &EXPORT,
        StepId::Evaluation => &EVALUATION,
    }
}

fn unsupported(step: StepId, action: &StepAction) -> StepError {
    StepError::UnsupportedAction {
        step,
        action: action.label(),
    }
}

/// Reject empty uploads and files that are not PNG or JPEG screenshots
fn validate_image(file_name: &str, bytes: &[u8]) -> Result<(), StepError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StepError::InvalidInput(format!(
            "'{file_name}' is not a PNG or JPEG image"
        )));
    }
    if bytes.is_empty() {
        return Err(StepError::InvalidInput(format!("'{file_name}' is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table_covers_every_step() {
        for step in StepId::ALL {
            assert_eq!(handler_for(step).step(), step);
        }
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image("dash.PNG", b"x").is_ok());
        assert!(validate_image("dash.jpeg", b"x").is_ok());
        assert!(matches!(
            validate_image("dash.gif", b"x"),
            Err(StepError::InvalidInput(_))
        ));
        assert!(validate_image("dash.png", b"").is_err());
    }
}
