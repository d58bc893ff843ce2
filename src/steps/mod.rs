//! Wizard steps: identifiers, sequencing, session state and handlers

pub mod handlers;
pub mod prompts;
pub mod sequencer;
pub mod session;

pub use handlers::{handler_for, StepHandler};
pub use sequencer::Sequencer;
pub use session::{ChecklistDraft, LoadedDataset, Session};

use thiserror::Error;

use crate::datasource::{ConnectorError, DataSource};
use crate::gateway::GatewayError;
use crate::store::StoreError;
use crate::types::{EvaluationError, PlatformSelection};

/// The eight stages of the migration wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepId {
    Platform,
    Upload,
    Extraction,
    Validation,
    Script,
    Comparison,
    Export,
    /// Terminal pseudo-step past the named steps; never tracked in progress
    Evaluation,
}

impl StepId {
    /// Every step, including the evaluation pseudo-step
    pub const ALL: [StepId; 8] = [
        StepId::Platform,
        StepId::Upload,
        StepId::Extraction,
        StepId::Validation,
        StepId::Script,
        StepId::Comparison,
        StepId::Export,
        StepId::Evaluation,
    ];

    /// Steps with a completion flag
    pub const NAMED: [StepId; 7] = [
        StepId::Platform,
        StepId::Upload,
        StepId::Extraction,
        StepId::Validation,
        StepId::Script,
        StepId::Comparison,
        StepId::Export,
    ];

    pub fn index(&self) -> usize {
        match self {
            StepId::Platform => 0,
            StepId::Upload => 1,
            StepId::Extraction => 2,
            StepId::Validation => 3,
            StepId::Script => 4,
            StepId::Comparison => 5,
            StepId::Export => 6,
            StepId::Evaluation => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepId::Platform => "Platform selection",
            StepId::Upload => "Dashboard upload",
            StepId::Extraction => "Visual extraction",
            StepId::Validation => "Data validation",
            StepId::Script => "Script generation",
            StepId::Comparison => "Visual comparison",
            StepId::Export => "Final export",
            StepId::Evaluation => "Evaluation",
        }
    }

    /// Following step; the evaluation step is terminal
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_named(&self) -> bool {
        *self != StepId::Evaluation
    }
}

/// Whether a step has the inputs it needs to act
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Can act, but the result may be degraded
    Warning(String),
    /// Cannot act; the action is disabled
    Blocked(String),
}

impl Readiness {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Readiness::Blocked(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Readiness::Ready => None,
            Readiness::Warning(msg) | Readiness::Blocked(msg) => Some(msg),
        }
    }
}

/// What the sequencer does after a successful action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Advance(StepId),
    Restart,
}

/// Evaluation form values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationInput {
    pub recommend: bool,
    pub rating: u8,
    pub comment: String,
}

/// User actions routed to the current step's handler
pub enum StepAction {
    ConfirmPlatform(PlatformSelection),
    UploadSourceImage { file_name: String, bytes: Vec<u8> },
    RunExtraction,
    ToggleChecklistItem(String),
    AddChecklistItem(String),
    LoadDataset { file_name: String, bytes: Vec<u8> },
    LoadDatasetFrom(Box<dyn DataSource>),
    AnalyzeData,
    GenerateScript,
    UploadTargetImage { file_name: String, bytes: Vec<u8> },
    CompareDashboards,
    ExportReport,
    SubmitEvaluation(EvaluationInput),
    Advance,
    Restart,
}

impl StepAction {
    /// Short name for logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            StepAction::ConfirmPlatform(_) => "confirm_platform",
            StepAction::UploadSourceImage { .. } => "upload_source_image",
            StepAction::RunExtraction => "run_extraction",
            StepAction::ToggleChecklistItem(_) => "toggle_checklist_item",
            StepAction::AddChecklistItem(_) => "add_checklist_item",
            StepAction::LoadDataset { .. } => "load_dataset",
            StepAction::LoadDatasetFrom(_) => "load_dataset_from",
            StepAction::AnalyzeData => "analyze_data",
            StepAction::GenerateScript => "generate_script",
            StepAction::UploadTargetImage { .. } => "upload_target_image",
            StepAction::CompareDashboards => "compare_dashboards",
            StepAction::ExportReport => "export_report",
            StepAction::SubmitEvaluation(_) => "submit_evaluation",
            StepAction::Advance => "advance",
            StepAction::Restart => "restart",
        }
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("model call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("cannot advance yet: {0}")]
    NotReady(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("'{action}' is not available in step '{}'", .step.name())]
    UnsupportedAction { step: StepId, action: &'static str },
}

impl StepError {
    /// Follow-up advice shown next to the error, if any
    pub fn hint(&self) -> Option<String> {
        match self {
            StepError::Gateway(e) => e.hint(),
            _ => None,
        }
    }
}
