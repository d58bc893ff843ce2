//! Typed documents exchanged between the wizard steps and the store

mod documents;
pub mod evaluation;
pub mod platform;

pub use documents::{
    checklist_sort_key, ChecklistItem, ChecklistState, CurrentStep, OcrResult, ProgressRecord,
    RoteiroResult,
};
pub use evaluation::{EvaluationError, EvaluationLog, EvaluationRecord};
pub use platform::{PlatformSelection, DEFAULT_ORIGIN, TARGET_PLATFORM};
