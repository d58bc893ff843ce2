//! Read-only copy of the wizard state taken after every change

use std::path::PathBuf;

use crate::steps::{Readiness, StepId};
use crate::store::{Asset, Slot};
use crate::types::{
    ChecklistItem, ChecklistState, OcrResult, PlatformSelection, ProgressRecord, RoteiroResult,
};
use crate::wizard::Wizard;

/// Loaded dataset summary for the validation preview
#[derive(Debug, Clone, Default)]
pub struct DatasetPreview {
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
}

/// Everything the renderer shows, so drawing never touches the store
#[derive(Debug, Clone)]
pub struct WizardSnapshot {
    pub current: StepId,
    pub progress: ProgressRecord,
    pub ratio: f64,
    pub platform: PlatformSelection,
    pub ocr_text: String,
    pub roteiro: String,
    pub comparison: Option<String>,
    /// Draft checklist (unsaved edits included), in display order
    pub checklist: Vec<(String, ChecklistItem)>,
    pub checklist_dirty: bool,
    pub dataset: Option<DatasetPreview>,
    pub analysis: Option<String>,
    pub has_source_image: bool,
    pub source_uploaded: bool,
    pub target_uploaded: bool,
    pub report_path: Option<PathBuf>,
    pub evaluation_submitted: bool,
    pub readiness: Readiness,
    pub advance_blocker: Option<String>,
    pub gateway_configured: bool,
    /// First slot that failed to load or was repaired at open, shown instead
    /// of silently defaulting
    pub load_error: Option<String>,
}

impl WizardSnapshot {
    pub fn capture(wizard: &Wizard) -> Self {
        let store = wizard.store();
        let session = wizard.session();
        let mut load_error = wizard.repaired_slots().first().cloned();

        let platform: PlatformSelection = store.get(Slot::Plataforma).unwrap_or_else(|e| {
            load_error.get_or_insert(e.to_string());
            PlatformSelection::default()
        });
        let ocr: OcrResult = store.get(Slot::OcrResult).unwrap_or_else(|e| {
            load_error.get_or_insert(e.to_string());
            OcrResult::default()
        });
        let roteiro: RoteiroResult = store.get(Slot::Roteiro).unwrap_or_else(|e| {
            load_error.get_or_insert(e.to_string());
            RoteiroResult::default()
        });
        let checklist_state: ChecklistState = store.get(Slot::Checklist).unwrap_or_else(|e| {
            load_error.get_or_insert(e.to_string());
            ChecklistState::default()
        });

        let checklist: Vec<(String, ChecklistItem)> = session
            .checklist
            .items_sorted()
            .into_iter()
            .map(|(key, item)| (key.to_string(), item.clone()))
            .collect();

        let preview_rows = wizard.settings().preview_rows;
        let dataset = session.dataset.as_ref().map(|dataset| DatasetPreview {
            source: dataset.source.clone(),
            columns: dataset.table.columns.clone(),
            rows: dataset.table.head(preview_rows).to_vec(),
            row_count: dataset.table.row_count(),
        });

        let sequencer = wizard.sequencer();
        Self {
            current: sequencer.current(),
            progress: sequencer.progress().clone(),
            ratio: sequencer.progress_ratio(),
            platform,
            ocr_text: ocr.text,
            roteiro: roteiro.content,
            comparison: checklist_state.comparison().map(str::to_string),
            checklist,
            checklist_dirty: session.checklist.is_dirty(),
            dataset,
            analysis: session.analysis.clone(),
            has_source_image: store.has_asset(Asset::SourceImage),
            source_uploaded: session.source_uploaded,
            target_uploaded: session.target_uploaded,
            report_path: session.report_path.clone(),
            evaluation_submitted: session.evaluation_submitted,
            readiness: wizard.readiness(),
            advance_blocker: wizard.advance_blocker(),
            gateway_configured: wizard.gateway_configured(),
            load_error,
        }
    }
}
