//! In-memory state tied to the running wizard process

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::datasource::TabularData;
use crate::types::{checklist_sort_key, ChecklistItem, ChecklistState};

/// Words that mark an extracted line as a dashboard component
pub const COMPONENT_KEYWORDS: &[&str] = &["gráfico", "grafico", "kpi", "filtro", "campo", "tabela"];

const DERIVED_PREFIX: &str = "comp_";
const MANUAL_PREFIX: &str = "manual_";

/// Trimmed extraction lines that mention a component keyword, in order
pub fn extract_components(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            COMPONENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// A dataset loaded during this session
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// File name or connector description shown to the user
    pub source: String,
    pub table: TabularData,
}

/// Editable overlay over the persisted checklist.
///
/// Edits stay in memory until [`ChecklistDraft::flush_into`] is called on a
/// confirmed action.
#[derive(Debug, Clone, Default)]
pub struct ChecklistDraft {
    items: BTreeMap<String, ChecklistItem>,
    dirty: bool,
}

impl ChecklistDraft {
    /// Seed from the stored checklist, or from the stored extraction text
    /// when the checklist holds no items yet
    pub fn from_state(state: &ChecklistState, ocr_text: &str) -> Self {
        if state.items.is_empty() {
            let mut draft = Self::default();
            draft.derive_from_ocr(ocr_text);
            draft.dirty = false;
            draft
        } else {
            Self {
                items: state.items.clone(),
                dirty: false,
            }
        }
    }

    /// Replace the derived items with the components found in `text`.
    ///
    /// Manual items survive a new extraction; a derived item whose label is
    /// unchanged keeps its checked state.
    pub fn derive_from_ocr(&mut self, text: &str) {
        let previous: BTreeMap<String, ChecklistItem> = self
            .items
            .iter()
            .filter(|(key, _)| key.starts_with(DERIVED_PREFIX))
            .map(|(key, item)| (key.clone(), item.clone()))
            .collect();
        self.items.retain(|key, _| !key.starts_with(DERIVED_PREFIX));

        for (index, label) in extract_components(text).into_iter().enumerate() {
            let key = format!("{DERIVED_PREFIX}{index}");
            let checked = previous
                .get(&key)
                .is_some_and(|item| item.label == label && item.checked);
            self.items.insert(key, ChecklistItem { label, checked });
        }
        self.dirty = true;
    }

    /// Add a user item; blank labels are ignored. Returns the new key.
    pub fn add_manual(&mut self, label: &str) -> Option<String> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let mut n = self.items.len();
        let mut key = format!("{MANUAL_PREFIX}{n}");
        while self.items.contains_key(&key) {
            n += 1;
            key = format!("{MANUAL_PREFIX}{n}");
        }
        self.items.insert(key.clone(), ChecklistItem::new(label));
        self.dirty = true;
        Some(key)
    }

    /// Flip an item's checked state; unknown keys are ignored
    pub fn toggle(&mut self, key: &str) -> bool {
        match self.items.get_mut(key) {
            Some(item) => {
                item.checked = !item.checked;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Items with derived ones first, each group in numeric key order
    pub fn items_sorted(&self) -> Vec<(&str, &ChecklistItem)> {
        let mut items: Vec<(&str, &ChecklistItem)> =
            self.items.iter().map(|(key, item)| (key.as_str(), item)).collect();
        items.sort_by_key(|(key, _)| checklist_sort_key(key));
        items
    }

    /// Write the draft items into `state`, keeping its comparison narrative
    pub fn flush_into(&mut self, state: &mut ChecklistState) {
        state.items = self.items.clone();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Process-local state; nothing here is persisted
#[derive(Debug, Default)]
pub struct Session {
    pub source_uploaded: bool,
    pub target_uploaded: bool,
    pub dataset: Option<LoadedDataset>,
    /// Last compatibility analysis from the data validation step
    pub analysis: Option<String>,
    pub checklist: ChecklistDraft,
    pub report_path: Option<PathBuf>,
    pub evaluation_submitted: bool,
}

impl Session {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
