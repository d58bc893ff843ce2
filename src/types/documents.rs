//! Documents persisted in the store, one per slot

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::steps::StepId;

/// Completion flag per named step, keyed by step name.
///
/// A flag only turns true through the step's own handler and only turns
/// false again through a global reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressRecord(BTreeMap<String, bool>);

impl Default for ProgressRecord {
    fn default() -> Self {
        Self(
            StepId::NAMED
                .iter()
                .map(|step| (step.name().to_string(), false))
                .collect(),
        )
    }
}

impl ProgressRecord {
    pub fn is_complete(&self, step: StepId) -> bool {
        self.0.get(step.name()).copied().unwrap_or(false)
    }

    pub fn set_complete(&mut self, step: StepId) {
        self.0.insert(step.name().to_string(), true);
    }

    /// Completion flags in wizard order
    pub fn entries(&self) -> Vec<(StepId, bool)> {
        StepId::NAMED
            .iter()
            .map(|step| (*step, self.is_complete(*step)))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        StepId::NAMED
            .iter()
            .filter(|step| self.is_complete(**step))
            .count()
    }

    pub fn all_complete(&self) -> bool {
        self.completed_count() == StepId::NAMED.len()
    }
}

/// Persisted step pointer (`etapa_atual` slot)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStep {
    #[serde(default)]
    pub pointer: usize,
}

/// Model-generated description of the uploaded dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(default)]
    pub text: String,
}

impl OcrResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Technical migration script followed by the recommended DAX measures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoteiroResult {
    #[serde(default)]
    pub content: String,
}

impl RoteiroResult {
    /// Join the migration script and the measure list into one document
    pub fn compose(script: &str, measures: &str) -> Self {
        Self {
            content: format!(
                "## Roteiro Técnico\n\n{}\n\n---\n\n## Medidas DAX Recomendadas\n\n{}",
                script.trim(),
                measures.trim()
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: false,
        }
    }
}

/// Checklist of detected components plus the final visual comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistState {
    #[serde(default)]
    pub items: BTreeMap<String, ChecklistItem>,
    /// Narrative produced by the visual comparison step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_comparison: Option<String>,
}

impl ChecklistState {
    pub fn comparison(&self) -> Option<&str> {
        self.visual_comparison
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Ordering for checklist keys: derived items by index, then manual items.
///
/// Plain string order would put `comp_10` before `comp_2`.
pub fn checklist_sort_key(key: &str) -> (u8, usize, String) {
    let (rank, rest) = if let Some(rest) = key.strip_prefix("comp_") {
        (0, rest)
    } else if let Some(rest) = key.strip_prefix("manual_") {
        (1, rest)
    } else {
        (2, key)
    };
    let index = rest.parse().unwrap_or(usize::MAX);
    (rank, index, key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_progress_has_every_named_step() {
        let progress = ProgressRecord::default();
        assert_eq!(progress.entries().len(), 7);
        assert_eq!(progress.completed_count(), 0);
        assert!(!progress.all_complete());
    }

    #[test]
    fn test_progress_serializes_as_plain_map() {
        let mut progress = ProgressRecord::default();
        progress.set_complete(StepId::Platform);
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json[StepId::Platform.name()], serde_json::Value::Bool(true));
        assert_eq!(json[StepId::Export.name()], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_roteiro_compose_keeps_both_sections() {
        let roteiro = RoteiroResult::compose("passo 1", "Total = SUM(x)");
        assert!(roteiro.content.starts_with("## Roteiro Técnico"));
        assert!(roteiro.content.contains("passo 1"));
        assert!(roteiro.content.contains("## Medidas DAX Recomendadas\n\nTotal = SUM(x)"));
    }

    #[test]
    fn test_checklist_sort_key_orders_numerically() {
        let mut keys = vec!["manual_3", "comp_10", "comp_2", "comp_0"];
        keys.sort_by_key(|key| checklist_sort_key(key));
        assert_eq!(keys, vec!["comp_0", "comp_2", "comp_10", "manual_3"]);
    }

    #[test]
    fn test_blank_comparison_is_absent() {
        let state = ChecklistState {
            items: BTreeMap::new(),
            visual_comparison: Some("  ".to_string()),
        };
        assert!(state.comparison().is_none());
    }
}
