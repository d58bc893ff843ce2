//! Step pointer and completion flags, persisted through the store

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{Slot, Store, StoreError};
use crate::types::{ChecklistState, CurrentStep, OcrResult, PlatformSelection, ProgressRecord, RoteiroResult};

use super::StepId;

/// Tracks the active step and which named steps are done.
///
/// Every mutation is written to the store immediately; there is no
/// in-memory state that can drift from disk.
pub struct Sequencer {
    store: Store,
    current: StepId,
    progress: ProgressRecord,
}

impl Sequencer {
    /// Load pointer and progress from the store.
    ///
    /// A pointer that does not name a step (hand-edited file) resolves to
    /// the first step.
    pub fn load(store: Store) -> Result<Self, StoreError> {
        let pointer: CurrentStep = store.get(Slot::EtapaAtual)?;
        let current = StepId::from_index(pointer.pointer).unwrap_or_else(|| {
            tracing::warn!(pointer = pointer.pointer, "Stored step pointer out of range, starting over");
            StepId::Platform
        });
        let progress = store.get(Slot::Progress)?;

        Ok(Self {
            store,
            current,
            progress,
        })
    }

    pub fn current(&self) -> StepId {
        self.current
    }

    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    pub fn is_complete(&self, step: StepId) -> bool {
        self.progress.is_complete(step)
    }

    /// Move the pointer to `step` with no guard and persist it
    pub fn navigate_to(&mut self, step: StepId) -> Result<(), StoreError> {
        self.store.put(
            Slot::EtapaAtual,
            &CurrentStep {
                pointer: step.index(),
            },
        )?;
        tracing::info!(from = self.current.name(), to = step.name(), "Step changed");
        self.current = step;
        Ok(())
    }

    /// Set a step's completion flag and persist the whole record.
    ///
    /// The evaluation step has no flag and is ignored.
    pub fn mark_complete(&mut self, step: StepId) -> Result<(), StoreError> {
        if !step.is_named() {
            return Ok(());
        }
        let mut progress = self.progress.clone();
        progress.set_complete(step);
        self.store.put(Slot::Progress, &progress)?;
        self.progress = progress;
        tracing::debug!(step = step.name(), "Step marked complete");
        Ok(())
    }

    /// Fraction of the named steps reached, for the progress gauge
    pub fn progress_ratio(&self) -> f64 {
        let total = StepId::NAMED.len();
        let position = (self.current.index() + 1).min(total);
        position as f64 / total as f64
    }

    /// Rewrite every slot to its empty default and go back to the first step
    pub fn reset(&mut self) -> Result<(), StoreError> {
        Self::reset_store(&self.store)?;
        self.progress = ProgressRecord::default();
        self.current = StepId::Platform;
        Ok(())
    }

    /// Rewrite every slot to its empty default without reading any of them
    pub fn reset_store(store: &Store) -> Result<(), StoreError> {
        store.put(Slot::Progress, &ProgressRecord::default())?;
        store.put(Slot::Roteiro, &RoteiroResult::default())?;
        store.put(Slot::Checklist, &ChecklistState::default())?;
        store.put(Slot::OcrResult, &OcrResult::default())?;
        store.put(Slot::Plataforma, &PlatformSelection::default())?;
        store.put(Slot::EtapaAtual, &CurrentStep::default())?;
        tracing::info!(data_dir = %store.data_dir().display(), "Wizard state reset");
        Ok(())
    }

    /// Make every slot loadable before the wizard reads it.
    ///
    /// Absent slots get their default; other slots are left alone. A slot
    /// that no longer parses (a write cut short) is replaced by its default
    /// and its parse error is returned so the UI can report it.
    pub fn prepare_store(store: &Store) -> Result<Vec<StoreError>, StoreError> {
        let mut repaired = Vec::new();
        prepare_slot::<ProgressRecord>(store, Slot::Progress, &mut repaired)?;
        prepare_slot::<RoteiroResult>(store, Slot::Roteiro, &mut repaired)?;
        prepare_slot::<ChecklistState>(store, Slot::Checklist, &mut repaired)?;
        prepare_slot::<OcrResult>(store, Slot::OcrResult, &mut repaired)?;
        prepare_slot::<PlatformSelection>(store, Slot::Plataforma, &mut repaired)?;
        prepare_slot::<CurrentStep>(store, Slot::EtapaAtual, &mut repaired)?;
        Ok(repaired)
    }
}

fn prepare_slot<T>(store: &Store, slot: Slot, repaired: &mut Vec<StoreError>) -> Result<(), StoreError>
where
    T: DeserializeOwned + Serialize + Default,
{
    if !store.exists(slot) {
        tracing::debug!(slot = slot.name(), "Creating missing slot");
        return store.put(slot, &T::default());
    }
    match store.get::<T>(slot) {
        Ok(_) => Ok(()),
        Err(e @ StoreError::Parse { .. }) => {
            tracing::warn!(slot = slot.name(), error = %e, "Unreadable slot replaced by its default");
            store.put(slot, &T::default())?;
            repaired.push(e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_sequencer() -> (TempDir, Sequencer) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        let sequencer = Sequencer::load(store).unwrap();
        (temp_dir, sequencer)
    }

    #[test]
    fn test_fresh_store_starts_at_first_step() {
        let (_dir, sequencer) = test_sequencer();
        assert_eq!(sequencer.current(), StepId::Platform);
        assert_eq!(sequencer.progress().completed_count(), 0);
    }

    #[test]
    fn test_navigate_persists_pointer() {
        let (dir, mut sequencer) = test_sequencer();
        sequencer.navigate_to(StepId::Script).unwrap();

        let reloaded = Sequencer::load(Store::open(dir.path()).unwrap()).unwrap();
        assert_eq!(reloaded.current(), StepId::Script);
    }

    #[test]
    fn test_mark_complete_persists_and_ignores_evaluation() {
        let (dir, mut sequencer) = test_sequencer();
        sequencer.mark_complete(StepId::Upload).unwrap();
        sequencer.mark_complete(StepId::Evaluation).unwrap();

        let reloaded = Sequencer::load(Store::open(dir.path()).unwrap()).unwrap();
        assert!(reloaded.is_complete(StepId::Upload));
        assert!(!reloaded.is_complete(StepId::Platform));
        assert_eq!(reloaded.progress().completed_count(), 1);
    }

    #[test]
    fn test_out_of_range_pointer_loads_as_first_step() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        store
            .put(Slot::EtapaAtual, &CurrentStep { pointer: 42 })
            .unwrap();

        let sequencer = Sequencer::load(store).unwrap();
        assert_eq!(sequencer.current(), StepId::Platform);
    }

    #[test]
    fn test_reset_clears_every_slot() {
        let (dir, mut sequencer) = test_sequencer();
        let store = Store::open(dir.path()).unwrap();
        store
            .put(
                Slot::OcrResult,
                &OcrResult {
                    text: "Gráfico".to_string(),
                },
            )
            .unwrap();
        sequencer.mark_complete(StepId::Extraction).unwrap();
        sequencer.navigate_to(StepId::Export).unwrap();

        sequencer.reset().unwrap();

        assert_eq!(sequencer.current(), StepId::Platform);
        assert_eq!(sequencer.progress().completed_count(), 0);
        let ocr: OcrResult = store.get(Slot::OcrResult).unwrap();
        assert!(ocr.is_empty());
        for slot in Slot::ALL {
            assert!(store.exists(slot), "{} should exist", slot.name());
        }
    }

    #[test]
    fn test_prepare_store_only_fills_missing_slots() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        let ocr = OcrResult {
            text: "KPI de receita".to_string(),
        };
        store.put(Slot::OcrResult, &ocr).unwrap();

        let repaired = Sequencer::prepare_store(&store).unwrap();

        assert!(repaired.is_empty());
        assert_eq!(store.get::<OcrResult>(Slot::OcrResult).unwrap(), ocr);
        for slot in Slot::ALL {
            assert!(store.exists(slot), "{} should exist", slot.name());
        }
    }

    #[test]
    fn test_prepare_store_repairs_truncated_slot() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        store.put(Slot::Progress, &ProgressRecord::default()).unwrap();
        std::fs::write(store.slot_path(Slot::EtapaAtual), "").unwrap();

        let repaired = Sequencer::prepare_store(&store).unwrap();

        assert_eq!(repaired.len(), 1);
        assert!(matches!(repaired[0], StoreError::Parse { slot: "etapa_atual", .. }));
        let sequencer = Sequencer::load(store).unwrap();
        assert_eq!(sequencer.current(), StepId::Platform);
    }

    #[test]
    fn test_reset_store_overwrites_unreadable_slots() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        std::fs::write(store.slot_path(Slot::Checklist), "{\"items\": {").unwrap();

        Sequencer::reset_store(&store).unwrap();

        assert!(store.get::<ChecklistState>(Slot::Checklist).unwrap().items.is_empty());
    }

    #[test]
    fn test_progress_ratio() {
        let (_dir, mut sequencer) = test_sequencer();
        assert!((sequencer.progress_ratio() - 1.0 / 7.0).abs() < f64::EPSILON);
        sequencer.navigate_to(StepId::Evaluation).unwrap();
        assert!((sequencer.progress_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
