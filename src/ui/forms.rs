//! Multi-field forms for the platform and evaluation steps

use crossterm::event::KeyCode;

use super::form_field::FormField;
use crate::steps::EvaluationInput;
use crate::types::platform::{
    model_id_for, versions_for, MODEL_CATALOG, ORIGIN_PLATFORMS, TARGET_VERSIONS,
};
use crate::types::PlatformSelection;

const DEFAULT_RATING: usize = 3;

/// Origin, versions and model selectors
pub struct PlatformForm {
    pub origin: FormField,
    pub origin_version: FormField,
    pub target_version: FormField,
    pub model: FormField,
    pub focus: usize,
}

impl Default for PlatformForm {
    fn default() -> Self {
        let origins: Vec<&str> = ORIGIN_PLATFORMS.iter().map(|(name, _)| *name).collect();
        let models: Vec<&str> = MODEL_CATALOG.iter().map(|(display, _)| *display).collect();
        let first_origin = origins.first().copied().unwrap_or_default();
        Self {
            origin: FormField::enum_select(&origins, 0),
            origin_version: FormField::enum_select(versions_for(first_origin), 0),
            target_version: FormField::enum_select(TARGET_VERSIONS, 0),
            model: FormField::enum_select(&models, 0),
            focus: 0,
        }
    }
}

impl PlatformForm {
    pub const FIELDS: usize = 4;

    /// Pre-fill from a saved selection
    pub fn load(&mut self, selection: &PlatformSelection) {
        if !selection.is_selected() {
            return;
        }
        self.origin.select_value(&selection.origin);
        self.origin_version
            .set_options(versions_for(&selection.origin));
        self.origin_version.select_value(&selection.origin_version);
        self.target_version.select_value(&selection.target_version);
        self.model.select_value(&selection.model_display);
    }

    pub fn field_mut(&mut self, index: usize) -> &mut FormField {
        match index {
            0 => &mut self.origin,
            1 => &mut self.origin_version,
            2 => &mut self.target_version,
            _ => &mut self.model,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Tab | KeyCode::Right => {
                self.focus = (self.focus + 1) % Self::FIELDS;
                true
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
                true
            }
            _ => {
                let before = self.origin.value();
                let consumed = self.field_mut(self.focus).handle_key(key);
                let origin = self.origin.value();
                if origin != before {
                    self.origin_version.set_options(versions_for(&origin));
                }
                consumed
            }
        }
    }

    pub fn to_selection(&self) -> PlatformSelection {
        let model_display = self.model.value();
        PlatformSelection {
            origin: self.origin.value(),
            origin_version: self.origin_version.value(),
            target_version: self.target_version.value(),
            model: model_id_for(&model_display).unwrap_or("custom").to_string(),
            model_display,
        }
    }
}

/// Recommendation, 1-5 rating and free-text comment
pub struct EvaluationForm {
    pub recommend: FormField,
    pub rating: FormField,
    pub comment: FormField,
    pub focus: usize,
}

impl Default for EvaluationForm {
    fn default() -> Self {
        Self {
            recommend: FormField::toggle(true, "Yes", "No"),
            rating: FormField::enum_select(&["1", "2", "3", "4", "5"], DEFAULT_RATING),
            comment: FormField::text_area("Comments or suggestions"),
            focus: 0,
        }
    }
}

impl EvaluationForm {
    pub const FIELDS: usize = 3;
    pub const COMMENT: usize = 2;

    pub fn editing_comment(&self) -> bool {
        self.focus == Self::COMMENT
    }

    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % Self::FIELDS;
                true
            }
            KeyCode::BackTab => {
                self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
                true
            }
            _ => match self.focus {
                0 => self.recommend.handle_key(key),
                1 => self.rating.handle_key(key),
                _ => self.comment.handle_key(key),
            },
        }
    }

    pub fn to_input(&self) -> EvaluationInput {
        EvaluationInput {
            recommend: self.recommend.is_on(),
            rating: self.rating.selected_index().map_or(4, |idx| idx as u8 + 1),
            comment: self.comment.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changing_origin_reloads_versions() {
        let mut form = PlatformForm::default();
        form.handle_key(KeyCode::Down);
        assert_eq!(form.origin.value(), "Tableau");
        assert_eq!(form.origin_version.value(), "2023.3");
    }

    #[test]
    fn test_selection_carries_model_id() {
        let mut form = PlatformForm::default();
        form.handle_key(KeyCode::Tab);
        form.handle_key(KeyCode::Tab);
        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Down);
        let selection = form.to_selection();
        assert_eq!(selection.origin, "MicroStrategy");
        assert_eq!(selection.target_version, "Power BI Pro");
        assert_eq!(selection.model, "gpt-4o");
        assert_eq!(selection.model_display, "OpenAI - GPT-4o");
    }

    #[test]
    fn test_load_restores_saved_selection() {
        let mut form = PlatformForm::default();
        form.load(&PlatformSelection {
            origin: "QlikView".to_string(),
            origin_version: "12.5".to_string(),
            target_version: "Power BI Service".to_string(),
            model_display: "OpenAI - GPT-4".to_string(),
            model: "gpt-4".to_string(),
        });
        assert_eq!(form.to_selection().origin_version, "12.5");
        assert_eq!(form.to_selection().model, "gpt-4");
    }

    #[test]
    fn test_evaluation_defaults() {
        let form = EvaluationForm::default();
        let input = form.to_input();
        assert!(input.recommend);
        assert_eq!(input.rating, 4);
        assert!(input.comment.is_empty());
    }
}
