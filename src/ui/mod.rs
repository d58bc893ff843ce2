pub mod form_field;
pub mod forms;
mod snapshot;
pub mod terminal_guard;
mod wizard_view;

pub use form_field::FormField;
pub use snapshot::{DatasetPreview, WizardSnapshot};
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use wizard_view::{centered_rect, InputTarget, StatusKind, StatusMessage, WizardView};
