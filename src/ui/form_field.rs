//! Input widgets used by the wizard forms

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

/// A form field widget that can handle different input types
pub enum FormField {
    /// Single-line text input; the cursor counts characters, not bytes
    TextInput {
        value: String,
        cursor: usize,
        placeholder: String,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// Selection from a fixed list
    EnumSelect {
        options: Vec<String>,
        selected: usize,
        list_state: ListState,
    },
    Toggle {
        value: bool,
        true_label: String,
        false_label: String,
    },
}

impl FormField {
    pub fn text_input(placeholder: &str) -> Self {
        FormField::TextInput {
            value: String::new(),
            cursor: 0,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn text_area(placeholder: &str) -> Self {
        FormField::TextArea {
            textarea: Box::new(TextArea::default()),
            placeholder: placeholder.to_string(),
        }
    }

    pub fn enum_select<S: AsRef<str>>(options: &[S], selected: usize) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let selected = selected.min(options.len().saturating_sub(1));
        let mut list_state = ListState::default();
        list_state.select(Some(selected));
        FormField::EnumSelect {
            options,
            selected,
            list_state,
        }
    }

    pub fn toggle(value: bool, true_label: &str, false_label: &str) -> Self {
        FormField::Toggle {
            value,
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::EnumSelect {
                options, selected, ..
            } => options.get(*selected).cloned().unwrap_or_default(),
            FormField::Toggle { value, .. } => value.to_string(),
        }
    }

    /// Boolean value of a toggle; other fields are never "on"
    pub fn is_on(&self) -> bool {
        matches!(self, FormField::Toggle { value: true, .. })
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self {
            FormField::EnumSelect { selected, .. } => Some(*selected),
            _ => None,
        }
    }

    /// Replace the options of a select, keeping the first one selected
    pub fn set_options<S: AsRef<str>>(&mut self, new_options: &[S]) {
        if let FormField::EnumSelect {
            options,
            selected,
            list_state,
        } = self
        {
            *options = new_options.iter().map(|o| o.as_ref().to_string()).collect();
            *selected = 0;
            list_state.select(Some(0));
        }
    }

    /// Select the option equal to `wanted`, if present
    pub fn select_value(&mut self, wanted: &str) {
        if let FormField::EnumSelect {
            options,
            selected,
            list_state,
        } = self
        {
            if let Some(idx) = options.iter().position(|o| o == wanted) {
                *selected = idx;
                list_state.select(Some(idx));
            }
        }
    }

    pub fn clear(&mut self) {
        match self {
            FormField::TextInput { value, cursor, .. } => {
                value.clear();
                *cursor = 0;
            }
            FormField::TextArea { textarea, .. } => {
                textarea.select_all();
                textarea.cut();
            }
            FormField::EnumSelect { .. } | FormField::Toggle { .. } => {}
        }
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput { value, cursor, .. } => {
                let len = value.chars().count();
                match key {
                    KeyCode::Char(c) => {
                        value.insert(byte_index(value, *cursor), c);
                        *cursor += 1;
                        true
                    }
                    KeyCode::Backspace => {
                        if *cursor > 0 {
                            *cursor -= 1;
                            value.remove(byte_index(value, *cursor));
                        }
                        true
                    }
                    KeyCode::Delete => {
                        if *cursor < len {
                            value.remove(byte_index(value, *cursor));
                        }
                        true
                    }
                    KeyCode::Left => {
                        *cursor = cursor.saturating_sub(1);
                        true
                    }
                    KeyCode::Right => {
                        *cursor = (*cursor + 1).min(len);
                        true
                    }
                    KeyCode::Home => {
                        *cursor = 0;
                        true
                    }
                    KeyCode::End => {
                        *cursor = len;
                        true
                    }
                    _ => false,
                }
            }
            FormField::TextArea { textarea, .. } => {
                textarea.input(KeyEvent::new(key, KeyModifiers::NONE));
                true
            }
            FormField::EnumSelect {
                options,
                selected,
                list_state,
            } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    *selected = selected.saturating_sub(1);
                    list_state.select(Some(*selected));
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected < options.len().saturating_sub(1) {
                        *selected += 1;
                        list_state.select(Some(*selected));
                    }
                    true
                }
                _ => false,
            },
            FormField::Toggle { value, .. } => match key {
                KeyCode::Char(' ') | KeyCode::Up | KeyCode::Down => {
                    *value = !*value;
                    true
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    *value = true;
                    true
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    *value = false;
                    true
                }
                _ => false,
            },
        }
    }

    /// Render the field inside a titled border
    pub fn render(&mut self, frame: &mut Frame, area: Rect, title: &str, focused: bool) {
        let border_color = if focused { Color::Cyan } else { Color::Gray };
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        match self {
            FormField::TextInput {
                value,
                cursor,
                placeholder,
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else if focused {
                    let mut text = value.clone();
                    text.insert(byte_index(value, *cursor), '|');
                    Line::from(text)
                } else {
                    Line::from(value.as_str())
                };
                frame.render_widget(Paragraph::new(content).block(block), area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
                textarea.set_block(block);
                frame.render_widget(&**textarea, area);
            }
            FormField::EnumSelect {
                options,
                selected,
                list_state,
            } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| {
                        let style = if i == *selected {
                            Style::default().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        ListItem::new(Span::styled(opt.as_str(), style))
                    })
                    .collect();

                let highlight = if focused {
                    Style::default()
                        .add_modifier(Modifier::REVERSED)
                        .fg(Color::Cyan)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                let list = List::new(items)
                    .block(block)
                    .highlight_style(highlight)
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, area, list_state);
            }
            FormField::Toggle {
                value,
                true_label,
                false_label,
            } => {
                let on = Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD);
                let off = Style::default().fg(Color::DarkGray);
                let line = Line::from(vec![
                    Span::styled(format!("[{}]", true_label), if *value { on } else { off }),
                    Span::raw("  "),
                    Span::styled(format!("[{}]", false_label), if *value { off } else { on }),
                ]);
                frame.render_widget(Paragraph::new(line).block(block), area);
            }
        }
    }
}

/// Byte offset of the `chars`-th character
fn byte_index(value: &str, chars: usize) -> usize {
    value
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_handles_multibyte_chars() {
        let mut field = FormField::text_input("path");
        for c in "relatório.png".chars() {
            field.handle_key(KeyCode::Char(c));
        }
        field.handle_key(KeyCode::Home);
        field.handle_key(KeyCode::Delete);
        assert_eq!(field.value(), "elatório.png");

        field.handle_key(KeyCode::End);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "elatório.pn");
    }

    #[test]
    fn test_enum_select_bounds() {
        let mut field = FormField::enum_select(&["a", "b"], 0);
        field.handle_key(KeyCode::Up);
        assert_eq!(field.value(), "a");
        field.handle_key(KeyCode::Down);
        field.handle_key(KeyCode::Down);
        assert_eq!(field.value(), "b");
        assert_eq!(field.selected_index(), Some(1));
    }

    #[test]
    fn test_set_options_resets_selection() {
        let mut field = FormField::enum_select(&["a", "b", "c"], 2);
        field.set_options(&["x", "y"]);
        assert_eq!(field.value(), "x");
        field.select_value("y");
        assert_eq!(field.value(), "y");
    }

    #[test]
    fn test_toggle() {
        let mut field = FormField::toggle(true, "Yes", "No");
        assert!(field.is_on());
        field.handle_key(KeyCode::Char(' '));
        assert!(!field.is_on());
        field.handle_key(KeyCode::Left);
        assert!(field.is_on());
    }

    #[test]
    fn test_clear() {
        let mut field = FormField::text_input("");
        field.handle_key(KeyCode::Char('x'));
        field.clear();
        assert!(field.value().is_empty());
    }
}
