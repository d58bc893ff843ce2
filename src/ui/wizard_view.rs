//! Wizard screen: sidebar, header, progress gauge and the active step panel

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Wrap,
    },
    Frame,
};

use super::form_field::FormField;
use super::forms::{EvaluationForm, PlatformForm};
use super::snapshot::WizardSnapshot;
use crate::steps::{Readiness, StepId};
use crate::types::TARGET_PLATFORM;

/// Which text input currently receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    SourceImage,
    Dataset,
    TargetImage,
    ChecklistItem,
}

impl InputTarget {
    fn title(&self) -> &'static str {
        match self {
            InputTarget::SourceImage => "Dashboard image path",
            InputTarget::Dataset => "Dataset path (.csv / .xlsx)",
            InputTarget::TargetImage => "Power BI screenshot path",
            InputTarget::ChecklistItem => "New checklist item",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Working,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn color(&self) -> Color {
        match self.kind {
            StatusKind::Info => Color::Green,
            StatusKind::Working => Color::Cyan,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Error => Color::Red,
        }
    }
}

/// View-local state; never persisted
pub struct WizardView {
    pub platform: PlatformForm,
    pub evaluation: EvaluationForm,
    pub path_input: FormField,
    pub item_input: FormField,
    pub editing: Option<InputTarget>,
    pub checklist_state: ListState,
    pub scroll: u16,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
}

impl Default for WizardView {
    fn default() -> Self {
        Self {
            platform: PlatformForm::default(),
            evaluation: EvaluationForm::default(),
            path_input: FormField::text_input("Type a file path and press Enter"),
            item_input: FormField::text_input("Describe the missing element"),
            editing: None,
            checklist_state: ListState::default(),
            scroll: 0,
            status: None,
            show_help: false,
        }
    }
}

impl WizardView {
    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage::new(kind, text));
    }

    /// Reset per-step view state after the step changes
    pub fn on_step_changed(&mut self) {
        self.editing = None;
        self.scroll = 0;
        self.path_input.clear();
        self.item_input.clear();
        self.checklist_state.select(None);
    }

    pub fn begin_edit(&mut self, target: InputTarget) {
        self.editing = Some(target);
    }

    pub fn input_mut(&mut self, target: InputTarget) -> &mut FormField {
        match target {
            InputTarget::ChecklistItem => &mut self.item_input,
            _ => &mut self.path_input,
        }
    }

    pub fn select_checklist(&mut self, len: usize, down: bool) {
        if len == 0 {
            self.checklist_state.select(None);
            return;
        }
        let next = match (self.checklist_state.selected(), down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.checklist_state.select(Some(next));
    }

    pub fn render(&mut self, frame: &mut Frame, snapshot: &WizardSnapshot) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(40)])
            .split(frame.area());

        render_sidebar(frame, columns[0], snapshot);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Progress
                Constraint::Min(8),    // Step panel
                Constraint::Length(3), // Status
                Constraint::Length(1), // Key hints
            ])
            .split(columns[1]);

        render_header(frame, rows[0], snapshot);
        render_gauge(frame, rows[1], snapshot);
        self.render_step(frame, rows[2], snapshot);
        self.render_status(frame, rows[3], snapshot);
        self.render_hints(frame, rows[4], snapshot);

        if self.show_help {
            render_help(frame);
        }
    }

    fn render_step(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let step = snapshot.current;
        let block = Block::default()
            .title(format!(" {}. {} ", step.index() + 1, step.name()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match step {
            StepId::Platform => self.render_platform(frame, inner),
            StepId::Upload => self.render_upload(frame, inner, snapshot),
            StepId::Extraction => self.render_extraction(frame, inner, snapshot),
            StepId::Validation => self.render_validation(frame, inner, snapshot),
            StepId::Script => self.render_text_step(
                frame,
                inner,
                "Press x to generate the migration script and DAX measures (two model calls).",
                &snapshot.roteiro,
            ),
            StepId::Comparison => self.render_comparison(frame, inner, snapshot),
            StepId::Export => render_export(frame, inner, snapshot),
            StepId::Evaluation => self.render_evaluation(frame, inner, snapshot),
        }
    }

    fn render_platform(&mut self, frame: &mut Frame, area: Rect) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);
        let titles = ["Origin", "Origin version", "Target version", "Model"];
        for (index, title) in titles.iter().enumerate() {
            let focused = self.platform.focus == index;
            self.platform
                .field_mut(index)
                .render(frame, cells[index], title, focused);
        }
    }

    fn render_path_input(&mut self, frame: &mut Frame, area: Rect, target: InputTarget) {
        let focused = self.editing == Some(target);
        self.input_mut(target)
            .render(frame, area, target.title(), focused);
    }

    fn render_upload(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let rows = split_input_and_body(area);
        self.render_path_input(frame, rows[0], InputTarget::SourceImage);

        let mut lines = vec![Line::from(format!(
            "Upload a PNG or JPEG screenshot of the {} dashboard.",
            snapshot.platform.origin_or_default()
        ))];
        if snapshot.source_uploaded {
            lines.push(Line::from(Span::styled(
                "Image stored. Press n to continue.",
                Style::default().fg(Color::Green),
            )));
        } else if snapshot.has_source_image {
            lines.push(Line::from(Span::styled(
                "An image from an earlier session exists; upload it again to continue.",
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[1]);
    }

    fn render_extraction(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.render_text_step(
            frame,
            halves[0],
            "Press x to extract the visual elements from the uploaded image.",
            &snapshot.ocr_text,
        );

        let right = split_input_and_body(halves[1]);
        self.render_path_input(frame, right[0], InputTarget::ChecklistItem);

        let items: Vec<ListItem> = snapshot
            .checklist
            .iter()
            .map(|(_, item)| {
                let marker = if item.checked { "[x]" } else { "[ ]" };
                ListItem::new(format!("{marker} {}", item.label))
            })
            .collect();
        let title = if snapshot.checklist_dirty {
            " Checklist (unsaved) "
        } else {
            " Checklist "
        };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, right[1], &mut self.checklist_state);
    }

    fn render_validation(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(3),
            ])
            .split(area);
        self.render_path_input(frame, rows[0], InputTarget::Dataset);

        match &snapshot.dataset {
            Some(dataset) => {
                let header = Row::new(
                    dataset
                        .columns
                        .iter()
                        .map(|c| Cell::from(c.as_str()))
                        .collect::<Vec<_>>(),
                )
                .style(Style::default().add_modifier(Modifier::BOLD));
                let body: Vec<Row> = dataset
                    .rows
                    .iter()
                    .map(|row| Row::new(row.iter().map(|c| Cell::from(c.as_str())).collect::<Vec<_>>()))
                    .collect();
                let count = dataset.columns.len().max(1) as u32;
                let widths = vec![Constraint::Ratio(1, count); count as usize];
                let table = Table::new(body, widths).header(header).block(
                    Block::default().borders(Borders::ALL).title(format!(
                        " {} ({} rows) ",
                        dataset.source, dataset.row_count
                    )),
                );
                frame.render_widget(table, rows[1]);
            }
            None => frame.render_widget(
                Paragraph::new("No dataset loaded. Press Enter to type a file path.")
                    .block(Block::default().borders(Borders::ALL).title(" Preview ")),
                rows[1],
            ),
        }

        let analysis = snapshot.analysis.as_deref().unwrap_or_default();
        self.render_text_step(
            frame,
            rows[2],
            "Press x to check the dashboard components against the dataset columns.",
            analysis,
        );
    }

    fn render_comparison(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let rows = split_input_and_body(area);
        self.render_path_input(frame, rows[0], InputTarget::TargetImage);

        let intro = if snapshot.target_uploaded {
            format!("{TARGET_PLATFORM} screenshot stored. Press x to compare both dashboards.")
        } else {
            format!("Upload a screenshot of the dashboard rebuilt in {TARGET_PLATFORM}.")
        };
        let text = snapshot.comparison.as_deref().unwrap_or_default();
        self.render_text_step(frame, rows[1], &intro, text);
    }

    fn render_evaluation(&mut self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(7),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        let form = &mut self.evaluation;
        form.recommend
            .render(frame, rows[0], "Would you recommend the tool?", form.focus == 0);
        form.rating
            .render(frame, rows[1], "Overall rating (1 poor, 5 excellent)", form.focus == 1);
        form.comment.render(
            frame,
            rows[2],
            "Comments or suggestions",
            form.focus == EvaluationForm::COMMENT,
        );

        let footer = if snapshot.evaluation_submitted {
            Span::styled(
                "Thank you! Your evaluation was recorded.",
                Style::default().fg(Color::Green),
            )
        } else {
            Span::styled(
                "Press s to submit, r to start a new migration.",
                Style::default().fg(Color::Gray),
            )
        };
        frame.render_widget(Paragraph::new(Line::from(footer)), rows[3]);
    }

    fn render_text_step(&self, frame: &mut Frame, area: Rect, empty_hint: &str, text: &str) {
        let paragraph = if text.trim().is_empty() {
            Paragraph::new(Span::styled(empty_hint, Style::default().fg(Color::Gray)))
        } else {
            Paragraph::new(text).scroll((self.scroll, 0))
        };
        frame.render_widget(paragraph.wrap(Wrap { trim: false }), area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let line = if let Some(status) = &self.status {
            Line::from(Span::styled(
                status.text.as_str(),
                Style::default().fg(status.color()),
            ))
        } else if let Some(error) = &snapshot.load_error {
            Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
        } else {
            match &snapshot.readiness {
                Readiness::Blocked(msg) => {
                    Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)))
                }
                Readiness::Warning(msg) => {
                    Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)))
                }
                Readiness::Ready => Line::from(Span::styled(
                    "Ready",
                    Style::default().fg(Color::DarkGray),
                )),
            }
        };
        let paragraph = Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(paragraph, area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let mut spans = if self.editing.is_some() {
            vec![key("Enter"), Span::raw(" submit  "), key("Esc"), Span::raw(" cancel")]
        } else {
            vec![
                key("1-8"),
                Span::raw(" jump  "),
                key("?"),
                Span::raw(" help  "),
                key("R"),
                Span::raw(" reset  "),
                key("q"),
                Span::raw(" quit  "),
            ]
        };
        if self.editing.is_none() && snapshot.current.is_named() {
            let style = if snapshot.advance_blocker.is_some() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Yellow)
            };
            spans.push(Span::styled("n", style));
            spans.push(Span::styled(" next", style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn split_input_and_body(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area)
}

fn render_sidebar(frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
    let items: Vec<ListItem> = StepId::ALL
        .iter()
        .map(|step| {
            let marker = if !step.is_named() {
                "  "
            } else if snapshot.progress.is_complete(*step) {
                "✅"
            } else {
                "⬜"
            };
            let style = if *step == snapshot.current {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(
                format!("{marker} {}. {}", step.index() + 1, step.name()),
                style,
            ))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Steps ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );
    frame.render_widget(list, area);
}

fn render_header(frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
    let mut spans = vec![
        Span::styled(
            "DashMigrate",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {} → {TARGET_PLATFORM}",
            snapshot.platform.origin_or_default()
        )),
    ];
    if !snapshot.platform.model_display.is_empty() {
        spans.push(Span::styled(
            format!("  [{}]", snapshot.platform.model_display),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !snapshot.gateway_configured {
        spans.push(Span::styled(
            "  model API key missing",
            Style::default().fg(Color::Red),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_gauge(frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(snapshot.ratio.clamp(0.0, 1.0))
        .label(format!(
            "{}/{} steps complete",
            snapshot.progress.completed_count(),
            StepId::NAMED.len()
        ));
    frame.render_widget(gauge, area);
}

fn render_export(frame: &mut Frame, area: Rect, snapshot: &WizardSnapshot) {
    let mut lines = vec![
        Line::from("The executive report gathers every saved artifact:"),
        Line::from("  - status of every step"),
        Line::from("  - visual comparison of both dashboards"),
        Line::from("  - complete technical script"),
        Line::from("  - verification checklist and correction notes"),
        Line::from(""),
        Line::from("Press x to write the report, n to finish and evaluate."),
    ];
    if let Some(path) = &snapshot.report_path {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Report written to {}", path.display()),
            Style::default().fg(Color::Green),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let key = |k: &'static str| Span::styled(format!("{k:<10}"), Style::default().fg(Color::Yellow));
    let lines = vec![
        Line::from(vec![key("1-8"), Span::raw("jump to a step (no checks)")]),
        Line::from(vec![key("n"), Span::raw("complete the step and advance")]),
        Line::from(vec![key("x"), Span::raw("run the step's main action")]),
        Line::from(vec![key("Enter"), Span::raw("type a file path / confirm platform")]),
        Line::from(vec![key("a"), Span::raw("add a checklist item")]),
        Line::from(vec![key("Space"), Span::raw("toggle the selected checklist item")]),
        Line::from(vec![key("Tab"), Span::raw("next form field")]),
        Line::from(vec![key("PgUp/PgDn"), Span::raw("scroll long text")]),
        Line::from(vec![key("R"), Span::raw("reset all progress (press twice)")]),
        Line::from(vec![key("q"), Span::raw("quit")]),
    ];
    let help = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(help, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 60, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 30);
        assert!(inner.x >= outer.x && inner.y >= outer.y);
    }

    #[test]
    fn test_select_checklist_clamps() {
        let mut view = WizardView::default();
        view.select_checklist(2, true);
        assert_eq!(view.checklist_state.selected(), Some(0));
        view.select_checklist(2, true);
        view.select_checklist(2, true);
        assert_eq!(view.checklist_state.selected(), Some(1));
        view.select_checklist(2, false);
        assert_eq!(view.checklist_state.selected(), Some(0));
        view.select_checklist(0, true);
        assert_eq!(view.checklist_state.selected(), None);
    }

    #[test]
    fn test_step_change_clears_inputs() {
        let mut view = WizardView::default();
        view.begin_edit(InputTarget::Dataset);
        view.path_input.handle_key(crossterm::event::KeyCode::Char('a'));
        view.scroll = 4;
        view.on_step_changed();
        assert!(view.editing.is_none());
        assert!(view.path_input.value().is_empty());
        assert_eq!(view.scroll, 0);
    }
}
