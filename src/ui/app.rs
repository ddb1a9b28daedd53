use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{debug, error};

use crate::db::CoffeeStore;
use crate::models::RecordGrid;

use super::dialog::{DialogMode, DialogOutcome, RecordEditDialog};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for the status line and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the id column; every other column shares the rest evenly.
const ID_COLUMN_WIDTH: u16 = 6;

/// Fine-grained modes of the main view. Only one modal can be up at a time.
enum Mode {
    Normal,
    Editing(RecordEditDialog),
    Alert(Alert),
}

/// Blocking message box; any of Enter/Esc/Space dismisses it.
struct Alert {
    title: &'static str,
    message: String,
    kind: StatusKind,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// The main window: the results table, the found/not-found indicator, and
/// whichever dialog is currently open on top of it.
pub struct App<S: CoffeeStore> {
    store: S,
    grid: RecordGrid,
    table_state: TableState,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: CoffeeStore> App<S> {
    /// Take ownership of the store and load the initial grid.
    pub fn new(store: S) -> Result<Self> {
        let mut app = Self {
            store,
            grid: RecordGrid::default(),
            table_state: TableState::default(),
            mode: Mode::Normal,
            status: None,
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn grid(&self) -> &RecordGrid {
        &self.grid
    }

    pub fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    /// Text of the found/not-found indicator.
    pub fn result_status(&self) -> String {
        if self.grid.is_empty() {
            "Nothing found".to_string()
        } else {
            format!("Results found ({})", self.grid.len())
        }
    }

    /// Re-read every record and replace the grid wholesale. The selection is
    /// kept by position, clamped to the new row count.
    pub fn refresh(&mut self) -> Result<()> {
        self.grid = self
            .store
            .fetch_grid()
            .context("failed to load coffee records")?;
        debug!(rows = self.grid.len(), "refreshed coffee grid");

        if self.grid.is_empty() {
            self.table_state.select(None);
        } else if let Some(selected) = self.table_state.selected() {
            self.table_state
                .select(Some(selected.min(self.grid.len() - 1)));
        }
        Ok(())
    }

    /// Open the dialog in create mode.
    pub fn add_record(&mut self) {
        self.clear_status();
        self.mode = Mode::Editing(RecordEditDialog::create());
    }

    /// Open the dialog for the selected row. Without a selection this only
    /// raises a warning; the store is not consulted.
    pub fn edit_record(&mut self) -> Result<()> {
        let Some(row) = self.table_state.selected() else {
            self.show_alert(
                "Warning",
                "Please select a row to edit.",
                StatusKind::Warning,
            );
            return Ok(());
        };

        let id = match self.grid.id_at(row) {
            Some(id) => id.context("selected row has a malformed id")?,
            None => {
                self.show_alert(
                    "Warning",
                    "Please select a row to edit.",
                    StatusKind::Warning,
                );
                return Ok(());
            }
        };

        match RecordEditDialog::edit(&self.store, id)? {
            Some(dialog) => {
                self.clear_status();
                self.mode = Mode::Editing(dialog);
            }
            None => {
                self.refresh()?;
                self.show_alert(
                    "Error",
                    format!("Coffee record #{id} no longer exists."),
                    StatusKind::Error,
                );
            }
        }
        Ok(())
    }

    /// Route a key press to the active mode. Returns `true` when the user asked
    /// to quit. A failed store call is logged and shown as an error alert; the
    /// session keeps running.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let next = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Editing(dialog) => self.handle_dialog_key(code, dialog),
            Mode::Alert(alert) => Ok(match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Normal,
                _ => Mode::Alert(alert),
            }),
        };

        self.mode = match next {
            Ok(mode) => mode,
            Err(err) => {
                error!(error = %format!("{err:#}"), "coffee catalog action failed");
                Mode::Alert(Alert {
                    title: "Error",
                    message: surface_error(&err),
                    kind: StatusKind::Error,
                })
            }
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.select_edge(false),
            KeyCode::End => self.select_edge(true),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => self.add_record(),
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => self.edit_record()?,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.refresh()?;
                self.set_status("Records reloaded.", StatusKind::Info);
            }
            _ => {}
        }

        // add/edit install their own mode; hand it back so it survives.
        Ok(mem::replace(&mut self.mode, Mode::Normal))
    }

    fn handle_dialog_key(&mut self, code: KeyCode, mut dialog: RecordEditDialog) -> Result<Mode> {
        match dialog.handle_key(code, &mut self.store) {
            DialogOutcome::Pending => Ok(Mode::Editing(dialog)),
            DialogOutcome::Accepted(id) => {
                self.refresh()?;
                if let Some(row) = self.grid.position_of(id) {
                    self.table_state.select(Some(row));
                }
                let text = match dialog.mode() {
                    DialogMode::Create => format!("Added coffee record #{id}."),
                    DialogMode::Edit(_) => format!("Updated coffee record #{id}."),
                };
                debug!(id, "coffee catalog changed");
                self.set_status(text, StatusKind::Info);
                Ok(Mode::Normal)
            }
            DialogOutcome::Rejected => {
                let text = match dialog.mode() {
                    DialogMode::Create => "Add cancelled.",
                    DialogMode::Edit(_) => "Edit cancelled.",
                };
                self.set_status(text, StatusKind::Info);
                Ok(Mode::Normal)
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        if self.grid.is_empty() {
            return;
        }
        let last = self.grid.len() - 1;
        let next = match self.table_state.selected() {
            Some(current) => current.saturating_add_signed(offset).min(last),
            None if offset < 0 => last,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_edge(&mut self, end: bool) {
        if self.grid.is_empty() {
            return;
        }
        let row = if end { self.grid.len() - 1 } else { 0 };
        self.table_state.select(Some(row));
    }

    fn show_alert<T: Into<String>>(&mut self, title: &'static str, message: T, kind: StatusKind) {
        self.mode = Mode::Alert(Alert {
            title,
            message: message.into(),
            kind,
        });
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_table(frame, content_area);
        self.draw_footer(frame, footer_area);

        match &self.mode {
            Mode::Normal => {}
            Mode::Editing(dialog) => dialog.draw(frame, area),
            Mode::Alert(alert) => self.draw_alert(frame, area, alert),
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Coffee catalog ")
            .borders(Borders::ALL);

        if self.grid.is_empty() {
            let empty = Paragraph::new("No coffee records yet. Press A to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(self.grid.columns.iter().cloned()).style(header_style);
        let rows = self
            .grid
            .rows
            .iter()
            .map(|cells| Row::new(cells.iter().cloned()));

        let widths = self.grid.columns.iter().enumerate().map(|(idx, _)| {
            if idx == 0 {
                Constraint::Length(ID_COLUMN_WIDTH)
            } else {
                Constraint::Fill(1)
            }
        });

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let indicator_style = if self.grid.is_empty() {
            StatusKind::Error.style()
        } else {
            StatusKind::Info.style()
        };
        let mut status_spans = vec![Span::styled(self.result_status(), indicator_style)];
        if let Some(status) = &self.status {
            status_spans.push(Span::raw("   "));
            status_spans.push(Span::styled(status.text.clone(), status.kind.style()));
        }

        let paragraph = Paragraph::new(vec![Line::from(status_spans), self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Editing(_) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Alert(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Dismiss"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[A]", key_style),
                Span::raw(" Add   "),
                Span::styled("[E]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[R]", key_style),
                Span::raw(" Refresh   "),
                Span::styled("[Q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_alert(&self, frame: &mut Frame, area: Rect, alert: &Alert) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(alert.title)
            .borders(Borders::ALL)
            .border_style(alert.kind.style());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(alert.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to continue.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    #[cfg(test)]
    fn alert(&self) -> Option<(&str, StatusKind)> {
        match &self.mode {
            Mode::Alert(alert) => Some((alert.message.as_str(), alert.kind)),
            _ => None,
        }
    }

    #[cfg(test)]
    fn dialog(&self) -> Option<&RecordEditDialog> {
        match &self.mode {
            Mode::Editing(dialog) => Some(dialog),
            _ => None,
        }
    }
}
