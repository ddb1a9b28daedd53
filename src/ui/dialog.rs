use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info, warn};

use crate::db::CoffeeStore;
use crate::models::CoffeeRecord;

use super::forms::{CoffeeField, CoffeeForm};
use super::helpers::{centered_rect, surface_error};

/// Whether the dialog writes a new row or rewrites an existing one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DialogMode {
    Create,
    Edit(i64),
}

/// What the caller should do after feeding the dialog a key.
#[derive(Debug, PartialEq)]
pub(crate) enum DialogOutcome {
    /// Still open; keep routing keys here.
    Pending,
    /// Saved. Carries the id of the record that was written.
    Accepted(i64),
    /// Closed without saving.
    Rejected,
}

/// Modal form for adding or editing one coffee record.
pub(crate) struct RecordEditDialog {
    mode: DialogMode,
    form: CoffeeForm,
}

impl RecordEditDialog {
    /// Blank form that inserts on save.
    pub(crate) fn create() -> Self {
        Self {
            mode: DialogMode::Create,
            form: CoffeeForm::default(),
        }
    }

    /// Load record `id` into the form. Returns `Ok(None)` when the record no
    /// longer exists, so the caller can report it instead of showing a blank
    /// form that would insert on save.
    pub(crate) fn edit<S: CoffeeStore + ?Sized>(store: &S, id: i64) -> Result<Option<Self>> {
        let Some(record) = store.fetch_coffee(id)? else {
            warn!(id, "coffee record vanished before the edit dialog opened");
            return Ok(None);
        };

        debug!(%record, "loaded coffee record for editing");
        Ok(Some(Self::from_record(&record)))
    }

    fn from_record(record: &CoffeeRecord) -> Self {
        Self {
            mode: DialogMode::Edit(record.id),
            form: CoffeeForm::from_record(record),
        }
    }

    pub(crate) fn mode(&self) -> DialogMode {
        self.mode
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.form.error.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn form(&self) -> &CoffeeForm {
        &self.form
    }

    pub(crate) fn title(&self) -> String {
        match self.mode {
            DialogMode::Create => "Add new coffee record".to_string(),
            DialogMode::Edit(id) => format!("Edit coffee record #{id}"),
        }
    }

    pub(crate) fn handle_key<S: CoffeeStore + ?Sized>(
        &mut self,
        code: KeyCode,
        store: &mut S,
    ) -> DialogOutcome {
        match code {
            KeyCode::Esc => return DialogOutcome::Rejected,
            KeyCode::Enter => return self.confirm(store),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(ch) => {
                if self.form.push_char(ch) {
                    self.form.error = None;
                }
            }
            _ => {}
        }
        DialogOutcome::Pending
    }

    /// Validate the form and write it. Every failure leaves the dialog open
    /// with the reason shown under the inputs.
    pub(crate) fn confirm<S: CoffeeStore + ?Sized>(&mut self, store: &mut S) -> DialogOutcome {
        let draft = match self.form.parse_inputs() {
            Ok(draft) => draft,
            Err(err) => {
                debug!(%err, "coffee form rejected");
                self.form.error = Some(err.to_string());
                return DialogOutcome::Pending;
            }
        };

        let saved = match self.mode {
            DialogMode::Create => store
                .create_coffee(&draft)
                .map(|record| record.id)
                .map_err(|err| ("adding", err)),
            DialogMode::Edit(id) => store
                .update_coffee(id, &draft)
                .map(|()| id)
                .map_err(|err| ("editing", err)),
        };

        match saved {
            Ok(id) => {
                info!(id, mode = ?self.mode, "saved coffee record");
                self.form.error = None;
                DialogOutcome::Accepted(id)
            }
            Err((action, err)) => {
                warn!(error = %format!("{err:#}"), "failed to save coffee record");
                let cause = surface_error(&err);
                self.form.error = Some(format!("Error while {action}: {cause}"));
                DialogOutcome::Pending
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(self.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let [fields_area, _, message_area] = Layout::vertical([
            Constraint::Length(CoffeeField::ALL.len() as u16),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        // One line per field; long values are clipped so the cursor row
        // always matches the field index.
        let lines: Vec<Line> = CoffeeField::ALL
            .iter()
            .map(|field| self.form.build_line(*field))
            .collect();
        frame.render_widget(Paragraph::new(lines), fields_area);

        let message = match &self.form.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(
                "Enter to save • Tab to switch field • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(
            Paragraph::new(message).wrap(Wrap { trim: true }),
            message_area,
        );

        let row = CoffeeField::ALL
            .iter()
            .position(|field| *field == self.form.active)
            .unwrap_or(0) as u16;
        let cursor_x = fields_area.x + self.form.cursor_offset() as u16;
        let cursor_x = cursor_x.min(fields_area.right().saturating_sub(1));
        let cursor_y = (fields_area.y + row).min(fields_area.bottom().saturating_sub(1));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
