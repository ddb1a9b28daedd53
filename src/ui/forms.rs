use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{CoffeeDraft, CoffeeInput, CoffeeRecord, FormError};

/// Labels are padded to this width so the inputs line up.
const LABEL_WIDTH: usize = 14;

/// Fields of the coffee form, in tab order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum CoffeeField {
    #[default]
    Name,
    Roasting,
    Kind,
    Description,
    Cost,
    Volume,
}

impl CoffeeField {
    pub(crate) const ALL: [CoffeeField; 6] = [
        CoffeeField::Name,
        CoffeeField::Roasting,
        CoffeeField::Kind,
        CoffeeField::Description,
        CoffeeField::Cost,
        CoffeeField::Volume,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            CoffeeField::Name => "Name",
            CoffeeField::Roasting => "Roasting",
            CoffeeField::Kind => "Type",
            CoffeeField::Description => "Description",
            CoffeeField::Cost => "Cost",
            CoffeeField::Volume => "Volume",
        }
    }

    fn index(self) -> usize {
        match self {
            CoffeeField::Name => 0,
            CoffeeField::Roasting => 1,
            CoffeeField::Kind => 2,
            CoffeeField::Description => 3,
            CoffeeField::Cost => 4,
            CoffeeField::Volume => 5,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Editable state behind the coffee dialog: the raw text of every field,
/// which one has focus, and the last error to show under the inputs.
#[derive(Debug, Default, Clone)]
pub(crate) struct CoffeeForm {
    pub(crate) input: CoffeeInput,
    pub(crate) active: CoffeeField,
    pub(crate) error: Option<String>,
}

impl CoffeeForm {
    /// Populate the form from an existing record when editing.
    pub(crate) fn from_record(record: &CoffeeRecord) -> Self {
        Self {
            input: record.to_input(),
            ..Self::default()
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    pub(crate) fn value(&self, field: CoffeeField) -> &str {
        match field {
            CoffeeField::Name => &self.input.name,
            CoffeeField::Roasting => &self.input.roasting,
            CoffeeField::Kind => &self.input.kind,
            CoffeeField::Description => &self.input.description,
            CoffeeField::Cost => &self.input.cost,
            CoffeeField::Volume => &self.input.volume,
        }
    }

    fn value_mut(&mut self, field: CoffeeField) -> &mut String {
        match field {
            CoffeeField::Name => &mut self.input.name,
            CoffeeField::Roasting => &mut self.input.roasting,
            CoffeeField::Kind => &mut self.input.kind,
            CoffeeField::Description => &mut self.input.description,
            CoffeeField::Cost => &mut self.input.cost,
            CoffeeField::Volume => &mut self.input.volume,
        }
    }

    /// Append a character to the active field. Control characters are
    /// ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<CoffeeDraft, FormError> {
        CoffeeDraft::parse(&self.input)
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: CoffeeField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!(
                "{:<width$}",
                format!("{}:", field.label()),
                width = LABEL_WIDTH
            )),
            Span::styled(display, style),
        ])
    }

    /// Column where the cursor sits for the active field, relative to the
    /// start of its line.
    pub(crate) fn cursor_offset(&self) -> usize {
        LABEL_WIDTH + self.value(self.active).chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_cycle_wraps() {
        let mut form = CoffeeForm::default();
        assert_eq!(form.active, CoffeeField::Name);

        form.previous_field();
        assert_eq!(form.active, CoffeeField::Volume);

        form.next_field();
        form.next_field();
        assert_eq!(form.active, CoffeeField::Roasting);
    }

    #[test]
    fn test_typing_targets_active_field() {
        let mut form = CoffeeForm::default();
        for ch in "Kona".chars() {
            form.push_char(ch);
        }
        form.next_field();
        form.push_char('x');
        form.backspace();
        form.push_char('D');

        assert_eq!(form.value(CoffeeField::Name), "Kona");
        assert_eq!(form.value(CoffeeField::Roasting), "D");
        assert!(!form.push_char('\n'));
    }
}
