//! Domain models that mirror the `coffee` table and the text the edit form
//! collects. Validation lives here so both the TUI and tests go through the
//! same rules before anything reaches SQLite.

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// One persisted row of the `coffee` table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoffeeRecord {
    /// Primary key assigned by SQLite on insert.
    pub id: i64,
    /// Coffee sort, e.g. "Arabica".
    pub name: String,
    /// Roasting degree.
    pub roasting: String,
    /// Ground or bean.
    pub kind: String,
    /// Taste description.
    pub description: String,
    pub cost: f64,
    pub volume: f64,
}

impl CoffeeRecord {
    /// Raw text for each form field, in form order. Numbers are written the
    /// same way the main table shows them.
    pub fn to_input(&self) -> CoffeeInput {
        CoffeeInput {
            name: self.name.clone(),
            roasting: self.roasting.clone(),
            kind: self.kind.clone(),
            description: self.description.clone(),
            cost: format_real(self.cost),
            volume: format_real(self.volume),
        }
    }
}

impl fmt::Display for CoffeeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.roasting)
    }
}

/// Unvalidated text exactly as typed into the edit form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoffeeInput {
    pub name: String,
    pub roasting: String,
    pub kind: String,
    pub description: String,
    pub cost: String,
    pub volume: String,
}

/// The six validated non-id fields. This is the only shape the store accepts
/// for inserts and updates, so unparsed text can never be written.
#[derive(Debug, Clone, PartialEq)]
pub struct CoffeeDraft {
    pub name: String,
    pub roasting: String,
    pub kind: String,
    pub description: String,
    pub cost: f64,
    pub volume: f64,
}

/// Reasons a form submission is rejected before touching the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields ({field} is empty).")]
    MissingField { field: &'static str },
    #[error("Invalid {field} format: \"{value}\" is not a number.")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Cost cannot be negative.")]
    NegativeCost,
}

impl CoffeeDraft {
    /// Check the raw input in two passes: first that nothing is blank, then
    /// that cost and volume are real numbers. Text fields are trimmed.
    pub fn parse(input: &CoffeeInput) -> Result<Self, FormError> {
        let fields = [
            ("Name", &input.name),
            ("Roasting", &input.roasting),
            ("Type", &input.kind),
            ("Description", &input.description),
            ("Cost", &input.cost),
            ("Volume", &input.volume),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(FormError::MissingField { field });
            }
        }

        let cost = parse_real("cost", &input.cost)?;
        let volume = parse_real("volume", &input.volume)?;
        if cost < 0.0 {
            return Err(FormError::NegativeCost);
        }

        Ok(Self {
            name: input.name.trim().to_string(),
            roasting: input.roasting.trim().to_string(),
            kind: input.kind.trim().to_string(),
            description: input.description.trim().to_string(),
            cost,
            volume,
        })
    }
}

/// Whole numbers keep a trailing `.0` (`4.0`, not `4`) so prices and volumes
/// always read as decimals.
pub fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// `f64::from_str` accepts "inf" and "NaN"; neither is a usable price or
/// volume, so only finite values pass.
fn parse_real(field: &'static str, raw: &str) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormError::InvalidNumber {
            field,
            value: trimmed.to_string(),
        }),
    }
}

/// Snapshot of the `coffee` table as the main view renders it. Cells are
/// already stringified; the grid is thrown away and rebuilt on every refresh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordGrid {
    /// Column names reported by SQLite, in table order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Read the record id out of the first cell of `row`. `None` means the
    /// row does not exist.
    pub fn id_at(&self, row: usize) -> Option<Result<i64, ParseIntError>> {
        let cell = self.rows.get(row)?.first()?;
        Some(cell.parse::<i64>())
    }

    /// Position of the row whose first cell is `id`.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        let needle = id.to_string();
        self.rows
            .iter()
            .position(|row| row.first().is_some_and(|cell| *cell == needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arabica() -> CoffeeInput {
        CoffeeInput {
            name: "Arabica".into(),
            roasting: "Light".into(),
            kind: "Bean".into(),
            description: "Fruity".into(),
            cost: "9.50".into(),
            volume: "0.25".into(),
        }
    }

    #[test]
    fn test_parse_valid() {
        let draft = CoffeeDraft::parse(&arabica()).unwrap();

        assert_eq!(draft.name, "Arabica");
        assert_eq!(draft.kind, "Bean");
        assert_eq!(draft.cost, 9.5);
        assert_eq!(draft.volume, 0.25);
    }

    #[test]
    fn test_parse_trims_text() {
        let mut input = arabica();
        input.name = "  Robusta ".into();
        input.cost = " 3 ".into();

        let draft = CoffeeDraft::parse(&input).unwrap();
        assert_eq!(draft.name, "Robusta");
        assert_eq!(draft.cost, 3.0);
    }

    #[test]
    fn test_parse_keeps_inner_whitespace() {
        let mut input = arabica();
        input.roasting = "Dark  Roast".into();
        input.description = "Cocoa,  then\tcherry".into();

        let draft = CoffeeDraft::parse(&input).unwrap();
        assert_eq!(draft.roasting, "Dark  Roast");
        assert_eq!(draft.description, "Cocoa,  then\tcherry");
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(4.0), "4.0");
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(9.5), "9.5");
        assert_eq!(format_real(0.25), "0.25");
        assert_eq!(format_real(1200.0), "1200.0");
    }

    #[test]
    fn test_parse_rejects_each_empty_field() {
        let blanks: [fn(&mut CoffeeInput); 6] = [
            |i| i.name.clear(),
            |i| i.roasting.clear(),
            |i| i.kind = "   ".into(),
            |i| i.description.clear(),
            |i| i.cost.clear(),
            |i| i.volume.clear(),
        ];

        for blank in blanks {
            let mut input = arabica();
            blank(&mut input);
            assert!(matches!(
                CoffeeDraft::parse(&input),
                Err(FormError::MissingField { .. })
            ));
        }
    }

    #[test]
    fn test_parse_empty_check_runs_before_number_check() {
        let mut input = arabica();
        input.cost = "abc".into();
        input.name.clear();

        assert_eq!(
            CoffeeDraft::parse(&input),
            Err(FormError::MissingField { field: "Name" })
        );
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        for bad in ["abc", "9,50", "1.2.3", "inf", "NaN"] {
            let mut input = arabica();
            input.volume = bad.into();
            assert!(matches!(
                CoffeeDraft::parse(&input),
                Err(FormError::InvalidNumber { field: "volume", .. })
            ));
        }
    }

    #[test]
    fn test_parse_rejects_negative_cost() {
        let mut input = arabica();
        input.cost = "-1".into();

        assert_eq!(CoffeeDraft::parse(&input), Err(FormError::NegativeCost));
    }

    #[test]
    fn test_record_to_input() {
        let record = CoffeeRecord {
            id: 4,
            name: "Arabica".into(),
            roasting: "Light".into(),
            kind: "Bean".into(),
            description: "Fruity".into(),
            cost: 9.5,
            volume: 0.25,
        };

        let input = record.to_input();
        assert_eq!(input.cost, "9.5");
        assert_eq!(input.volume, "0.25");
        assert_eq!(CoffeeDraft::parse(&input).unwrap().cost, 9.5);
    }

    #[test]
    fn test_grid_id_lookup() {
        let grid = RecordGrid {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec!["3".into(), "Arabica".into()],
                vec!["7".into(), "Robusta".into()],
            ],
        };

        assert_eq!(grid.id_at(1), Some(Ok(7)));
        assert!(grid.id_at(2).is_none());
        assert_eq!(grid.position_of(3), Some(0));
        assert_eq!(grid.position_of(8), None);
    }
}
