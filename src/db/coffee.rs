use anyhow::{anyhow, Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{format_real, CoffeeDraft, CoffeeRecord, RecordGrid};

/// Read the whole table for display. Rows come back in id order so the grid
/// does not shuffle between refreshes; headers are whatever SQLite reports
/// for the selected columns.
pub fn fetch_grid(conn: &Connection) -> Result<RecordGrid> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, roasting, type, description, cost, volume
             FROM coffee
             ORDER BY id",
        )
        .context("failed to prepare coffee table query")?;

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get_ref(idx).map(display_value))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .context("failed to iterate coffee records")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect coffee records")?;

    Ok(RecordGrid { columns, rows })
}

/// Point lookup used when the edit dialog opens.
pub fn fetch_coffee(conn: &Connection, id: i64) -> Result<Option<CoffeeRecord>> {
    conn.query_row(
        "SELECT id, name, roasting, type, description, cost, volume
         FROM coffee
         WHERE id = ?1",
        params![id],
        |row| {
            Ok(CoffeeRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                roasting: row.get(2)?,
                kind: row.get(3)?,
                description: row.get(4)?,
                cost: row.get(5)?,
                volume: row.get(6)?,
            })
        },
    )
    .optional()
    .context("failed to load coffee record")
}

/// Insert a new record and echo it back with the id SQLite assigned.
pub fn create_coffee(conn: &Connection, draft: &CoffeeDraft) -> Result<CoffeeRecord> {
    conn.execute(
        "INSERT INTO coffee (name, roasting, type, description, cost, volume)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            draft.name,
            draft.roasting,
            draft.kind,
            draft.description,
            draft.cost,
            draft.volume
        ],
    )
    .context("failed to insert coffee record")?;

    let id = conn.last_insert_rowid();
    Ok(CoffeeRecord {
        id,
        name: draft.name.clone(),
        roasting: draft.roasting.clone(),
        kind: draft.kind.clone(),
        description: draft.description.clone(),
        cost: draft.cost,
        volume: draft.volume,
    })
}

/// Overwrite all six fields of an existing record. Touching zero rows is an
/// error so a record deleted behind our back is reported, not ignored.
pub fn update_coffee(conn: &Connection, id: i64, draft: &CoffeeDraft) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE coffee
             SET name = ?1, roasting = ?2, type = ?3, description = ?4, cost = ?5, volume = ?6
             WHERE id = ?7",
            params![
                draft.name,
                draft.roasting,
                draft.kind,
                draft.description,
                draft.cost,
                draft.volume,
                id
            ],
        )
        .context("failed to update coffee record")?;

    if updated == 0 {
        Err(anyhow!("Coffee record not found"))
    } else {
        Ok(())
    }
}

fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(int) => int.to_string(),
        ValueRef::Real(real) => format_real(real),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(blob) => format!("<{} bytes>", blob.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    fn draft(name: &str, cost: f64) -> CoffeeDraft {
        CoffeeDraft {
            name: name.into(),
            roasting: "Medium".into(),
            kind: "Ground".into(),
            description: "Nutty".into(),
            cost,
            volume: 0.5,
        }
    }

    #[test]
    fn test_fetch_grid_empty() {
        let grid = fetch_grid(&conn()).unwrap();

        assert!(grid.is_empty());
        assert_eq!(
            grid.columns,
            ["id", "name", "roasting", "type", "description", "cost", "volume"]
        );
    }

    #[test]
    fn test_fetch_grid_orders_by_id_and_stringifies() {
        let conn = conn();
        create_coffee(&conn, &draft("Robusta", 4.0)).unwrap();
        create_coffee(&conn, &draft("Arabica", 9.5)).unwrap();

        let grid = fetch_grid(&conn).unwrap();

        assert_eq!(grid.len(), 2);
        assert_eq!(
            grid.rows[0],
            ["1", "Robusta", "Medium", "Ground", "Nutty", "4.0", "0.5"]
        );
        assert_eq!(grid.rows[1][1], "Arabica");
        assert_eq!(grid.rows[1][5], "9.5");
    }

    #[test]
    fn test_inner_whitespace_round_trips() {
        let conn = conn();
        let mut spaced = draft("Arabica", 9.5);
        spaced.roasting = "Dark  Roast".into();
        let record = create_coffee(&conn, &spaced).unwrap();

        let loaded = fetch_coffee(&conn, record.id).unwrap().unwrap();
        assert_eq!(loaded.roasting, "Dark  Roast");
        assert_eq!(fetch_grid(&conn).unwrap().rows[0][2], "Dark  Roast");
    }

    #[test]
    fn test_create_stores_numbers_as_real() {
        let conn = conn();
        let record = create_coffee(&conn, &draft("Arabica", 9.5)).unwrap();

        let (cost_type, volume_type): (String, String) = conn
            .query_row(
                "SELECT typeof(cost), typeof(volume) FROM coffee WHERE id = ?1",
                [record.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(cost_type, "real");
        assert_eq!(volume_type, "real");
    }

    #[test]
    fn test_fetch_coffee() {
        let conn = conn();
        let created = create_coffee(&conn, &draft("Arabica", 9.5)).unwrap();

        let loaded = fetch_coffee(&conn, created.id).unwrap();
        assert_eq!(loaded, Some(created));
        assert_eq!(fetch_coffee(&conn, 99).unwrap(), None);
    }

    #[test]
    fn test_update_coffee() {
        let conn = conn();
        let first = create_coffee(&conn, &draft("Arabica", 9.5)).unwrap();
        let second = create_coffee(&conn, &draft("Robusta", 4.0)).unwrap();

        update_coffee(&conn, first.id, &draft("Liberica", 12.0)).unwrap();

        assert_eq!(fetch_coffee(&conn, first.id).unwrap().unwrap().name, "Liberica");
        assert_eq!(fetch_coffee(&conn, second.id).unwrap().unwrap().name, "Robusta");
        assert_eq!(fetch_grid(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_update_missing_coffee() {
        let conn = conn();

        let err = update_coffee(&conn, 42, &draft("Arabica", 1.0)).unwrap_err();
        assert_eq!(err.to_string(), "Coffee record not found");
    }
}
