//! SQLite storage implementation

use std::path::Path;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter};
use crate::Result;
use crate::record::{DEFAULT_NAME, PartialRecord, Record};
use super::{RecordStore, schema};

/// Upper bound on ids bound into one `DELETE ... IN (...)` statement
const DELETE_CHUNK: usize = 500;

/// SQLite-backed storage for inventory records
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist) and ensure the schema.
    ///
    /// Does not seed; call [`RecordStore::init`] for that.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Count all records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get a single record by id
    pub fn get(&self, id: i64) -> Result<Option<Record>> {
        use rusqlite::OptionalExtension;

        let sql = format!("SELECT {} FROM items WHERE id = ?1", schema::ITEM_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_record)
            .optional()
            .map_err(Into::into)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let items = self.count()?;
        // SUM() raises on i64 overflow, so the total is folded here and saturates
        let mut stmt = self.conn.prepare("SELECT qty FROM items")?;
        let total_qty = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .try_fold(0i64, |total, qty| qty.map(|qty| total.saturating_add(qty)))?;
        // sqlite_sequence keeps the highest id ever handed out, even after deletes
        let last_id: i64 = self.conn.query_row(
            "SELECT COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'items'), 0)",
            [],
            |row| row.get(0),
        )?;

        Ok(DbStats {
            items,
            total_qty,
            last_id,
        })
    }
}

impl RecordStore for SqliteStore {
    fn init(&mut self) -> Result<bool> {
        self.initialize_schema()?;
        if self.count()? > 0 {
            return Ok(false);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO items (name, qty, price, note) VALUES (?1, ?2, ?3, ?4)")?;
            for (name, qty, price, note) in schema::SEED_ITEMS {
                stmt.execute(params![name, qty, price, note])?;
            }
        }
        tx.commit()?;

        tracing::info!("Seeded {} demo items", schema::SEED_ITEMS.len());
        Ok(true)
    }

    fn read_all(&self) -> Result<Vec<Record>> {
        let sql = format!("SELECT {} FROM items ORDER BY id", schema::ITEM_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn insert_many(&mut self, partials: &[PartialRecord]) -> Result<Vec<i64>> {
        if partials.is_empty() {
            return Ok(Vec::new());
        }

        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(partials.len());
        {
            let mut stmt = tx.prepare("INSERT INTO items (name, qty, price, note) VALUES (?1, ?2, ?3, ?4)")?;
            for partial in partials {
                let name = partial
                    .name
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(DEFAULT_NAME);
                let note = partial.note.clone().flatten();
                let id = stmt.insert(params![
                    name,
                    partial.qty.unwrap_or(0),
                    partial.price.unwrap_or(0.0),
                    note,
                ])?;
                ids.push(id);
            }
        }
        tx.commit()?;

        tracing::debug!("Inserted {} items: {:?}", ids.len(), ids);
        Ok(ids)
    }

    fn update_many(&mut self, updates: &[(i64, PartialRecord)]) -> Result<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for (id, partial) in updates {
            let (sets, mut values) = update_assignments(partial);
            if sets.is_empty() {
                continue;
            }
            values.push(SqlValue::Integer(*id));
            let sql = format!("UPDATE items SET {} WHERE id = ?", sets.join(", "));
            changed += tx.execute(&sql, params_from_iter(values))?;
        }
        tx.commit()?;

        tracing::debug!("Updated {} of {} requested items", changed, updates.len());
        Ok(changed)
    }

    fn delete_by_ids(&mut self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut removed = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!("DELETE FROM items WHERE id IN ({})", placeholders);
            removed += tx.execute(&sql, params_from_iter(chunk.iter()))?;
        }
        tx.commit()?;

        tracing::debug!("Deleted {} of {} requested items", removed, ids.len());
        Ok(removed)
    }
}

/// Build the `SET` clauses and bound values for the fields present in `partial`
fn update_assignments(partial: &PartialRecord) -> (Vec<&'static str>, Vec<SqlValue>) {
    let mut sets = Vec::new();
    let mut values = Vec::new();

    if let Some(name) = &partial.name {
        sets.push("name = ?");
        values.push(SqlValue::Text(name.clone()));
    }
    if let Some(qty) = partial.qty {
        sets.push("qty = ?");
        values.push(SqlValue::Integer(qty));
    }
    if let Some(price) = partial.price {
        sets.push("price = ?");
        values.push(SqlValue::Real(price));
    }
    if let Some(note) = &partial.note {
        sets.push("note = ?");
        values.push(match note {
            Some(text) => SqlValue::Text(text.clone()),
            None => SqlValue::Null,
        });
    }

    (sets, values)
}

/// Helper to convert a row to a Record
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        qty: row.get(2)?,
        price: row.get(3)?,
        note: row.get(4)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub items: usize,
    pub total_qty: i64,
    /// Highest id ever assigned (0 if none)
    pub last_id: i64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Total quantity: {}", self.total_qty)?;
        writeln!(f, "  Last assigned id: {}", self.last_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.init().unwrap();
        store
    }

    #[test]
    fn test_init_seeds_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.init().unwrap());
        assert!(!store.init().unwrap());

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "사과");
        assert_eq!(records[2].note, None);
    }

    #[test]
    fn test_init_leaves_populated_store_alone() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_many(&[PartialRecord::new().with_name("볼트")]).unwrap();

        assert!(!store.init().unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_read_all_orders_by_id() {
        let store = seeded();
        let ids: Vec<i64> = store.read_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_defaults() {
        let mut store = seeded();
        let ids = store.insert_many(&[PartialRecord::new()]).unwrap();
        assert_eq!(ids, vec![4]);

        let record = store.get(4).unwrap().unwrap();
        assert_eq!(record.name, DEFAULT_NAME);
        assert_eq!(record.qty, 0);
        assert_eq!(record.price, 0.0);
        assert_eq!(record.note, None);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = seeded();
        store.delete_by_ids(&[3]).unwrap();

        let ids = store.insert_many(&[PartialRecord::new().with_name("배")]).unwrap();
        assert_eq!(ids, vec![4]);
        assert_eq!(store.stats().unwrap().last_id, 4);
    }

    #[test]
    fn test_stats_survive_quantity_overflow() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let huge = PartialRecord::new().with_qty(5_000_000_000_000_000_000);
        store.insert_many(&[huge.clone(), huge]).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.items, 2);
        assert_eq!(stats.total_qty, i64::MAX);
    }

    #[test]
    fn test_update_only_present_fields() {
        let mut store = seeded();
        let changed = store
            .update_many(&[
                (1, PartialRecord::new().with_qty(12)),
                (2, PartialRecord::new().with_note(None)),
                (3, PartialRecord::new()),
                (99, PartialRecord::new().with_qty(1)),
            ])
            .unwrap();
        assert_eq!(changed, 2);

        let apple = store.get(1).unwrap().unwrap();
        assert_eq!(apple.qty, 12);
        assert_eq!(apple.price, 1.2);
        assert_eq!(apple.note.as_deref(), Some("신선"));

        let banana = store.get(2).unwrap().unwrap();
        assert_eq!(banana.note, None);
        assert_eq!(banana.qty, 6);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = seeded();
        assert_eq!(store.delete_by_ids(&[2, 42]).unwrap(), 1);
        assert_eq!(store.delete_by_ids(&[2]).unwrap(), 0);

        let ids: Vec<i64> = store.read_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_inputs_are_noops() {
        let mut store = seeded();
        let before = store.read_all().unwrap();

        assert!(store.insert_many(&[]).unwrap().is_empty());
        assert_eq!(store.update_many(&[]).unwrap(), 0);
        assert_eq!(store.delete_by_ids(&[]).unwrap(), 0);

        assert_eq!(store.read_all().unwrap(), before);
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.init().unwrap();
            store.update_many(&[(1, PartialRecord::new().with_qty(12))]).unwrap();
        }

        let mut store = SqliteStore::open(&path).unwrap();
        assert!(!store.init().unwrap());
        assert_eq!(store.get(1).unwrap().unwrap().qty, 12);
    }
}
