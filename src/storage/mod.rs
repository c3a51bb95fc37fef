//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - items(id, name, qty, price, note)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};

use crate::Result;
use crate::record::{PartialRecord, Record};

/// Keyed storage of inventory records with autoincrement identity.
///
/// Every mutating call commits before it returns. Unknown ids passed to
/// `update_many` or `delete_by_ids` match nothing and are not an error.
pub trait RecordStore {
    /// Ensure the table exists and seed the demo rows if it is empty.
    /// Returns `true` when seeding happened.
    fn init(&mut self) -> Result<bool>;

    /// All records ordered by ascending id
    fn read_all(&self) -> Result<Vec<Record>>;

    /// Create one record per partial, returning the assigned ids in order
    fn insert_many(&mut self, partials: &[PartialRecord]) -> Result<Vec<i64>>;

    /// Overwrite the present fields of each matching record, returning the number of rows changed
    fn update_many(&mut self, updates: &[(i64, PartialRecord)]) -> Result<usize>;

    /// Remove the records with the given ids, returning the number of rows removed
    fn delete_by_ids(&mut self, ids: &[i64]) -> Result<usize>;
}
