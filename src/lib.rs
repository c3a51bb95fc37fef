//! # Stockgrid - spreadsheet-style inventory editor
//!
//! An editable grid over a single SQLite table of inventory lines.
//!
//! Stockgrid provides:
//! - SQLite-backed record storage with autoincrement identity
//! - Change reconciliation from grid edits to ordered store calls
//! - A running summary (item count, total quantity, stock value)
//! - An HTTP grid server and a command-line editor

pub mod record;
pub mod storage;
pub mod reconcile;
pub mod summary;
pub mod config;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use record::{GridEdit, GridRow, PartialRecord, Record};
pub use reconcile::{ChangeBatch, PositionMap, ReconcilePlan, ReconcileReport, Reconciler};
pub use storage::{RecordStore, SqliteStore};
pub use summary::Summary;

/// Result type alias for Stockgrid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Stockgrid operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A batch referenced a row position outside the snapshot it was built against
    #[error("Row position {0} is not in the current snapshot")]
    UnknownPosition(usize),
}

impl Error {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
