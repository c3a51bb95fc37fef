//! Database schema definitions

/// SQL to create the items table
pub const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    qty INTEGER NOT NULL DEFAULT 0,
    price REAL NOT NULL DEFAULT 0.0,
    note TEXT
)
"#;

/// Columns in the order every query selects them
pub const ITEM_COLUMNS: &str = "id, name, qty, price, note";

/// Demo rows written into a freshly created, empty table
pub const SEED_ITEMS: &[(&str, i64, f64, Option<&str>)] = &[
    ("사과", 10, 1.2, Some("신선")),
    ("바나나", 6, 0.8, Some("묶음")),
    ("배", 4, 2.0, None),
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![CREATE_ITEMS_TABLE]
}
