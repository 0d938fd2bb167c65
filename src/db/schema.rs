//! SQL DDL for initializing the journal storage.

/// SQLite schema with:
/// - `tabs`: one row per named tab
/// - `key_values`: rows owned by a tab; `tab_id` declares a cascading foreign
///   key, but handlers delete children explicitly before the parent
/// - no uniqueness on `(tab_id, key)`; a replace writes whatever map it is given
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS tabs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS key_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tab_id INTEGER NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    FOREIGN KEY(tab_id) REFERENCES tabs(id) ON DELETE CASCADE
);
"#;
