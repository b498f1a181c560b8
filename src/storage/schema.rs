//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Book Harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Cleaned book rows
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    authors TEXT,
    publisher TEXT,
    published_date TEXT,
    isbn TEXT,
    page_count INTEGER,
    categories TEXT,
    average_rating FLOAT,
    ratings_count INTEGER,
    language TEXT,
    title_word_count INTEGER,
    year INTEGER
);

CREATE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);
CREATE INDEX IF NOT EXISTS idx_books_categories ON books(categories);
CREATE INDEX IF NOT EXISTS idx_books_year ON books(year);

-- Track dataset loads
CREATE TABLE IF NOT EXISTS load_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    loaded_at TEXT NOT NULL,
    source_path TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    row_count INTEGER NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
