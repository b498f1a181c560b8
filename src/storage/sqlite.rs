//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::records::CleanedRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    CategoryLength, CategoryTopRated, LoadRunRecord, PublisherSummary, RatedBook, YearComparison,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

/// Path value that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// SQLite storage backend
///
/// Owns its connection; dropping the storage closes the database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and initialises the schema
    ///
    /// `:memory:` opens a private in-memory database instead.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if path.as_os_str() == IN_MEMORY {
            return Self::new_in_memory();
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Inserts every record inside an open transaction
///
/// The caller commits; dropping the transaction on error rolls everything back.
fn insert_all(tx: &Transaction<'_>, records: &[CleanedRecord]) -> StorageResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO books (title, authors, publisher, published_date, isbn, page_count,
         categories, average_rating, ratings_count, language, title_word_count, year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;

    for (index, record) in records.iter().enumerate() {
        stmt.execute(params![
            record.title,
            record.authors,
            record.publisher,
            record.published_date_text(),
            record.isbn,
            record.page_count,
            record.categories,
            record.average_rating,
            record.ratings_count,
            record.language,
            record.title_word_count,
            record.year,
        ])
        .map_err(|source| StorageError::Insert {
            row: index + 1,
            isbn: record.isbn.clone(),
            source,
        })?;
    }

    Ok(())
}

impl Storage for SqliteStorage {
    // ===== Loading =====

    fn insert_books(&mut self, records: &[CleanedRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        insert_all(&tx, records)?;
        tx.commit()?;

        tracing::info!("Inserted {} books", records.len());
        Ok(records.len())
    }

    fn replace_books(&mut self, records: &[CleanedRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM books", [])?;
        insert_all(&tx, records)?;
        tx.commit()?;

        tracing::info!(
            "Replaced {} previously loaded books with {}",
            removed,
            records.len()
        );
        Ok(records.len())
    }

    fn record_load_run(
        &mut self,
        source_path: &str,
        config_hash: &str,
        row_count: usize,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO load_runs (loaded_at, source_path, config_hash, row_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![now, source_path, config_hash, row_count as i64],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_load_run(&self) -> StorageResult<Option<LoadRunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, loaded_at, source_path, config_hash, row_count
                 FROM load_runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(LoadRunRecord {
                        id: row.get(0)?,
                        loaded_at: row.get(1)?,
                        source_path: row.get(2)?,
                        config_hash: row.get(3)?,
                        row_count: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Reports =====

    fn higher_than_average_rating(&self, limit: u32) -> StorageResult<Vec<RatedBook>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, average_rating
             FROM books
             WHERE average_rating > (
                 SELECT AVG(average_rating) FROM books WHERE average_rating IS NOT NULL
             )
             ORDER BY average_rating DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(RatedBook {
                    title: row.get(0)?,
                    average_rating: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn longer_than_category_average(&self, limit: u32) -> StorageResult<Vec<CategoryLength>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, categories, page_count
             FROM books AS b1
             WHERE page_count > (
                 SELECT AVG(page_count) FROM books AS b2
                 WHERE b2.categories = b1.categories AND b2.page_count IS NOT NULL
             )
             ORDER BY page_count DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(CategoryLength {
                    title: row.get(0)?,
                    categories: row.get(1)?,
                    page_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn authors_with_longer_than_average_books(&self, limit: u32) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT authors
             FROM books
             WHERE page_count > (SELECT AVG(page_count) FROM books)
               AND authors IS NOT NULL
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(rows)
    }

    fn top_rated_per_category(&self, min_ratings: i64) -> StorageResult<Vec<CategoryTopRated>> {
        // SQLite takes bare columns from the row that holds the MAX
        let mut stmt = self.conn.prepare(
            "SELECT categories, title, MAX(average_rating) AS top_rated
             FROM books
             WHERE ratings_count > ?1
             GROUP BY categories
             ORDER BY categories",
        )?;

        let rows = stmt
            .query_map(params![min_ratings], |row| {
                Ok(CategoryTopRated {
                    categories: row.get(0)?,
                    title: row.get(1)?,
                    top_rated: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn publisher_summary(&self, min_books: i64) -> StorageResult<Vec<PublisherSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT publisher,
                    COUNT(*) AS num_books,
                    AVG(page_count) AS average_page_count,
                    MAX(average_rating) AS highest_rated
             FROM books
             GROUP BY publisher
             HAVING COUNT(*) >= ?1
             ORDER BY num_books DESC, publisher",
        )?;

        let rows = stmt
            .query_map(params![min_books], |row| {
                Ok(PublisherSummary {
                    publisher: row.get(0)?,
                    num_books: row.get(1)?,
                    average_page_count: row.get(2)?,
                    highest_rated: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn year_rating_comparison(&self, limit: u32) -> StorageResult<Vec<YearComparison>> {
        let mut stmt = self.conn.prepare(
            "SELECT title,
                    year,
                    average_rating,
                    AVG(average_rating) OVER (PARTITION BY year) AS year_avg_rating
             FROM books
             ORDER BY year DESC, average_rating DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(YearComparison {
                    title: row.get(0)?,
                    year: row.get(1)?,
                    average_rating: row.get(2)?,
                    year_avg_rating: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
