//! Borrow ledger repository (append-only store)
//!
//! The ledger is the audit trail behind the availability flag. `append` is
//! the only write; nothing here ever issues an UPDATE or DELETE against the
//! borrow table.

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::AppResult,
    models::ledger::{BorrowStatus, HistoryEntry, LedgerEntry},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: Pool<Sqlite>,
}

impl LedgerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Append a borrow/return event. The id is assigned by insertion order.
    ///
    /// Takes an explicit connection so the circulation engine can run the
    /// append inside the same transaction as the availability flip.
    pub async fn append(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
        book_id: i64,
        status: BorrowStatus,
    ) -> AppResult<LedgerEntry> {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO borrow (username, book_id, status)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(book_id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(entry)
    }

    /// Borrow/return history for a user, most recent first, joined with the
    /// book title.
    pub async fn history_for(&self, username: &str) -> AppResult<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT b.id, b.book_id, books.title, b.status, b.created_at
            FROM borrow b
            JOIN books ON b.book_id = books.id
            WHERE b.username = ?
            ORDER BY b.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// All ledger entries for a book, in insertion order
    pub async fn entries_for_book(&self, book_id: i64) -> AppResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM borrow WHERE book_id = ? ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
