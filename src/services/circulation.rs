//! Circulation service: the borrow/return state machine
//!
//! Each book is a two-state machine, available or borrowed. A transition
//! flips the availability flag and appends one ledger entry, atomically:
//! both writes happen inside a single transaction, and the flip itself is a
//! conditional UPDATE whose affected-row count decides whether the
//! transition is legal. Two concurrent borrowers on the same book therefore
//! cannot both succeed; the loser sees zero rows affected and gets the
//! already-borrowed error without having written anything.

use crate::{
    error::{AppError, AppResult},
    models::ledger::{BorrowStatus, HistoryEntry, LedgerEntry},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for `username`.
    ///
    /// Succeeds only when the book exists and is available. On success exactly
    /// one catalog mutation and one ledger append are committed; on failure
    /// nothing is written.
    pub async fn borrow(&self, username: &str, book_id: i64) -> AppResult<LedgerEntry> {
        let mut tx = self.repository.pool.begin().await?;

        let flipped = self.repository.books.try_mark_borrowed(&mut *tx, book_id).await?;
        if !flipped {
            // Zero rows affected: either the book does not exist or someone
            // holds it already. Distinguish for the caller.
            return if self.repository.books.exists(&mut *tx, book_id).await? {
                Err(AppError::AlreadyBorrowed(book_id))
            } else {
                Err(AppError::NotFound(format!("Book with id {} not found", book_id)))
            };
        }

        let entry = self
            .repository
            .ledger
            .append(&mut *tx, username, book_id, BorrowStatus::Borrowed)
            .await?;

        tx.commit().await?;

        tracing::info!(username, book_id, "book borrowed");
        Ok(entry)
    }

    /// Return a borrowed book.
    ///
    /// Any authenticated user may return any borrowed book; the returner is
    /// not required to be the original borrower. That permissiveness is a
    /// deliberate policy, not an oversight.
    pub async fn return_book(&self, username: &str, book_id: i64) -> AppResult<LedgerEntry> {
        let mut tx = self.repository.pool.begin().await?;

        let flipped = self.repository.books.try_mark_returned(&mut *tx, book_id).await?;
        if !flipped {
            return if self.repository.books.exists(&mut *tx, book_id).await? {
                Err(AppError::NotBorrowed(book_id))
            } else {
                Err(AppError::NotFound(format!("Book with id {} not found", book_id)))
            };
        }

        let entry = self
            .repository
            .ledger
            .append(&mut *tx, username, book_id, BorrowStatus::Returned)
            .await?;

        tx.commit().await?;

        tracing::info!(username, book_id, "book returned");
        Ok(entry)
    }

    /// Borrow/return history for a user, most recent first
    pub async fn history_for(&self, username: &str) -> AppResult<Vec<HistoryEntry>> {
        self.repository.ledger.history_for(username).await
    }
}
