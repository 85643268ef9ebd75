//! Books repository (catalog store)

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create a new book; availability defaults to true
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, year, language)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.year)
        .bind(&book.language)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books by case-insensitive substring across title, author,
    /// language and year. An empty or missing term lists the whole catalog,
    /// in insertion order.
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Book>> {
        let term = term.unwrap_or("").trim();

        let books = if term.is_empty() {
            sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
                .fetch_all(&self.pool)
                .await?
        } else {
            let like = format!("%{}%", term);
            sqlx::query_as::<_, Book>(
                r#"
                SELECT * FROM books
                WHERE title LIKE ? OR author LIKE ? OR language LIKE ? OR year LIKE ?
                ORDER BY id
                "#,
            )
            .bind(&like)
            .bind(&like)
            .bind(&like)
            .bind(&like)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(books)
    }

    /// Update book fields (admin edit path; may also flip availability)
    pub async fn update(&self, id: i64, update: &UpdateBook) -> AppResult<Book> {
        let current = self.get_by_id(id).await?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = ?, author = ?, year = ?, language = ?, available = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(update.title.as_ref().unwrap_or(&current.title))
        .bind(update.author.as_ref().unwrap_or(&current.author))
        .bind(update.year.as_ref().unwrap_or(&current.year))
        .bind(update.language.as_ref().unwrap_or(&current.language))
        .bind(update.available.unwrap_or(current.available))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Atomically flip an available book to borrowed. Returns false when the
    /// book is missing or already out; the zero-rows result is the
    /// already-borrowed signal for the circulation engine.
    pub async fn try_mark_borrowed(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE books SET available = 0 WHERE id = ? AND available = 1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Mirror of [`Self::try_mark_borrowed`]: flip a borrowed book back to available.
    pub async fn try_mark_returned(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE books SET available = 1 WHERE id = ? AND available = 0")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Check whether a book exists, usable inside a transaction
    pub async fn exists(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(found > 0)
    }
}
