//! Borrow/return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::ledger::{HistoryEntry, LedgerEntry},
};

use super::AuthenticatedUser;

/// Borrow/return response with the ledger entry that was appended
#[derive(Serialize, ToSchema)]
pub struct CirculationResponse {
    /// "borrowed" or "returned"
    pub status: String,
    /// The ledger entry recording the event
    pub entry: LedgerEntry,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = CirculationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
) -> AppResult<(StatusCode, Json<CirculationResponse>)> {
    let entry = state.services.circulation.borrow(&claims.sub, book_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CirculationResponse {
            status: "borrowed".to_string(),
            entry,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = CirculationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is not currently borrowed")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i64>,
) -> AppResult<Json<CirculationResponse>> {
    let entry = state
        .services
        .circulation
        .return_book(&claims.sub, book_id)
        .await?;

    Ok(Json(CirculationResponse {
        status: "returned".to_string(),
        entry,
    }))
}

/// Borrow/return history for the current user, most recent first
#[utoipa::path(
    get,
    path = "/history",
    tag = "circulation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow history", body = Vec<HistoryEntry>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let entries = state.services.circulation.history_for(&claims.sub).await?;
    Ok(Json(entries))
}
