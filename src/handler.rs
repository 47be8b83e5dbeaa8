use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::api::{QueryParams, StatusResponse};
use crate::db::Database;
use crate::model::{BookFilter, BookInput};
use crate::{bad_request, not_found, server_error};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

const MAX_LIMIT: u32 = 500;

impl QueryParams {
    pub fn into_filter(self) -> BookFilter {
        BookFilter {
            q: self.q,
            limit: self.limit.map(|limit| limit.min(MAX_LIMIT)),
            offset: self.offset,
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(StatusResponse::new("ok"))
}

fn book_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, Response> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            tracing::info!("invalid book id: {}", e.body_text());
            Err(bad_request("Invalid book id"))
        }
    }
}

fn book_input(body: &[u8]) -> Result<BookInput, Response> {
    let input: BookInput = serde_json::from_slice(body).map_err(|e| {
        tracing::info!("invalid book payload: {}", e);
        bad_request("Invalid JSON provided")
    })?;

    if !input.is_complete() {
        return Err(bad_request("All fields are required"));
    }

    Ok(input)
}

pub async fn get_books(State(state): State<AppState>, Query(qp): Query<QueryParams>) -> Response {
    let filter = qp.into_filter();

    match state.db.list_books(&filter).await {
        Ok(books) => {
            info!(count = books.len(), "got books");
            (StatusCode::OK, Json(books)).into_response()
        }
        Err(e) => {
            tracing::error!("failed to get books. db_error: {}", e);
            server_error("Database error")
        }
    }
}

pub async fn create_book(State(state): State<AppState>, body: Bytes) -> Response {
    let input = match book_input(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match state.db.create_book(input).await {
        Ok(book) => {
            info!(book_id = book.id, "created book");
            (StatusCode::CREATED, Json(book)).into_response()
        }
        Err(e) => {
            tracing::error!("failed to insert book. db_error: {}", e);
            server_error("Could not insert book")
        }
    }
}

pub async fn get_book(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> Response {
    let id = match book_id(path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.db.get_book(id).await {
        Ok(Some(book)) => (StatusCode::OK, Json(book)).into_response(),
        Ok(None) => not_found("Book not found"),
        Err(e) => {
            tracing::error!(book_id = id, "failed to get book. db_error: {}", e);
            server_error("Database error")
        }
    }
}

pub async fn update_book(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Response {
    let id = match book_id(path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let input = match book_input(&body) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match state.db.update_book(id, input).await {
        Ok(Some(book)) => {
            info!(book_id = id, "updated book");
            (StatusCode::OK, Json(book)).into_response()
        }
        Ok(None) => not_found("Book not found"),
        Err(e) => {
            tracing::error!(book_id = id, "failed to update book. db_error: {}", e);
            server_error("Could not update book")
        }
    }
}

pub async fn delete_book(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> Response {
    let id = match book_id(path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.db.delete_book(id).await {
        Ok(true) => {
            info!(book_id = id, "deleted book");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => not_found("Book not found"),
        Err(e) => {
            tracing::error!(book_id = id, "failed to delete book. db_error: {}", e);
            server_error("Could not delete book")
        }
    }
}
