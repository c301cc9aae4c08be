// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Wires `handlers` into the `/api/v1` router (spec §6.1).

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::handlers;
use crate::presentation::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/books", post(handlers::submit_book).get(handlers::list_books))
        .route("/books/:book_id", delete(handlers::delete_book))
        .route("/books/:book_id/status", get(handlers::get_status))
        .route("/books/:book_id/chunks", get(handlers::get_chunk_manifest))
        .route("/books/:book_id/chunks/:seq", get(handlers::stream_chunk))
        .route("/books/:book_id/chunks/:seq/signed-url", post(handlers::issue_signed_url))
        .route("/books/:book_id/chunks/batch-signed-urls", post(handlers::issue_batch_signed_urls));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
