// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ownership isolation (spec §8.3.4, §8.1 invariant 3): a book submitted by
//! one user is invisible to another, surfaced identically to a genuinely
//! unknown id.

use audiobook_pipeline_domain::BookId;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{build_app, multipart_body};

#[tokio::test]
async fn a_different_owners_token_cannot_see_the_book() {
    let app = build_app().await;

    let (content_type, body) = multipart_body("Hello", "txt", "book.txt", b"owned by user A");
    let create_response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let bytes = to_bytes(create_response.into_body(), usize::MAX).await.unwrap();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let book_id = created["book_id"].as_str().unwrap().to_string();

    // The second registered identity authenticates fine but never owned
    // this book, so the status lookup must 404, not 403 or 200 (spec
    // §4.8: ownership mismatches never leak existence).
    let intruder_status = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/status"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.other_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(intruder_status.status(), StatusCode::NOT_FOUND);

    let intruder_delete = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/books/{book_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.other_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(intruder_delete.status(), StatusCode::NOT_FOUND);

    // The real owner can still see it: the intruder requests didn't
    // mutate or delete anything.
    let owner_status = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/status"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(owner_status.status(), StatusCode::OK);
}

#[tokio::test]
async fn an_unrecognized_bearer_token_is_unauthenticated_not_not_found() {
    let app = build_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{}/status", BookId::new()))
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn an_unknown_book_id_is_not_found() {
    let app = build_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{}/status", BookId::new()))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
