// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Upload validation scenarios (spec §8.3.3): a declared/sniffed format
//! mismatch is rejected before any book row is created.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{build_app, multipart_body};

#[tokio::test]
async fn rejects_a_declared_format_that_does_not_match_the_filename() {
    let app = build_app().await;

    let (content_type, body) = multipart_body("Hello", "txt", "x.pdf", b"not actually used");
    let response = app
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
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "validation_error");

    let list_response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/books")
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(list_response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["books"].as_array().unwrap().is_empty(), "a rejected upload must not create a book row");
}

#[tokio::test]
async fn rejects_requests_without_a_bearer_token() {
    let app = build_app().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/v1/books").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
