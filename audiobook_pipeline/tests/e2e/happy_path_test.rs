// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Happy-path scenario (spec §8.3.1): submit a TXT upload, drive it
//! through all four stages, and confirm `Completed`/manifest/streamed
//! bytes all agree.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{build_app, drain_pipeline, multipart_body};

#[tokio::test]
async fn submits_drains_and_streams_a_completed_book() {
    let app = build_app().await;

    let (content_type, body) = multipart_body("Hello", "txt", "book.txt", b"Hello, world. This is a short test book.");
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
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let book_id = created["book_id"].as_str().unwrap().to_string();
    assert_eq!(created["state"], "pending");

    drain_pipeline(&app).await;

    let status_response = app
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
    assert_eq!(status_response.status(), StatusCode::OK);
    let bytes = to_bytes(status_response.into_body(), usize::MAX).await.unwrap();
    let status: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status["state"], "completed");
    assert_eq!(status["percent_complete"], 100);
    let total_chunks = status["total_chunks"].as_u64().unwrap();
    assert!(total_chunks >= 1, "expected at least one chunk, got {total_chunks}");

    let manifest_response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/chunks"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(manifest_response.status(), StatusCode::OK);
    let bytes = to_bytes(manifest_response.into_body(), usize::MAX).await.unwrap();
    let manifest: Value = serde_json::from_slice(&bytes).unwrap();
    let chunks = manifest["chunks"].as_array().unwrap();
    assert_eq!(chunks.len() as u64, total_chunks);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk["seq"], i as u64);
        assert!(chunk["duration_s"].as_f64().unwrap() <= 3.14 + 0.01);
    }

    let chunk_response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/chunks/0"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(chunk_response.status(), StatusCode::OK);
    assert_eq!(chunk_response.headers().get(header::CONTENT_TYPE).unwrap(), "audio/ogg");
    assert_eq!(chunk_response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
}
