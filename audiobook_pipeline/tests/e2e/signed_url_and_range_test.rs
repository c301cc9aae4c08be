// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Signed-URL issuance and HTTP range boundaries (spec §4.7, §8.4).

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{build_app, drain_pipeline, multipart_body};

async fn submit_and_complete(app: &crate::common::TestApp) -> String {
    let (content_type, body) = multipart_body("Hello", "txt", "book.txt", b"A short sentence. Another one here.");
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

    drain_pipeline(app).await;
    book_id
}

#[tokio::test]
async fn a_signed_url_streams_a_chunk_with_no_bearer_token() {
    let app = build_app().await;
    let book_id = submit_and_complete(&app).await;

    let issue_response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/books/{book_id}/chunks/0/signed-url"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(issue_response.status(), StatusCode::OK);
    let bytes = to_bytes(issue_response.into_body(), usize::MAX).await.unwrap();
    let issued: Value = serde_json::from_slice(&bytes).unwrap();
    let signed_url = issued["signed_url"].as_str().unwrap().to_string();

    // No Authorization header at all: only the signed token authorizes this.
    let stream_response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(signed_url.clone()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(stream_response.status(), StatusCode::OK);
    assert_eq!(stream_response.headers().get(header::CONTENT_TYPE).unwrap(), "audio/ogg");
    assert_eq!(stream_response.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");

    // A token scoped to seq 0 does not authorize a different sequence number.
    let wrong_seq_url = signed_url.replace("/chunks/0", "/chunks/999999");
    let wrong_seq_response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(wrong_seq_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(wrong_seq_response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn range_requests_resolve_against_the_chunk_byte_size() {
    let app = build_app().await;
    let book_id = submit_and_complete(&app).await;

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
    let byte_size = manifest["chunks"][0]["byte_size"].as_u64().unwrap();
    assert!(byte_size > 0, "synthesized chunk must carry at least the codec header bytes");

    // bytes=0-0 is a single satisfiable byte.
    let first_byte = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/chunks/0"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .header(header::RANGE, "bytes=0-0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first_byte.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(first_byte.headers().get(header::CONTENT_LENGTH).unwrap(), "1");
    let expected_content_range = format!("bytes 0-0/{byte_size}");
    assert_eq!(first_byte.headers().get(header::CONTENT_RANGE).unwrap(), expected_content_range.as_str());

    // A range starting exactly at byte_size is out of bounds.
    let out_of_bounds = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/books/{book_id}/chunks/0"))
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .header(header::RANGE, format!("bytes={byte_size}-{byte_size}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(out_of_bounds.status(), StatusCode::RANGE_NOT_SATISFIABLE);

    // No Range header at all: the full chunk, 200 not 206.
    let full = app
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
    assert_eq!(full.status(), StatusCode::OK);
    assert_eq!(full.headers().get(header::CONTENT_LENGTH).unwrap(), byte_size.to_string().as_str());
}
