// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Axum handlers for the HTTP surface (spec §6.1). Each handler decodes
//! the request, validates it into a domain call, and maps the result
//! through `CoreError`'s `IntoResponse` impl — no business logic lives
//! here beyond wire (de)serialization and range-header parsing.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;

use audiobook_pipeline_domain::{BookFormat, BookId, Paging};

use crate::application::ByteRange;
use crate::error::{CoreError, CoreResult};
use crate::presentation::auth::AuthUser;
use crate::presentation::dto::{
    BatchSignedUrlEntry, BatchSignedUrlsRequest, BatchSignedUrlsResponse, BookCreatedResponse, BookSummary, BooksResponse,
    ChunkManifestResponse, DeleteResponse, SignedUrlRequest, SignedUrlResponse, StatusResponse,
};
use crate::presentation::state::{AppState, HealthReport};

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health_report().await)
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// `POST /api/v1/books` (spec §6.1, §6.2): multipart upload with `title`,
/// `format`, `file` fields.
pub async fn submit_book(State(state): State<AppState>, AuthUser(owner): AuthUser, mut multipart: Multipart) -> CoreResult<Response> {
    let mut title: Option<String> = None;
    let mut format: Option<BookFormat> = None;
    let mut filename: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| CoreError::Multipart(e.to_string()))? {
        match field.name() {
            Some("title") => {
                title = Some(field.text().await.map_err(|e| CoreError::Multipart(e.to_string()))?);
            }
            Some("format") => {
                let raw = field.text().await.map_err(|e| CoreError::Multipart(e.to_string()))?;
                format = Some(BookFormat::parse(&raw).ok_or_else(|| {
                    audiobook_pipeline_domain::DomainError::Validation(format!("unknown format '{raw}'"))
                })?);
            }
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(|e| CoreError::Multipart(e.to_string()))?.to_vec());
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| audiobook_pipeline_domain::DomainError::Validation("missing 'title' field".into()))?;
    let format = format.ok_or_else(|| audiobook_pipeline_domain::DomainError::Validation("missing 'format' field".into()))?;
    let filename = filename.ok_or_else(|| audiobook_pipeline_domain::DomainError::Validation("missing 'file' field".into()))?;
    let bytes = bytes.ok_or_else(|| audiobook_pipeline_domain::DomainError::Validation("missing 'file' field".into()))?;

    let book_id = state.ingest_gateway.submit_book(owner, title, format, &filename, bytes).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            book_id: book_id.to_string(),
            state: "pending",
        }),
    )
        .into_response())
}

#[derive(Debug, serde::Deserialize, Default)]
pub struct ListBooksQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_books(State(state): State<AppState>, AuthUser(owner): AuthUser, Query(query): Query<ListBooksQuery>) -> CoreResult<Json<BooksResponse>> {
    let paging = Paging {
        limit: query.limit.unwrap_or(50),
        offset: query.offset.unwrap_or(0),
    };
    let books = state.streaming_gateway.list_books(&owner, paging).await?;
    Ok(Json(BooksResponse {
        books: books.iter().map(BookSummary::from).collect(),
    }))
}

fn parse_book_id(raw: &str) -> CoreResult<BookId> {
    BookId::from_string(raw).map_err(CoreError::from)
}

pub async fn get_status(State(state): State<AppState>, AuthUser(owner): AuthUser, Path(book_id): Path<String>) -> CoreResult<Json<StatusResponse>> {
    let book_id = parse_book_id(&book_id)?;
    let book = state.streaming_gateway.get_status(&owner, &book_id).await?;
    Ok(Json(StatusResponse::from(&book)))
}

pub async fn get_chunk_manifest(State(state): State<AppState>, AuthUser(owner): AuthUser, Path(book_id): Path<String>) -> CoreResult<Json<ChunkManifestResponse>> {
    let book_id = parse_book_id(&book_id)?;
    let chunks = state.streaming_gateway.get_chunk_manifest(&owner, &book_id).await?;
    let book_id_str = book_id.to_string();
    Ok(Json(ChunkManifestResponse::from_chunks(&chunks, |seq| {
        format!("/api/v1/books/{book_id_str}/chunks/{seq}")
    })))
}

/// Parses a single-range `Range: bytes=start-end` header (spec §6.1, §8.4).
/// Multi-range requests are not supported; callers fall back to a full read.
fn parse_range_header(headers: &HeaderMap) -> CoreResult<Option<ByteRange>> {
    let Some(raw) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    let spec = raw
        .strip_prefix("bytes=")
        .ok_or_else(|| CoreError::RangeNotSatisfiable(format!("unsupported range unit in '{raw}'")))?;
    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| CoreError::RangeNotSatisfiable(format!("malformed range '{raw}'")))?;
    let start: u64 = start_str
        .parse()
        .map_err(|_| CoreError::RangeNotSatisfiable(format!("malformed range start in '{raw}'")))?;
    let end: u64 = if end_str.is_empty() {
        u64::MAX
    } else {
        end_str.parse().map_err(|_| CoreError::RangeNotSatisfiable(format!("malformed range end in '{raw}'")))?
    };
    Ok(Some(ByteRange { start, end }))
}

#[derive(Debug, serde::Deserialize, Default)]
pub struct StreamChunkQuery {
    /// Signed-URL token, accepted as an alternative to a bearer session
    /// token (spec §4.7).
    pub token: Option<String>,
}

pub async fn stream_chunk(
    State(state): State<AppState>,
    Path((book_id, seq)): Path<(String, u32)>,
    Query(query): Query<StreamChunkQuery>,
    headers: HeaderMap,
) -> CoreResult<Response> {
    let book_id = parse_book_id(&book_id)?;
    let range = parse_range_header(&headers)?;

    let chunk_stream = if let Some(token) = query.token {
        state.streaming_gateway.stream_chunk_signed(&token, &book_id, seq, range).await?
    } else {
        let owner = resolve_bearer(&state, &headers).await?;
        state.streaming_gateway.stream_chunk(&owner, &book_id, seq, range).await?
    };

    let status = if chunk_stream.range.is_some() { StatusCode::PARTIAL_CONTENT } else { StatusCode::OK };
    let content_length = match chunk_stream.range {
        Some(r) => r.end - r.start + 1,
        None => chunk_stream.total_size,
    };

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "audio/ogg")
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, content_length);

    if let Some(r) = chunk_stream.range {
        let value = format!("bytes {}-{}/{}", r.start, r.end, chunk_stream.total_size);
        response = response.header(
            header::CONTENT_RANGE,
            HeaderValue::from_str(&value).expect("range header value is always valid ascii"),
        );
    }

    let body = Body::from_stream(chunk_stream.body.map(|chunk| chunk.map_err(CoreError::from)));
    Ok(response.body(body).expect("response with a streamed body is always constructible"))
}

/// Resolves a bearer token from the `Authorization` header manually, for
/// the one handler (`stream_chunk`) where auth is conditional on whether a
/// signed-URL token was also supplied.
async fn resolve_bearer(state: &AppState, headers: &HeaderMap) -> CoreResult<audiobook_pipeline_domain::UserId> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| audiobook_pipeline_domain::DomainError::Unauthenticated("missing Authorization header".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| audiobook_pipeline_domain::DomainError::Unauthenticated("Authorization header must be a Bearer token".into()))?;
    Ok(state.token_resolver.resolve(token).await?)
}

pub async fn issue_signed_url(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path((book_id, seq)): Path<(String, u32)>,
    body: Option<Json<SignedUrlRequest>>,
) -> CoreResult<Json<SignedUrlResponse>> {
    let book_id = parse_book_id(&book_id)?;
    let ttl = body.and_then(|Json(r)| r.ttl_s).map(Duration::from_secs);
    let (token, ttl) = state.streaming_gateway.issue_signed_chunk_url(&owner, &book_id, seq, ttl).await?;
    Ok(Json(SignedUrlResponse {
        signed_url: format!("/api/v1/books/{book_id}/chunks/{seq}?token={token}"),
        expires_in: ttl.as_secs(),
    }))
}

pub async fn issue_batch_signed_urls(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(book_id): Path<String>,
    Json(request): Json<BatchSignedUrlsRequest>,
) -> CoreResult<Json<BatchSignedUrlsResponse>> {
    let book_id = parse_book_id(&book_id)?;
    let ttl = request.ttl_s.map(Duration::from_secs);
    let urls = state
        .streaming_gateway
        .issue_batch_signed_urls(&owner, &book_id, &request.seqs, ttl)
        .await?;

    Ok(Json(BatchSignedUrlsResponse {
        urls: urls
            .into_iter()
            .map(|(seq, token, ttl)| BatchSignedUrlEntry {
                seq,
                signed_url: format!("/api/v1/books/{book_id}/chunks/{seq}?token={token}"),
                expires_in: ttl.as_secs(),
            })
            .collect(),
    }))
}

pub async fn delete_book(State(state): State<AppState>, AuthUser(owner): AuthUser, Path(book_id): Path<String>) -> CoreResult<Json<DeleteResponse>> {
    let book_id = parse_book_id(&book_id)?;
    state.ingest_gateway.delete_book(&owner, &book_id).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}
