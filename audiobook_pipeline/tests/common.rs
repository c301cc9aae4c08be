// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared end-to-end test helpers: an in-process router backed by a
//! temp-file SQLite store and a temp-dir blob store, plus a pipeline
//! "drain" that runs the four built-in stage handlers to completion
//! without a real queue-polling worker loop.

use std::sync::Arc;
use std::time::Duration;

use audiobook_pipeline::application::{IngestGateway, StreamingGateway};
use audiobook_pipeline::infrastructure::collaborators::{HeuristicSegmenter, OggPackager, RawPcmOggCodec, SilenceSynthesizer, TxtTextExtractor};
use audiobook_pipeline::infrastructure::metrics::Metrics;
use audiobook_pipeline::infrastructure::repositories::{initialize_database, FilesystemBlobStore, SqliteMetadataStore, SqliteQueueBroker};
use audiobook_pipeline::infrastructure::runtime::{ExtractHandler, PackageHandler, SegmentHandler, StageRunner, StageRunnerConfig, SynthesizeHandler};
use audiobook_pipeline::infrastructure::security::{HmacSigningService, StaticTokenResolver};
use audiobook_pipeline::presentation::build_router;
use audiobook_pipeline::presentation::state::AppState;
use audiobook_pipeline_domain::{BlobStore, BookState, MetadataStore, Packager, QueueBroker, Stage, StageHandler, UserId};
use axum::Router;
use tempfile::{NamedTempFile, TempDir};

pub const CHUNK_CODEC_EXT: &str = "ogg";
pub const SIGNING_SECRET: &[u8] = b"test-signing-secret-0123456789ab";

/// Holds every temp-resource guard alive for the test's lifetime alongside
/// the router and the pieces needed to drive the pipeline by hand.
pub struct TestApp {
    pub router: Router,
    pub owner: UserId,
    pub token: String,
    /// A second, distinct identity registered with the same token
    /// resolver, so ownership-isolation tests can exercise a real
    /// "someone else's book" request without rebuilding the router.
    pub other_owner: UserId,
    pub other_token: String,
    pub metadata_store: Arc<dyn MetadataStore>,
    pub queue_broker: Arc<dyn QueueBroker>,
    pub blob_store: Arc<dyn BlobStore>,
    _db_file: NamedTempFile,
    _blob_dir: TempDir,
}

pub async fn build_app() -> TestApp {
    let db_file = NamedTempFile::new().expect("temp db file");
    let db_url = format!("sqlite://{}", db_file.path().to_str().expect("utf8 temp path"));
    let pool = initialize_database(&db_url).await.expect("initialize database");

    let blob_dir = TempDir::new().expect("temp blob dir");
    let blob_store: Arc<dyn BlobStore> = Arc::new(FilesystemBlobStore::new(blob_dir.path()));
    let metadata_store: Arc<dyn MetadataStore> = Arc::new(SqliteMetadataStore::new(pool.clone()));
    let queue_broker: Arc<dyn QueueBroker> = Arc::new(SqliteQueueBroker::new(pool.clone()));

    let owner = UserId::new();
    let token = "test-bearer-token".to_string();
    let other_owner = UserId::new();
    let other_token = "test-bearer-token-other".to_string();
    let token_resolver = Arc::new(StaticTokenResolver::new(
        [(token.clone(), owner.clone()), (other_token.clone(), other_owner.clone())]
            .into_iter()
            .collect(),
    ));
    let signing_service = Arc::new(HmacSigningService::new(SIGNING_SECRET));

    let ingest_gateway = Arc::new(IngestGateway::new(
        blob_store.clone(),
        metadata_store.clone(),
        queue_broker.clone(),
        50 * 1024 * 1024,
    ));
    let streaming_gateway = Arc::new(StreamingGateway::new(
        metadata_store.clone(),
        blob_store.clone(),
        signing_service,
        Duration::from_secs(3600),
    ));

    let app_state = AppState {
        ingest_gateway,
        streaming_gateway,
        token_resolver,
        metadata_store: metadata_store.clone(),
        queue_broker: queue_broker.clone(),
        metrics: Arc::new(Metrics::new()),
        pool,
    };

    TestApp {
        router: build_router(app_state),
        owner,
        token,
        other_owner,
        other_token,
        metadata_store,
        queue_broker,
        blob_store,
        _db_file: db_file,
        _blob_dir: blob_dir,
    }
}

fn handler_for(stage: Stage, blob_store: Arc<dyn BlobStore>, metadata_store: Arc<dyn MetadataStore>) -> Arc<dyn StageHandler> {
    match stage {
        Stage::Extract => Arc::new(ExtractHandler::new(
            blob_store.clone(),
            metadata_store,
            Arc::new(TxtTextExtractor::new(blob_store)),
        )),
        Stage::Segment => Arc::new(SegmentHandler::new(blob_store, Arc::new(HeuristicSegmenter::new()))),
        Stage::Synthesize => Arc::new(SynthesizeHandler::new(blob_store, Arc::new(SilenceSynthesizer::new()))),
        Stage::Package => {
            let packager: Arc<dyn Packager> = Arc::new(OggPackager::new(blob_store.clone(), Arc::new(RawPcmOggCodec)));
            Arc::new(PackageHandler::new(blob_store, metadata_store, packager, CHUNK_CODEC_EXT))
        }
    }
}

/// Runs every stage's `StageRunner` in turn, ticking each until its queue
/// is empty, until the book reaches a terminal state or `max_rounds` is
/// exhausted. Single-threaded and deterministic: no real concurrent
/// workers race each other here, this only exercises the state-machine
/// and artifact plumbing a single worker per stage would produce.
pub async fn drain_pipeline(app: &TestApp) {
    let stages = [Stage::Extract, Stage::Segment, Stage::Synthesize, Stage::Package];
    for round in 0..8 {
        for stage in stages {
            let handler = handler_for(stage, app.blob_store.clone(), app.metadata_store.clone());
            let runner = StageRunner::new(
                stage,
                app.queue_broker.clone(),
                app.metadata_store.clone(),
                handler,
                StageRunnerConfig {
                    consumer_id: format!("test-{}-{round}", stage.queue_name()),
                    lease_duration: Duration::from_secs(30),
                    max_attempts: 3,
                    idle_poll_interval: Duration::from_millis(1),
                },
            );
            // Drain whatever this stage's queue holds right now.
            while runner.tick().await.expect("stage tick") {}
        }
    }
}

pub fn book_state_of(app: &TestApp, book_id: &audiobook_pipeline_domain::BookId) -> impl std::future::Future<Output = BookState> + '_ {
    let book_id = book_id.clone();
    async move { app.metadata_store.get_book(&book_id).await.expect("book exists").state }
}

/// Builds a `multipart/form-data` body for `POST /api/v1/books` (spec
/// §6.2) by hand, since axum's `Multipart` extractor has no matching
/// client-side builder in this crate's dependency stack.
pub fn multipart_body(title: &str, format: &str, filename: &str, file_bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "audiobook-pipeline-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"title\"\r\n\r\n");
    body.extend_from_slice(title.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"format\"\r\n\r\n");
    body.extend_from_slice(format.as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}
