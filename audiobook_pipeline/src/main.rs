// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root (spec §9): parses the CLI, loads configuration, wires
//! every infrastructure adapter into the two application gateways, and
//! then either serves the HTTP gateway (optionally with embedded stage
//! workers) or runs a single standalone stage worker.

use std::sync::Arc;
use std::time::Duration;

use audiobook_pipeline::application::{IngestGateway, StreamingGateway};
use audiobook_pipeline::infrastructure::collaborators::{HeuristicSegmenter, OggPackager, RawPcmOggCodec, SilenceSynthesizer, TxtTextExtractor};
use audiobook_pipeline::infrastructure::metrics::Metrics;
use audiobook_pipeline::infrastructure::repositories::{initialize_database, FilesystemBlobStore, SqliteMetadataStore, SqliteQueueBroker};
use audiobook_pipeline::infrastructure::runtime::{ExtractHandler, PackageHandler, SegmentHandler, StageRunner, StageRunnerConfig, SynthesizeHandler};
use audiobook_pipeline::infrastructure::security::{HmacSigningService, StaticTokenResolver};
use audiobook_pipeline::infrastructure::telemetry::init_tracing;
use audiobook_pipeline::presentation;
use audiobook_pipeline::presentation::state::AppState;
use audiobook_pipeline_bootstrap::shutdown::ShutdownCoordinator;
use audiobook_pipeline_bootstrap::signals::create_signal_handler;
use audiobook_pipeline_bootstrap::{bootstrap_cli, result_to_exit_code, AppConfig, ValidatedCommand};
use audiobook_pipeline_domain::{BlobStore, MetadataStore, QueueBroker, Stage};
use tracing::{info, warn};

/// Chunk codec extension used by the built-in packager (spec §4.5's
/// reference `Packager` writes raw-PCM-in-OGG containers).
const CHUNK_CODEC_EXT: &str = "ogg";

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated_cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("CLI error: {e}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    let config = match load_config(&validated_cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return std::process::ExitCode::from(78); // EX_CONFIG
        }
    };

    init_tracing(config.log_level());
    info!(app_name = config.app_name(), "starting up");

    let result = match validated_cli.command {
        ValidatedCommand::Serve { bind, no_workers } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr().to_string());
            run_serve(&config, &bind_addr, !no_workers).await
        }
        ValidatedCommand::Worker { stage, max_idle_polls } => run_worker(&config, &stage, max_idle_polls).await,
    };

    result_to_exit_code(result.map_err(AppError::from))
}

/// `result_to_exit_code` needs a concrete `std::error::Error`; this just
/// gives `anyhow::Error` one so `ExitCode::from_error`'s message-sniffing
/// heuristic has something to match against.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

fn load_config(cli: &audiobook_pipeline_bootstrap::ValidatedCli) -> Result<AppConfig, audiobook_pipeline_bootstrap::ConfigError> {
    let mut builder = AppConfig::builder().from_sources(cli.config.as_deref())?;
    if let Some(ref url) = cli.database_url {
        builder = builder.database_url(url.clone());
    }
    if let Some(ref root) = cli.blob_root {
        builder = builder.blob_root(root.clone());
    }
    if cli.verbose {
        builder = builder.verbose(true);
    }
    builder.build()
}

struct Wiring {
    pool: sqlx::SqlitePool,
    blob_store: Arc<dyn BlobStore>,
    metadata_store: Arc<dyn MetadataStore>,
    queue_broker: Arc<dyn QueueBroker>,
}

async fn wire_infrastructure(config: &AppConfig) -> Result<Wiring, anyhow::Error> {
    let pool = initialize_database(config.database_url()).await?;
    let blob_store: Arc<dyn BlobStore> = Arc::new(FilesystemBlobStore::new(config.blob_root().clone()));
    let metadata_store: Arc<dyn MetadataStore> = Arc::new(SqliteMetadataStore::new(pool.clone()));
    let queue_broker: Arc<dyn QueueBroker> = Arc::new(SqliteQueueBroker::new(pool.clone()));
    Ok(Wiring { pool, blob_store, metadata_store, queue_broker })
}

fn stage_runner_for(
    stage: Stage,
    wiring: &Wiring,
    config: &AppConfig,
    consumer_id: &str,
) -> StageRunner {
    let handler: Arc<dyn audiobook_pipeline_domain::StageHandler> = match stage {
        Stage::Extract => Arc::new(ExtractHandler::new(
            wiring.blob_store.clone(),
            wiring.metadata_store.clone(),
            Arc::new(TxtTextExtractor::new(wiring.blob_store.clone())),
        )),
        Stage::Segment => Arc::new(SegmentHandler::new(wiring.blob_store.clone(), Arc::new(HeuristicSegmenter::new()))),
        Stage::Synthesize => Arc::new(SynthesizeHandler::new(wiring.blob_store.clone(), Arc::new(SilenceSynthesizer::new()))),
        Stage::Package => {
            let packager: Arc<dyn audiobook_pipeline_domain::Packager> =
                Arc::new(OggPackager::new(wiring.blob_store.clone(), Arc::new(RawPcmOggCodec)));
            Arc::new(PackageHandler::new(wiring.blob_store.clone(), wiring.metadata_store.clone(), packager, CHUNK_CODEC_EXT))
        }
    };

    let runner_config = StageRunnerConfig {
        consumer_id: consumer_id.to_string(),
        lease_duration: Duration::from_secs(config.lease_duration_secs()),
        max_attempts: config.worker_max_attempts(),
        idle_poll_interval: Duration::from_millis(500),
    };

    StageRunner::new(stage, wiring.queue_broker.clone(), wiring.metadata_store.clone(), handler, runner_config)
}

async fn run_serve(config: &AppConfig, bind_addr: &str, spawn_workers: bool) -> anyhow::Result<()> {
    let wiring = wire_infrastructure(config).await?;

    let signing_service = Arc::new(HmacSigningService::new(config.signing_secret().as_bytes()));
    let token_resolver = Arc::new(StaticTokenResolver::from_config_str(config.auth_tokens())?);
    let metrics = Arc::new(Metrics::new());

    let ingest_gateway = Arc::new(IngestGateway::new(
        wiring.blob_store.clone(),
        wiring.metadata_store.clone(),
        wiring.queue_broker.clone(),
        config.max_upload_bytes(),
    ));
    let streaming_gateway = Arc::new(StreamingGateway::new(
        wiring.metadata_store.clone(),
        wiring.blob_store.clone(),
        signing_service,
        Duration::from_secs(config.signed_url_ttl_secs()),
    ));

    match ingest_gateway.reconcile_pending_books().await {
        Ok(n) if n > 0 => info!(reconciled = n, "re-enqueued books stuck in pending at startup"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "startup reconciliation sweep failed"),
    }

    let app_state = AppState {
        ingest_gateway,
        streaming_gateway,
        token_resolver,
        metadata_store: wiring.metadata_store.clone(),
        queue_broker: wiring.queue_broker.clone(),
        metrics,
        pool: wiring.pool.clone(),
    };

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(config.shutdown_grace_period_secs()));

    let signals = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        signals.wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown())).await;
    });

    let mut worker_handles = Vec::new();
    if spawn_workers {
        for stage in [Stage::Extract, Stage::Segment, Stage::Synthesize, Stage::Package] {
            let runner = stage_runner_for(stage, &wiring, config, &format!("{}-embedded", stage.queue_name()));
            let token = shutdown.token();
            worker_handles.push(tokio::spawn(async move { runner.run_until_cancelled(token).await }));
        }
    }

    let router = presentation::build_router(app_state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(bind_addr, "listening");

    let shutdown_token = shutdown.token();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    // The listener stopping accepting connections doesn't mean a signal
    // fired (it could simply be a clean `with_graceful_shutdown` future
    // resolution); make sure workers are told to stop either way.
    shutdown.initiate_shutdown();
    for handle in worker_handles {
        let _ = handle.await;
    }
    shutdown.complete_shutdown();

    Ok(())
}

async fn run_worker(config: &AppConfig, stage_name: &str, max_idle_polls: usize) -> anyhow::Result<()> {
    let stage = Stage::parse(stage_name).ok_or_else(|| anyhow::anyhow!("unknown stage '{stage_name}'"))?;
    let wiring = wire_infrastructure(config).await?;
    let runner = stage_runner_for(stage, &wiring, config, &format!("{}-standalone", stage.queue_name()));

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(config.shutdown_grace_period_secs()));
    let signals = create_signal_handler();
    let shutdown_for_signal = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        signals.wait_for_signal(Box::new(move || shutdown_for_signal.initiate_shutdown())).await;
    });

    if max_idle_polls == 0 {
        runner.run_until_cancelled(shutdown.token()).await;
    } else {
        let mut idle_streak = 0usize;
        while idle_streak < max_idle_polls && !shutdown.token().is_cancelled() {
            match runner.tick().await {
                Ok(true) => idle_streak = 0,
                Ok(false) => {
                    idle_streak += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                Err(e) => {
                    warn!(stage = stage.queue_name(), error = %e, "worker tick failed");
                    idle_streak += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
            }
        }
    }

    signal_task.abort();
    Ok(())
}
