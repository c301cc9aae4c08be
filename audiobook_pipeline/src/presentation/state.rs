// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared state handed to every axum handler via `State<AppState>`.

use std::sync::Arc;

use audiobook_pipeline_domain::{MetadataStore, QueueBroker, Stage, TokenResolver};
use sqlx::SqlitePool;

use crate::application::{IngestGateway, StreamingGateway};
use crate::infrastructure::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub ingest_gateway: Arc<IngestGateway>,
    pub streaming_gateway: Arc<StreamingGateway>,
    pub token_resolver: Arc<dyn TokenResolver>,
    pub metadata_store: Arc<dyn MetadataStore>,
    pub queue_broker: Arc<dyn QueueBroker>,
    pub metrics: Arc<Metrics>,
    pub pool: SqlitePool,
}

/// Component-level status for `GET /health` (spec's ambient operability
/// surface — no endpoint table entry, since it predates authentication).
#[derive(Debug, serde::Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub queue_depth: std::collections::BTreeMap<&'static str, u64>,
}

impl AppState {
    pub async fn health_report(&self) -> HealthReport {
        let database = match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => "ok",
            Err(_) => "unreachable",
        };

        let mut queue_depth = std::collections::BTreeMap::new();
        for stage in [Stage::Extract, Stage::Segment, Stage::Synthesize, Stage::Package] {
            let depth = count_queue_rows(&self.pool, stage.queue_name()).await.unwrap_or(0);
            self.metrics.queue_depth.with_label_values(&[stage.queue_name()]).set(depth as i64);
            queue_depth.insert(stage.queue_name(), depth);
        }

        let status = if database == "ok" { "ok" } else { "degraded" };
        HealthReport { status, database, queue_depth }
    }
}

async fn count_queue_rows(pool: &SqlitePool, queue: &str) -> Result<u64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_jobs WHERE queue = ?")
        .bind(queue)
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
}
