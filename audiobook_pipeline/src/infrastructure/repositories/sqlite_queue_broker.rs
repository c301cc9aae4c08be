// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite adapter for the `QueueBroker` contract (spec §4.3). Each named
//! queue is a `WHERE queue = ?` slice of the `queue_jobs` table; `reserve`
//! claims the oldest visible row with a single UPDATE-then-SELECT pair
//! guarded by `lease_expires_at`, so a crashed consumer's lease simply
//! expires and the row becomes visible again without operator action.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::time::Duration;

use audiobook_pipeline_domain::{BookId, DomainError, Job, QueueBroker, Receipt};

pub struct SqliteQueueBroker {
    pool: SqlitePool,
}

impl SqliteQueueBroker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_err(err: sqlx::Error) -> DomainError {
    DomainError::Transient(format!("queue broker: {err}"))
}

fn receipt_row_id(receipt: &Receipt) -> Result<i64, DomainError> {
    receipt
        .0
        .parse()
        .map_err(|_| DomainError::Integrity(format!("malformed queue receipt: {}", receipt.0)))
}

#[async_trait]
impl QueueBroker for SqliteQueueBroker {
    async fn enqueue(&self, queue: &str, job: Job) -> Result<(), DomainError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO queue_jobs (queue, book_id, attempt_count, stage_inputs, visible_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(queue)
        .bind(job.book_id.to_string())
        .bind(job.attempt_count as i64)
        .bind(job.stage_inputs.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn reserve(
        &self,
        queue: &str,
        consumer_id: &str,
        lease_duration: Duration,
    ) -> Result<Option<(Job, Receipt)>, DomainError> {
        let now = Utc::now();
        let lease_expires_at = now + chrono::Duration::from_std(lease_duration).unwrap_or(chrono::Duration::seconds(300));

        // Two-step claim: find the oldest eligible row, then win it with a
        // conditional UPDATE. A losing racer's UPDATE affects zero rows and
        // the caller's `reserve` returns `None` rather than retrying here,
        // matching the at-least-once contract (no blocking inside a claim).
        let candidate = sqlx::query(
            "SELECT id FROM queue_jobs WHERE queue = ? AND visible_at <= ? \
             AND (lease_expires_at IS NULL OR lease_expires_at <= ?) \
             ORDER BY visible_at ASC LIMIT 1",
        )
        .bind(queue)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let Some(candidate) = candidate else {
            return Ok(None);
        };
        let id: i64 = candidate.try_get("id").map_err(map_sqlx_err)?;

        let claim = sqlx::query(
            "UPDATE queue_jobs SET leased_by = ?, lease_expires_at = ? \
             WHERE id = ? AND (lease_expires_at IS NULL OR lease_expires_at <= ?)",
        )
        .bind(consumer_id)
        .bind(lease_expires_at)
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if claim.rows_affected() == 0 {
            // Another consumer won the race between the SELECT and UPDATE.
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM queue_jobs WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let book_id: String = row.try_get("book_id").map_err(map_sqlx_err)?;
        let attempt_count: i64 = row.try_get("attempt_count").map_err(map_sqlx_err)?;
        let stage_inputs_raw: String = row.try_get("stage_inputs").map_err(map_sqlx_err)?;
        let stage_inputs = serde_json::from_str(&stage_inputs_raw).unwrap_or(serde_json::Value::Null);

        let job = Job {
            book_id: BookId::from_string(&book_id)?,
            attempt_count: attempt_count as u32,
            stage_inputs,
        };
        Ok(Some((job, Receipt(id.to_string()))))
    }

    async fn ack(&self, receipt: &Receipt) -> Result<(), DomainError> {
        let id = receipt_row_id(receipt)?;
        sqlx::query("DELETE FROM queue_jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn nack(&self, receipt: &Receipt, requeue_delay: Duration) -> Result<(), DomainError> {
        let id = receipt_row_id(receipt)?;
        let visible_at: DateTime<Utc> =
            Utc::now() + chrono::Duration::from_std(requeue_delay).unwrap_or(chrono::Duration::zero());
        sqlx::query(
            "UPDATE queue_jobs SET attempt_count = attempt_count + 1, visible_at = ?, \
             leased_by = NULL, lease_expires_at = NULL WHERE id = ?",
        )
        .bind(visible_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }
}
