// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Queue Broker contract (spec §4.3): named, stage-specific FIFO queues with
//! at-least-once delivery via a leased `Reserve`/`Ack`/`Nack` protocol.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::DomainError;
use crate::value_objects::BookId;

/// One queued unit of work: `(book_id, attempt_count, stage_inputs)` (spec
/// §4.3). `stage_inputs` is a small JSON blob, typically empty beyond the
/// book id.
#[derive(Debug, Clone)]
pub struct Job {
    pub book_id: BookId,
    pub attempt_count: u32,
    pub stage_inputs: serde_json::Value,
}

impl Job {
    pub fn new(book_id: BookId) -> Self {
        Self {
            book_id,
            attempt_count: 0,
            stage_inputs: serde_json::Value::Null,
        }
    }
}

/// A claim check returned by `reserve`, presented back to `ack`/`nack`.
/// Opaque to callers; implementations encode whatever they need (row id,
/// lease token) inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt(pub String);

#[async_trait]
pub trait QueueBroker: Send + Sync {
    async fn enqueue(&self, queue: &str, job: Job) -> Result<(), DomainError>;

    /// Claims the next visible job on `queue`, making it invisible to other
    /// consumers for `lease_duration`. Returns `None` if the queue is empty.
    async fn reserve(
        &self,
        queue: &str,
        consumer_id: &str,
        lease_duration: Duration,
    ) -> Result<Option<(Job, Receipt)>, DomainError>;

    /// Removes the job permanently.
    async fn ack(&self, receipt: &Receipt) -> Result<(), DomainError>;

    /// Returns the job to the queue, visible again after `requeue_delay`.
    async fn nack(&self, receipt: &Receipt, requeue_delay: Duration) -> Result<(), DomainError>;
}

/// Exponential backoff schedule for stage-worker retries (spec §4.4): base
/// 1s, factor 2, jitter ±25%, capped at 5 minutes.
pub fn backoff_delay(attempt_count: u32) -> Duration {
    const BASE_MS: u64 = 1_000;
    const CAP_MS: u64 = 5 * 60 * 1_000;
    let exp = BASE_MS.saturating_mul(1u64 << attempt_count.min(20));
    let capped = exp.min(CAP_MS);
    let jitter_span = capped / 4; // ±25%
    let jitter = (rand::random::<u64>() % (2 * jitter_span + 1)) as i64 - jitter_span as i64;
    let delayed = (capped as i64 + jitter).max(0) as u64;
    Duration::from_millis(delayed.min(CAP_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_with_attempt_count() {
        let d0 = backoff_delay(0);
        let d3 = backoff_delay(3);
        // Allow for jitter: compare against the unjittered midpoints.
        assert!(d0.as_millis() <= 1_250);
        assert!(d3.as_millis() >= 6_000);
    }

    #[test]
    fn backoff_never_exceeds_the_cap() {
        for attempt in 0..30 {
            assert!(backoff_delay(attempt) <= Duration::from_secs(5 * 60));
        }
    }
}
