// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Generic driver for the Stage Worker Protocol's nine-step loop (spec
//! §4.4), parameterized over any [`StageHandler`]. One `StageRunner`
//! instance owns exactly one stage; `serve --no-workers=false` spins up
//! four of them as background tasks, `worker --stage <name>` runs one
//! standalone.

use std::sync::Arc;
use std::time::Duration;

use audiobook_pipeline_domain::{
    backoff_delay, BookState, DomainError, FailureClass, Job, MetadataStore, Percent, QueueBroker, Stage, StageHandler,
    UpdateOutcome,
};
use tracing::{info, warn};

pub struct StageRunnerConfig {
    pub consumer_id: String,
    pub lease_duration: Duration,
    pub max_attempts: u32,
    pub idle_poll_interval: Duration,
}

pub struct StageRunner {
    stage: Stage,
    queue_broker: Arc<dyn QueueBroker>,
    metadata_store: Arc<dyn MetadataStore>,
    handler: Arc<dyn StageHandler>,
    config: StageRunnerConfig,
}

impl StageRunner {
    pub fn new(
        stage: Stage,
        queue_broker: Arc<dyn QueueBroker>,
        metadata_store: Arc<dyn MetadataStore>,
        handler: Arc<dyn StageHandler>,
        config: StageRunnerConfig,
    ) -> Self {
        Self {
            stage,
            queue_broker,
            metadata_store,
            handler,
            config,
        }
    }

    /// Runs one reserve/guard/work/advance cycle. Returns `true` if a job
    /// was found and processed (whatever the outcome), `false` if the
    /// queue was empty.
    pub async fn tick(&self) -> Result<bool, DomainError> {
        let Some((job, receipt)) = self
            .queue_broker
            .reserve(self.stage.queue_name(), &self.config.consumer_id, self.config.lease_duration)
            .await?
        else {
            return Ok(false);
        };

        let book = match self.metadata_store.get_book(&job.book_id).await {
            Ok(book) => book,
            Err(DomainError::NotFound(_)) => {
                // Deleted while queued (spec §4.5): discard without touching blobs.
                self.queue_broker.ack(&receipt).await?;
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let entry_state = BookState::entry_state_for_stage(self.stage);
        if book.state != entry_state {
            // A prior attempt already advanced (or failed) this book; this
            // delivery is stale (spec §4.4 step 2).
            self.queue_broker.ack(&receipt).await?;
            return Ok(true);
        }

        let in_progress_state = BookState::in_progress_state_for_stage(self.stage);
        let entry_percent = Percent::new(self.stage.entry_percent())?;
        let claimed = self
            .metadata_store
            .update_book_state(&job.book_id, entry_state, in_progress_state, Some(entry_percent), None)
            .await;
        match claimed {
            Ok(UpdateOutcome::Applied) => {}
            Ok(UpdateOutcome::StaleTransition) => {
                self.queue_broker.ack(&receipt).await?;
                return Ok(true);
            }
            Err(DomainError::NotFound(_)) => {
                self.queue_broker.ack(&receipt).await?;
                return Ok(true);
            }
            Err(e) => return Err(e),
        }

        info!(stage = self.stage.queue_name(), book_id = %job.book_id, "stage started");
        match self.handler.run(&job.book_id).await {
            Ok(()) => self.on_success(&job, &receipt, in_progress_state).await,
            Err(stage_err) => self.on_failure(&job, &receipt, in_progress_state, stage_err).await,
        }?;
        Ok(true)
    }

    async fn on_success(
        &self,
        job: &Job,
        receipt: &audiobook_pipeline_domain::Receipt,
        in_progress_state: BookState,
    ) -> Result<(), DomainError> {
        let exit_state = BookState::exit_state_for_stage(self.stage);
        let exit_percent = Percent::new(self.stage.exit_percent())?;
        let outcome = self
            .metadata_store
            .update_book_state(&job.book_id, in_progress_state, exit_state, Some(exit_percent), None)
            .await;

        match outcome {
            Ok(UpdateOutcome::Applied) => {
                if let Some(next_stage) = self.stage.next() {
                    self.queue_broker.enqueue(next_stage.queue_name(), Job::new(job.book_id.clone())).await?;
                }
                info!(stage = self.stage.queue_name(), book_id = %job.book_id, "stage completed");
            }
            Ok(UpdateOutcome::StaleTransition) => {
                warn!(stage = self.stage.queue_name(), book_id = %job.book_id, "book advanced out from under a completing worker");
            }
            Err(DomainError::NotFound(_)) => {
                warn!(stage = self.stage.queue_name(), book_id = %job.book_id, "book deleted before completion could be recorded");
            }
            Err(e) => return Err(e),
        }
        self.queue_broker.ack(receipt).await
    }

    async fn on_failure(
        &self,
        job: &Job,
        receipt: &audiobook_pipeline_domain::Receipt,
        in_progress_state: BookState,
        stage_err: audiobook_pipeline_domain::StageError,
    ) -> Result<(), DomainError> {
        let should_retry = stage_err.class == FailureClass::Transient && job.attempt_count + 1 < self.config.max_attempts;

        if should_retry {
            warn!(
                stage = self.stage.queue_name(),
                book_id = %job.book_id,
                attempt = job.attempt_count,
                error = %stage_err,
                "stage failed transiently, retrying"
            );
            let delay = backoff_delay(job.attempt_count);
            return self.queue_broker.nack(receipt, delay).await;
        }

        warn!(
            stage = self.stage.queue_name(),
            book_id = %job.book_id,
            error = %stage_err,
            "stage failed, moving book to Failed"
        );
        let outcome = self
            .metadata_store
            .update_book_state(&job.book_id, in_progress_state, BookState::Failed, None, Some(stage_err.message.clone()))
            .await;
        match outcome {
            Ok(_) => {}
            Err(DomainError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.queue_broker.ack(receipt).await
    }

    /// Polls `tick` until `shutdown` is cancelled, sleeping
    /// `idle_poll_interval` between empty polls so an idle worker doesn't
    /// spin.
    pub async fn run_until_cancelled(&self, shutdown: audiobook_pipeline_bootstrap::shutdown::CancellationToken) {
        while !shutdown.is_cancelled() {
            match self.tick().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(self.config.idle_poll_interval).await,
                Err(e) => {
                    warn!(stage = self.stage.queue_name(), error = %e, "stage runner tick failed");
                    tokio::time::sleep(self.config.idle_poll_interval).await;
                }
            }
        }
    }
}
