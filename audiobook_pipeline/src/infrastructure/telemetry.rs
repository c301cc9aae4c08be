// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup (spec §6 ambient stack): one `tracing`
//! subscriber for the whole process, level driven by `AppConfig`'s
//! `log_level` with an `RUST_LOG`-style env-filter override.

use audiobook_pipeline_bootstrap::LogLevel;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_tracing(log_level: LogLevel) {
    let default_directive = log_level.to_tracing_level().to_string();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already initialized (e.g. by a test harness); not a startup error.
        tracing::debug!("tracing subscriber already initialized, skipping");
    }
}
