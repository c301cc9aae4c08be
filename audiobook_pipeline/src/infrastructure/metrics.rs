// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics (ambient observability, not named by spec.md but
//! carried regardless per the service's "gateway" role): queue depth per
//! stage, a books-by-state gauge, and stage duration histograms.

use prometheus::{HistogramVec, IntGaugeVec, Registry};

pub struct Metrics {
    pub registry: Registry,
    pub queue_depth: IntGaugeVec,
    pub books_by_state: IntGaugeVec,
    pub stage_duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let queue_depth = IntGaugeVec::new(
            prometheus::Opts::new("audiobook_queue_depth", "Number of jobs waiting on a stage queue"),
            &["queue"],
        )
        .expect("static metric definition is valid");

        let books_by_state = IntGaugeVec::new(
            prometheus::Opts::new("audiobook_books_by_state", "Number of books currently in each state"),
            &["state"],
        )
        .expect("static metric definition is valid");

        let stage_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new("audiobook_stage_duration_seconds", "Wall-clock time spent running one stage invocation"),
            &["stage"],
        )
        .expect("static metric definition is valid");

        registry.register(Box::new(queue_depth.clone())).expect("metric registration");
        registry.register(Box::new(books_by_state.clone())).expect("metric registration");
        registry
            .register(Box::new(stage_duration_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            queue_depth,
            books_by_state,
            stage_duration_seconds,
        }
    }

    pub fn render(&self) -> String {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).expect("prometheus text encoding never fails");
        String::from_utf8(buffer).expect("prometheus text encoding is always valid utf-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
