// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The generic stage-worker loop and its four concrete handlers.

pub mod stage_handlers;
pub mod stage_runner;

pub use stage_handlers::{ExtractHandler, PackageHandler, SegmentHandler, SynthesizeHandler};
pub use stage_runner::{StageRunner, StageRunnerConfig};
