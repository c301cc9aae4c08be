// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: the two gateways the presentation layer calls into
//! (spec §4.6, §4.7). Each holds only the infrastructure traits it needs,
//! never a concrete adapter, so the HTTP layer stays swappable from the
//! orchestration underneath it.

pub mod ingest_gateway;
pub mod streaming_gateway;

pub use ingest_gateway::IngestGateway;
pub use streaming_gateway::{ByteRange, ChunkStream, StreamingGateway};
