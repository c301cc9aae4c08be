// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Concrete adapters for the domain crate's repository traits.

pub mod filesystem_blob_store;
pub mod schema;
pub mod sqlite_metadata_store;
pub mod sqlite_queue_broker;

pub use filesystem_blob_store::FilesystemBlobStore;
pub use schema::{create_database_if_missing, ensure_schema, initialize_database};
pub use sqlite_metadata_store::SqliteMetadataStore;
pub use sqlite_queue_broker::SqliteQueueBroker;
