//! Repository contracts: the three stores every other component talks
//! through (spec §4.1-§4.3). Implementations live in the core crate's
//! `infrastructure` module; this crate only pins the contract.

mod blob_store;
mod metadata_store;
mod queue_broker;

pub use blob_store::{BlobStat, BlobStore, ByteChunk};
pub use metadata_store::{MetadataStore, Paging, UpdateOutcome};
pub use queue_broker::{backoff_delay, Job, QueueBroker, Receipt};
