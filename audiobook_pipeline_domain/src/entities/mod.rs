//! Entities: objects with identity that persist across state changes.

mod book;
mod chunk;
mod user;

pub use book::{Book, TITLE_MAX_LEN, TITLE_MIN_LEN};
pub use chunk::{is_contiguous, Chunk, TARGET_CHUNK_DURATION_S};
pub use user::User;
