//! Value objects: small, immutable, self-validating types that stand in for
//! primitives (`String`, `u8`, raw ULIDs) wherever the domain has a rule
//! about what makes a value legal.

mod book_format;
mod book_id;
mod book_state;
mod generic_id;
mod percent;
mod user_id;

pub use book_format::BookFormat;
pub use book_id::BookId;
pub use book_state::{BookState, Stage, ALL_STATES};
pub use percent::Percent;
pub use user_id::UserId;
