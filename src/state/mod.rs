//! Cart state transitions.
//!
//! Operations are pure functions over the entry list so the store only has
//! to worry about locking, persistence and notification.

mod operations;
mod snapshot;

pub use operations::{apply_operation, CartOperation};
pub use snapshot::{decode_snapshot, encode_snapshot};
