//! Snapshot persistence.
//!
//! Every mutation hands a full serialized cart to a single writer thread.
//! Writes never overlap and complete in the order they were issued, so a
//! slow, older write can never land on top of a newer one.

mod writer;

pub use writer::SnapshotWriter;
