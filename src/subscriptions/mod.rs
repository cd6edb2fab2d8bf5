//! Subscription system for live cart updates.
//!
//! Each subscriber gets a bounded channel. The store pushes an event into
//! every channel while it still holds the cart lock, so subscribers observe
//! changes in mutation order. Slow subscribers are dropped rather than
//! allowed to stall the store.
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe_with(SubscriptionConfig { buffer_size: 64 });
//!
//! loop {
//!     match handle.recv() {
//!         Ok(CartEvent::Changed { entries, .. }) => render(&entries),
//!         Ok(CartEvent::Loaded { entries, .. }) => render(&entries),
//!         Ok(CartEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{CartEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};
