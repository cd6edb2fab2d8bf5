//! # Cart Store
//!
//! The shopping-cart state engine for a storefront app: which products the
//! shopper picked, how many of each, and a durable copy that survives
//! restarts.
//!
//! ## Core Concepts
//!
//! - **Entries**: ordered `(product, quantity)` lines, unique by product id
//! - **Operations**: add, increment and decrement; quantities never reach 0
//! - **Snapshots**: every change queues the full cart as one JSON record
//! - **Subscriptions**: readers are told about every change, in order
//!
//! ## Example
//!
//! ```ignore
//! use cartstore::{CartProvider, CartStoreConfig, FileStorage, Product};
//!
//! let storage = Arc::new(FileStorage::open("./data")?);
//! let provider = CartProvider::mount(storage, CartStoreConfig::default())?;
//!
//! let cart = provider.cart();
//! cart.add_to_cart(Product::new("p1", "Shirt", "https://img/p1", 10.0));
//! cart.increment("p1");
//! cart.decrement("p1");
//!
//! for entry in cart.entries().iter() {
//!     println!("{} x{}", entry.title, entry.quantity);
//! }
//! ```

pub mod error;
pub mod persist;
pub mod provider;
pub mod state;
pub mod storage;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{CartError, Result};
pub use persist::SnapshotWriter;
pub use provider::CartProvider;
pub use state::{apply_operation, decode_snapshot, encode_snapshot, CartOperation};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CartStore, CartStoreConfig, LoadOutcome};
pub use subscriptions::{
    CartEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
pub use types::*;
