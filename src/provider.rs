//! Explicit handle to the app's single cart.
//!
//! The app builds one [`CartProvider`] at startup and passes it (or clones
//! of it) to whatever needs the cart. Reaching for the cart through a
//! provider that was never given a store is a programming error.

use crate::error::{CartError, Result};
use crate::storage::KeyValueStorage;
use crate::store::{CartStore, CartStoreConfig};
use std::sync::Arc;

/// Shared handle to the cart store.
#[derive(Clone, Default)]
pub struct CartProvider {
    store: Option<Arc<CartStore>>,
}

impl CartProvider {
    /// Wrap an existing store.
    pub fn new(store: Arc<CartStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A provider with no store behind it.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Create the store and load the persisted cart before handing it out.
    pub fn mount(storage: Arc<dyn KeyValueStorage>, config: CartStoreConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(CartStore::open(storage, config)?)))
    }

    /// Whether a store is installed.
    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    /// The cart store, or [`CartError::OutsideProvider`].
    pub fn try_cart(&self) -> Result<&Arc<CartStore>> {
        self.store.as_ref().ok_or(CartError::OutsideProvider)
    }

    /// The cart store.
    ///
    /// # Panics
    ///
    /// Panics if no store was installed.
    pub fn cart(&self) -> &Arc<CartStore> {
        match self.try_cart() {
            Ok(store) => store,
            Err(e) => panic!("{}", e),
        }
    }
}
