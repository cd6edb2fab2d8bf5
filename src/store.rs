//! Main CartStore tying state, persistence and subscriptions together.

use crate::error::{CartError, Result};
use crate::persist::SnapshotWriter;
use crate::state::{apply_operation, decode_snapshot, encode_snapshot, CartOperation};
use crate::storage::KeyValueStorage;
use crate::subscriptions::{
    CartEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{CartEntry, CartSnapshot, CartStats, Product, ProductId, Version};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cart store configuration.
#[derive(Clone, Debug)]
pub struct CartStoreConfig {
    /// App namespace used to build the storage key.
    pub namespace: String,

    /// Buffer size for subscriptions created with [`CartStore::subscribe`].
    pub subscription_buffer: usize,
}

impl CartStoreConfig {
    /// Key of the durable record: `@<namespace>:products`.
    pub fn storage_key(&self) -> String {
        format!("@{}:products", self.namespace)
    }
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            namespace: "GoMarketplace".to_string(),
            subscription_buffer: SubscriptionConfig::default().buffer_size,
        }
    }
}

/// What [`CartStore::load`] found.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No record; the cart starts empty.
    Empty,

    /// The record was decoded and installed.
    Restored { entries: usize },

    /// The record was unusable; the cart starts empty.
    Discarded { reason: CartError },

    /// The cart was already loaded or mutated; the record was not read.
    Skipped,
}

struct CartState {
    entries: CartSnapshot,
    version: Version,
    loaded: bool,
}

/// The shopping cart.
///
/// Sole owner of the cart entries. Every change goes through
/// [`add_to_cart`](Self::add_to_cart), [`increment`](Self::increment) or
/// [`decrement`](Self::decrement); each one updates memory, notifies
/// subscribers and queues a full snapshot for storage before returning.
pub struct CartStore {
    config: CartStoreConfig,

    /// Durable record key.
    key: String,

    storage: Arc<dyn KeyValueStorage>,

    /// Current entries. Held only for in-memory work, never across I/O.
    state: RwLock<CartState>,

    subscriptions: SubscriptionManager,

    writer: SnapshotWriter,
}

impl CartStore {
    /// Create an empty store backed by `storage`.
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: CartStoreConfig) -> Result<Self> {
        let key = config.storage_key();
        let writer = SnapshotWriter::spawn(Arc::clone(&storage), key.clone())?;

        Ok(Self {
            config,
            key,
            storage,
            state: RwLock::new(CartState {
                entries: CartSnapshot::default(),
                version: Version::default(),
                loaded: false,
            }),
            subscriptions: SubscriptionManager::new(),
            writer,
        })
    }

    /// Create a store and load the persisted cart.
    pub fn open(storage: Arc<dyn KeyValueStorage>, config: CartStoreConfig) -> Result<Self> {
        let store = Self::new(storage, config)?;
        store.load();
        Ok(store)
    }

    // --- Lifecycle ---

    /// Restore the cart from storage.
    ///
    /// Runs once: later calls, or calls after the cart has been mutated,
    /// return [`LoadOutcome::Skipped`]. An unreadable or corrupt record is
    /// logged and leaves the cart empty.
    pub fn load(&self) -> LoadOutcome {
        if self.is_settled() {
            warn!(key = %self.key, "cart already loaded, ignoring load");
            return LoadOutcome::Skipped;
        }

        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "cart record could not be read, starting empty");
                self.state.write().loaded = true;
                return LoadOutcome::Discarded { reason: e };
            }
        };

        let entries = match raw.as_deref().map(decode_snapshot) {
            None => {
                info!(key = %self.key, "no persisted cart, starting empty");
                self.state.write().loaded = true;
                return LoadOutcome::Empty;
            }
            Some(Ok(entries)) => entries,
            Some(Err(reason)) => {
                error!(key = %self.key, error = %reason, "discarding corrupt cart record");
                self.state.write().loaded = true;
                return LoadOutcome::Discarded { reason };
            }
        };

        let mut state = self.state.write();
        if state.loaded || state.version != Version::default() {
            // Mutated while the record was being read; memory wins.
            warn!(key = %self.key, "cart changed during load, keeping in-memory cart");
            return LoadOutcome::Skipped;
        }

        let count = entries.len();
        let entries: CartSnapshot = Arc::new(entries);
        state.entries = Arc::clone(&entries);
        state.version = state.version.next();
        state.loaded = true;

        self.subscriptions.broadcast(CartEvent::Loaded {
            entries,
            version: state.version,
        });
        info!(key = %self.key, entries = count, "cart restored");

        LoadOutcome::Restored { entries: count }
    }

    /// Whether `load` has run or the cart has already changed.
    fn is_settled(&self) -> bool {
        let state = self.state.read();
        state.loaded || state.version != Version::default()
    }

    /// Block until every queued snapshot has been handed to storage.
    pub fn flush(&self) -> Result<()> {
        self.writer.flush()
    }

    // --- Mutations ---

    /// Add one unit of `product`.
    ///
    /// A new product is appended with quantity 1. A product already in the
    /// cart is incremented; the descriptor's title, image and price are
    /// ignored in that case.
    pub fn add_to_cart(&self, product: Product) -> bool {
        self.apply(CartOperation::Add(product))
    }

    /// Add one unit of an existing entry. Unknown ids are ignored.
    pub fn increment(&self, id: impl Into<ProductId>) -> bool {
        self.apply(CartOperation::Increment(id.into()))
    }

    /// Remove one unit of an existing entry, dropping the entry at zero.
    /// Unknown ids are ignored.
    pub fn decrement(&self, id: impl Into<ProductId>) -> bool {
        self.apply(CartOperation::Decrement(id.into()))
    }

    /// Apply an operation. Returns whether the cart changed.
    pub fn apply(&self, operation: CartOperation) -> bool {
        let mut state = self.state.write();

        let mut next = Vec::clone(&state.entries);
        if !apply_operation(&mut next, operation.clone()) {
            debug!(op = operation.name(), id = %operation.product_id(), "cart operation was a no-op");
            return false;
        }

        let version = state.version.next();
        let entries: CartSnapshot = Arc::new(next);
        state.entries = Arc::clone(&entries);
        state.version = version;

        // Queued under the lock so the writer sees snapshots in mutation order.
        match encode_snapshot(&entries) {
            Ok(payload) => {
                if let Err(e) = self.writer.enqueue(version, payload) {
                    error!(key = %self.key, version = version.0, error = %e, "could not queue cart snapshot");
                }
            }
            Err(e) => {
                error!(key = %self.key, version = version.0, error = %e, "could not encode cart snapshot");
            }
        }

        debug!(op = operation.name(), id = %operation.product_id(), version = version.0, "cart updated");

        self.subscriptions.broadcast(CartEvent::Changed {
            operation,
            entries,
            version,
        });

        true
    }

    // --- Reads ---

    /// The current cart, in display order.
    pub fn entries(&self) -> CartSnapshot {
        Arc::clone(&self.state.read().entries)
    }

    /// The entry for `id`, if present.
    pub fn get(&self, id: &str) -> Option<CartEntry> {
        self.state
            .read()
            .entries
            .iter()
            .find(|e| e.id.as_str() == id)
            .cloned()
    }

    /// Quantity of `id`, 0 when absent.
    pub fn quantity_of(&self, id: &str) -> u32 {
        self.get(id).map(|e| e.quantity).unwrap_or(0)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Total units across all entries (badge count).
    pub fn item_count(&self) -> u64 {
        self.state
            .read()
            .entries
            .iter()
            .map(|e| u64::from(e.quantity))
            .sum()
    }

    pub fn version(&self) -> Version {
        self.state.read().version
    }

    /// Key of the durable record.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &CartStoreConfig {
        &self.config
    }

    pub fn stats(&self) -> CartStats {
        CartStats {
            version: self.version(),
            persisted_version: self.writer.persisted_version(),
            write_failures: self.writer.write_failures(),
            subscriber_count: self.subscriptions.subscription_count(),
        }
    }

    // --- Subscriptions ---

    /// Subscribe with the store's default buffer size.
    pub fn subscribe(&self) -> SubscriptionHandle {
        self.subscribe_with(SubscriptionConfig {
            buffer_size: self.config.subscription_buffer,
        })
    }

    pub fn subscribe_with(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }
}
