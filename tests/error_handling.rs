//! Error handling and edge case tests.

use cartstore::{
    CartError, CartProvider, CartStore, CartStoreConfig, FileStorage, KeyValueStorage,
    LoadOutcome, MemoryStorage, Product, Result, Version,
};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const KEY: &str = "@GoMarketplace:products";

fn product(id: &str) -> Product {
    Product::new(id, "Item", "u", 1.0)
}

/// Captures formatted log output for the current thread.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

/// Storage whose writes can be switched off.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl KeyValueStorage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CartError::Io(io::Error::new(io::ErrorKind::Other, "quota exceeded")));
        }
        self.inner.set(key, value)
    }
}

/// Storage that cannot be read.
struct UnreadableStorage;

impl KeyValueStorage for UnreadableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(CartError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }
}

// --- Load Errors ---

#[test]
fn test_corrupt_record_starts_empty_and_logs() {
    let storage = Arc::new(MemoryStorage::with_value(KEY, "{{{ definitely not json"));
    let store = CartStore::new(storage, CartStoreConfig::default()).unwrap();

    let (outcome, logs) = with_captured_logs(|| store.load());

    assert!(matches!(
        outcome,
        LoadOutcome::Discarded {
            reason: CartError::LoadParse(_)
        }
    ));
    assert!(store.is_empty());
    assert!(logs.contains("ERROR"), "logs were: {}", logs);
    assert!(logs.contains("discarding corrupt cart record"), "logs were: {}", logs);
}

#[test]
fn test_duplicate_ids_in_record_are_corrupt() {
    let raw = r#"[
        {"id":"p1","title":"A","image_url":"u","price":1,"quantity":1},
        {"id":"p1","title":"B","image_url":"u","price":1,"quantity":4}
    ]"#;
    let storage = Arc::new(MemoryStorage::with_value(KEY, raw));
    let store = CartStore::new(storage, CartStoreConfig::default()).unwrap();

    assert!(matches!(
        store.load(),
        LoadOutcome::Discarded {
            reason: CartError::LoadParse(_)
        }
    ));
    assert!(store.is_empty());
}

#[test]
fn test_zero_quantity_in_record_is_corrupt() {
    let raw = r#"[{"id":"p1","title":"A","image_url":"u","price":1,"quantity":0}]"#;
    let storage = Arc::new(MemoryStorage::with_value(KEY, raw));
    let store = CartStore::new(storage, CartStoreConfig::default()).unwrap();

    assert!(matches!(store.load(), LoadOutcome::Discarded { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_corrupt_record_replaced_by_next_mutation() {
    let storage = Arc::new(MemoryStorage::with_value(KEY, "garbage"));
    let store = CartStore::new(storage.clone(), CartStoreConfig::default()).unwrap();
    store.load();

    // Left in place until the cart changes.
    assert_eq!(storage.get(KEY).unwrap().as_deref(), Some("garbage"));

    store.add_to_cart(product("p1"));
    store.flush().unwrap();

    let raw = storage.get(KEY).unwrap().unwrap();
    assert_eq!(cartstore::decode_snapshot(&raw).unwrap().len(), 1);
}

#[test]
fn test_unreadable_storage_starts_empty() {
    let store = CartStore::new(Arc::new(UnreadableStorage), CartStoreConfig::default()).unwrap();

    assert!(matches!(
        store.load(),
        LoadOutcome::Discarded {
            reason: CartError::Io(_)
        }
    ));
    assert!(store.is_empty());

    // The cart still works for the session.
    assert!(store.add_to_cart(product("p1")));
    assert_eq!(store.quantity_of("p1"), 1);
}

// --- Write Errors ---

#[test]
fn test_write_failure_keeps_memory() {
    let storage = Arc::new(FlakyStorage::default());
    storage.fail_writes.store(true, Ordering::SeqCst);
    let store = CartStore::new(storage.clone(), CartStoreConfig::default()).unwrap();

    store.add_to_cart(product("p1"));
    store.add_to_cart(product("p1"));
    store.flush().unwrap();

    assert_eq!(store.quantity_of("p1"), 2);
    let stats = store.stats();
    assert!(stats.write_failures >= 1);
    assert_eq!(stats.persisted_version, Version(0));
    assert_eq!(storage.get(KEY).unwrap(), None);
}

#[test]
fn test_write_recovers_on_next_mutation() {
    let storage = Arc::new(FlakyStorage::default());
    storage.fail_writes.store(true, Ordering::SeqCst);
    let store = CartStore::new(storage.clone(), CartStoreConfig::default()).unwrap();

    store.add_to_cart(product("p1"));
    store.flush().unwrap();

    // No retry happens on its own.
    storage.fail_writes.store(false, Ordering::SeqCst);
    store.flush().unwrap();
    assert_eq!(storage.get(KEY).unwrap(), None);

    store.add_to_cart(product("p2"));
    store.flush().unwrap();

    let raw = storage.get(KEY).unwrap().unwrap();
    let persisted = cartstore::decode_snapshot(&raw).unwrap();
    assert_eq!(persisted.as_slice(), store.entries().as_slice());
    assert_eq!(store.stats().write_failures, 1);
}

#[test]
fn test_non_finite_price_keeps_last_good_record() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let store = CartStore::new(storage.clone(), CartStoreConfig::default()).unwrap();
        store.add_to_cart(Product::new("p1", "Shirt", "u1", 10.0));
        store.add_to_cart(Product::new("p2", "Broken", "u2", f64::NAN));
        store.flush().unwrap();

        // Memory keeps both; storage keeps the last cart it could encode.
        assert_eq!(store.len(), 2);
        let stats = store.stats();
        assert_eq!(stats.version, Version(2));
        assert_eq!(stats.persisted_version, Version(1));
    }

    let raw = storage.get(KEY).unwrap().unwrap();
    assert!(!raw.contains("null"), "record was: {}", raw);

    let reopened = CartStore::new(storage, CartStoreConfig::default()).unwrap();
    assert!(matches!(reopened.load(), LoadOutcome::Restored { entries: 1 }));
    assert_eq!(reopened.quantity_of("p1"), 1);
}

// --- Storage Errors ---

#[test]
fn test_file_storage_single_writer() {
    let dir = TempDir::new().unwrap();
    let _held = FileStorage::open(dir.path()).unwrap();

    assert!(matches!(FileStorage::open(dir.path()), Err(CartError::Locked)));
}

// --- Usage Errors ---

#[test]
fn test_detached_provider_try_cart() {
    let provider = CartProvider::detached();
    assert!(matches!(provider.try_cart(), Err(CartError::OutsideProvider)));
}

#[test]
#[should_panic(expected = "outside of a CartProvider")]
fn test_detached_provider_panics_on_mutation() {
    let provider = CartProvider::detached();
    provider.cart().add_to_cart(product("p1"));
}

// --- Edge Cases ---

#[test]
fn test_empty_product_id_is_a_normal_key() {
    let store = CartStore::new(Arc::new(MemoryStorage::new()), CartStoreConfig::default()).unwrap();

    store.add_to_cart(product(""));
    store.increment("");
    assert_eq!(store.quantity_of(""), 2);
}

#[test]
fn test_decrement_past_zero_never_goes_negative() {
    let store = CartStore::new(Arc::new(MemoryStorage::new()), CartStoreConfig::default()).unwrap();
    store.add_to_cart(product("p1"));

    for _ in 0..5 {
        store.decrement("p1");
    }

    assert!(store.get("p1").is_none());
    assert_eq!(store.version(), Version(2));
}
