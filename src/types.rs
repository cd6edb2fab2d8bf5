//! Core types for the cart store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of the product behind a cart entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        ProductId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProductId({})", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        ProductId(s)
    }
}

/// Monotonic counter of in-memory cart mutations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Version(pub u64);

impl Version {
    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A product descriptor as handed in by the presentation layer.
///
/// Carries everything a [`CartEntry`] has except the quantity, which the
/// store owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: f64,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One product line in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Key of the entry; unique within a cart.
    pub id: ProductId,

    /// Display name (opaque to the store).
    pub title: String,

    /// Display image reference (opaque to the store).
    #[serde(alias = "imageUrl")]
    pub image_url: String,

    /// Unit price (opaque to the store).
    pub price: f64,

    /// Always at least 1 while the entry exists.
    pub quantity: u32,
}

impl CartEntry {
    /// New entry with a quantity of one.
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: 1,
        }
    }
}

/// Immutable view of the cart at one point in time.
///
/// Cloning is cheap, so readers never hold the store's lock while rendering.
pub type CartSnapshot = Arc<Vec<CartEntry>>;

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartStats {
    /// Version of the in-memory cart.
    pub version: Version,
    /// Newest version the writer has handed to storage successfully.
    pub persisted_version: Version,
    /// Writes that failed since the store was created.
    pub write_failures: u64,
    pub subscriber_count: usize,
}
