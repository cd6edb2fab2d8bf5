//! Cart operation application.

use crate::types::{CartEntry, Product, ProductId};
use serde::{Deserialize, Serialize};

/// A mutation of the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum CartOperation {
    /// Append a new entry, or bump the quantity of an existing one.
    Add(Product),

    /// Bump the quantity of an existing entry.
    Increment(ProductId),

    /// Lower the quantity of an existing entry, removing it at zero.
    Decrement(ProductId),
}

impl CartOperation {
    /// The product this operation targets.
    pub fn product_id(&self) -> &ProductId {
        match self {
            CartOperation::Add(product) => &product.id,
            CartOperation::Increment(id) | CartOperation::Decrement(id) => id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CartOperation::Add(_) => "add",
            CartOperation::Increment(_) => "increment",
            CartOperation::Decrement(_) => "decrement",
        }
    }
}

/// Apply an operation to a list of entries.
///
/// Returns `false` when the operation was a no-op and `entries` is untouched.
pub fn apply_operation(entries: &mut Vec<CartEntry>, operation: CartOperation) -> bool {
    match operation {
        CartOperation::Add(product) => {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == product.id) {
                // The descriptor's other fields are ignored for known products.
                entry.quantity = entry.quantity.saturating_add(1);
            } else {
                entries.push(CartEntry::from_product(product));
            }
            true
        }

        CartOperation::Increment(id) => match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.quantity = entry.quantity.saturating_add(1);
                true
            }
            None => false,
        },

        CartOperation::Decrement(id) => match entries.iter().position(|e| e.id == id) {
            Some(index) if entries[index].quantity <= 1 => {
                // `remove` keeps the relative order of the remaining entries.
                entries.remove(index);
                true
            }
            Some(index) => {
                entries[index].quantity -= 1;
                true
            }
            None => false,
        },
    }
}
