//! Durable record encoding.
//!
//! The record is a JSON array of entries in cart order.

use crate::error::{CartError, Result};
use crate::types::CartEntry;
use std::collections::HashSet;

/// Encode the full cart as the durable record.
///
/// Fails on a non-finite price: JSON would store it as `null` and the whole
/// record would be rejected on the next load.
pub fn encode_snapshot(entries: &[CartEntry]) -> Result<String> {
    if let Some(entry) = entries.iter().find(|e| !e.price.is_finite()) {
        return Err(CartError::Serialization(format!(
            "product {} has non-finite price {}",
            entry.id, entry.price
        )));
    }
    Ok(serde_json::to_string(entries)?)
}

/// Decode a durable record, checking the cart invariants.
///
/// Anything that is not a valid cart (bad JSON, duplicate ids, zero
/// quantities) is reported as [`CartError::LoadParse`].
pub fn decode_snapshot(raw: &str) -> Result<Vec<CartEntry>> {
    let entries: Vec<CartEntry> =
        serde_json::from_str(raw).map_err(|e| CartError::LoadParse(e.to_string()))?;

    let mut seen = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if entry.quantity == 0 {
            return Err(CartError::LoadParse(format!(
                "entry {} ({}) has quantity 0",
                index, entry.id
            )));
        }
        if !seen.insert(&entry.id) {
            return Err(CartError::LoadParse(format!(
                "duplicate entry for product {}",
                entry.id
            )));
        }
    }

    Ok(entries)
}
