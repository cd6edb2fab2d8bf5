//! Subscription types for cart change notifications.

use crate::state::CartOperation;
use crate::types::{CartSnapshot, Version};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 256
    pub buffer_size: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self { buffer_size: 256 }
    }
}

/// Events delivered to subscribers.
#[derive(Clone, Debug)]
pub enum CartEvent {
    /// The cart was replaced by the persisted record at startup.
    Loaded {
        entries: CartSnapshot,
        version: Version,
    },

    /// A mutation changed the cart.
    Changed {
        operation: CartOperation,
        entries: CartSnapshot,
        version: Version,
    },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

impl CartEvent {
    /// The cart carried by this event, if any.
    pub fn entries(&self) -> Option<&CartSnapshot> {
        match self {
            CartEvent::Loaded { entries, .. } | CartEvent::Changed { entries, .. } => Some(entries),
            CartEvent::Dropped { .. } => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// The receiving side went away.
    Disconnected,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<CartEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<CartEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<CartEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<CartEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every event that is already waiting.
    pub fn drain(&self) -> Vec<CartEvent> {
        self.receiver.try_iter().collect()
    }
}
