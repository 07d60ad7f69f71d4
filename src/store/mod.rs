//! Cart persistence: a write-through store over a pluggable repository.
//!
//! The in-memory cart is the caller-visible state; every mutation flushes
//! the full record to the repository. A failed flush is logged and
//! swallowed, so the session keeps running on the in-memory copy even when
//! durability is lost.

mod file;

pub use file::{FileRepository, MemoryRepository};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::cart::{Cart, CartLine, Variant};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The device-local key-value record holding the cart.
#[allow(async_fn_in_trait)]
pub trait CartRepository {
    /// Raw persisted record, `None` when nothing has been written yet.
    async fn load(&self) -> Result<Option<String>, StorageError>;
    async fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// Write-through cart store: mutations update the in-memory cart first,
/// then persist as a best-effort side effect.
///
/// One store instance assumes a single writer; `&mut self` on every
/// mutation makes that a compile-time property.
pub struct CartStore<R: CartRepository> {
    repo: R,
    cart: Cart,
}

impl<R: CartRepository> CartStore<R> {
    pub async fn open(repo: R) -> Self {
        let cart = read_or_empty(&repo).await;
        Self { repo, cart }
    }

    /// Rehydrates from the persisted record, e.g. on screen focus. A flush
    /// still in flight elsewhere wins or loses wholesale (last flush wins).
    pub async fn reload(&mut self) {
        self.cart = read_or_empty(&self.repo).await;
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub async fn add_item(&mut self, line: CartLine) -> &Cart {
        self.cart.add_line(line);
        self.flush().await;
        &self.cart
    }

    pub async fn set_quantity(&mut self, id: &str, variant: &Variant, quantity: i64) -> &Cart {
        self.cart.set_quantity(id, variant, quantity);
        self.flush().await;
        &self.cart
    }

    pub async fn remove_item(&mut self, id: &str, variant: &Variant) -> &Cart {
        self.cart.remove_line(id, variant);
        self.flush().await;
        &self.cart
    }

    pub async fn clear(&mut self) -> &Cart {
        self.cart.clear();
        self.flush().await;
        &self.cart
    }

    async fn flush(&mut self) {
        for event in self.cart.take_events() {
            debug!(?event, "cart event");
        }
        match serde_json::to_string(&self.cart) {
            Ok(payload) => {
                if let Err(err) = self.repo.save(&payload).await {
                    warn!(%err, "failed to persist cart, keeping in-memory copy");
                }
            }
            Err(err) => warn!(%err, "failed to encode cart record"),
        }
    }
}

/// Fail-safe read: an absent, unreadable, or malformed record silently
/// resets to the canonical empty cart. Corruption never surfaces as a
/// user-facing error.
async fn read_or_empty<R: CartRepository>(repo: &R) -> Cart {
    match repo.load().await {
        Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
            Ok(mut cart) => {
                // The total is derived state; never trust the stored copy.
                cart.recalculate();
                cart
            }
            Err(err) => {
                warn!(%err, "persisted cart is malformed, resetting");
                Cart::new()
            }
        },
        Ok(None) => Cart::new(),
        Err(err) => {
            warn!(%err, "failed to read persisted cart, resetting");
            Cart::new()
        }
    }
}
