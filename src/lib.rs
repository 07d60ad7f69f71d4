//! Storefront Cart Engine
//!
//! Client-side cart and checkout logic for a shoe-retail mobile storefront.
//!
//! ## Features
//! - Write-through cart persisted to a device-local key-value record
//! - Merge-by-identity line items (product id + variant attributes)
//! - Fail-safe decoding of the persisted record: corruption resets the
//!   cart instead of surfacing an error
//! - Two checkout paths: cash and online (wallet QR, redirect gateway, card)
//! - Simulated payment gateway and best-effort confirmation notices behind
//!   injectable seams

pub mod checkout;
pub mod domain;
pub mod store;

pub use checkout::gateway::{Confirmation, PaymentError, PaymentGateway, SimulatedGateway};
pub use checkout::notify::{LogNotifier, NotificationSender, NotifyError, PaymentNotice};
pub use checkout::{
    CheckoutError, CheckoutOutcome, CheckoutState, CheckoutWorkflow, MerchantInfo, PaymentForm,
    PaymentMethod, TransferReference, ValidationError,
};
pub use domain::cart::{total_of, Cart, CartLine, Variant};
pub use domain::events::CartEvent;
pub use domain::value_objects::{format_vnd, normalize_price, PriceField};
pub use store::{CartRepository, CartStore, FileRepository, MemoryRepository, StorageError};
