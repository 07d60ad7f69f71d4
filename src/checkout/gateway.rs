//! Payment gateway seam and the simulated implementation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tokio::time;

use super::PaymentMethod;
use crate::domain::value_objects::format_vnd;

/// Client-side record of a completed charge. The transaction code is
/// cosmetic, not a gateway reference.
#[derive(Clone, Debug)]
pub struct Confirmation {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub amount_display: String,
    pub method_label: String,
    pub transaction_code: String,
}

impl Confirmation {
    pub fn new(amount: f64, method_label: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            amount,
            amount_display: format_vnd(amount),
            method_label: method_label.to_string(),
            transaction_code: transaction_code(),
        }
    }

    /// Multi-line receipt shown to the customer and carried in the
    /// confirmation notice.
    pub fn message(&self) -> String {
        format!(
            "PAYMENT SUCCESSFUL\nTime: {}\nAmount: {}\nMethod: {}\nTransaction: {}",
            self.timestamp.format("%d/%m/%Y %H:%M:%S"),
            self.amount_display,
            self.method_label,
            self.transaction_code,
        )
    }
}

fn transaction_code() -> String {
    let mut rng = rand::thread_rng();
    (0..10)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            CHARSET[rng.gen_range(0..CHARSET.len())] as char
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// The settlement capability the workflow charges against. The simulation
/// below is one implementation; a real integration is another.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn charge(&self, amount: f64, method: PaymentMethod)
        -> Result<Confirmation, PaymentError>;
}

/// Stands in for a real gateway: waits a fixed delay, then always succeeds.
#[derive(Clone, Debug)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        amount: f64,
        method: PaymentMethod,
    ) -> Result<Confirmation, PaymentError> {
        time::sleep(self.delay).await;
        Ok(Confirmation::new(amount, method.label()))
    }
}
