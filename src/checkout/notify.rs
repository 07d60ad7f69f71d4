//! Best-effort payment notifications.
//!
//! Delivery failure never rolls back a checkout; the workflow logs it and
//! carries on.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::gateway::Confirmation;

/// Email-shaped notification body, matching the `POST /send-email`
/// contract of the storefront API.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentNotice {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl PaymentNotice {
    pub fn for_confirmation(to: &str, confirmation: &Confirmation, notify_phone: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Payment notification".to_string(),
            text: format!("{}\nNotify: {}", confirmation.message(), notify_phone),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification endpoint failed: {0}")]
    Endpoint(String),
}

/// Delivery seam for the confirmation notice. An HTTP client posting to
/// the storefront's `/send-email` endpoint is one implementation.
#[allow(async_fn_in_trait)]
pub trait NotificationSender {
    async fn send(&self, notice: &PaymentNotice) -> Result<(), NotifyError>;
}

/// Simulated delivery: logs the rendered notice instead of calling out.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSender for LogNotifier {
    async fn send(&self, notice: &PaymentNotice) -> Result<(), NotifyError> {
        info!(to = %notice.to, subject = %notice.subject, text = %notice.text, "payment notice");
        Ok(())
    }
}
