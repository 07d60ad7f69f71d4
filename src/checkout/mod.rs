//! Checkout Workflow
//!
//! Drives one checkout attempt through
//! `Idle → MethodSelection → (FormInput)? → Validating → Processing →
//! Success | Failed`. Every failure here is a local validation failure;
//! once validation passes, the (simulated) payment always succeeds.

pub mod gateway;
pub mod notify;

use thiserror::Error;
use tracing::warn;

use crate::store::{CartRepository, CartStore};
use gateway::{Confirmation, PaymentError, PaymentGateway};
use notify::{NotificationSender, PaymentNotice};

/// Supported settlement paths for the online flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Wallet transfer completed out-of-band by scanning a QR reference.
    WalletQr,
    /// Redirect to an external gateway page.
    Redirect,
    /// Card details collected in-form.
    Card,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::WalletQr => "Wallet transfer",
            PaymentMethod::Redirect => "Payment gateway",
            PaymentMethod::Card => "Credit/debit card",
        }
    }
}

/// Checkout-scoped form state; validated at submit, never persisted.
#[derive(Clone, Debug, Default)]
pub struct PaymentForm {
    pub card_number: String,
    pub card_holder: String,
    pub expiry_date: String,
    pub cvv: String,
    pub notification_phone: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a payment method must be selected")]
    MissingPaymentMethod,
    #[error("a notification phone number is required")]
    MissingNotificationPhone,
    #[error("all card fields are required")]
    MissingCardFields,
    #[error("card number is invalid")]
    InvalidCardNumber,
}

/// Method-dependent validation of the submitted form, decoupled from any
/// presentation concern.
pub fn validate(method: Option<PaymentMethod>, form: &PaymentForm) -> Result<(), ValidationError> {
    let method = method.ok_or(ValidationError::MissingPaymentMethod)?;
    if form.notification_phone.is_empty() {
        return Err(ValidationError::MissingNotificationPhone);
    }
    if method == PaymentMethod::Card {
        if form.card_number.is_empty()
            || form.card_holder.is_empty()
            || form.expiry_date.is_empty()
            || form.cvv.is_empty()
        {
            return Err(ValidationError::MissingCardFields);
        }
        let stripped: String = form.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.chars().count() != 16 {
            return Err(ValidationError::InvalidCardNumber);
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Merchant-side settings for the online flow.
#[derive(Clone, Debug)]
pub struct MerchantInfo {
    pub wallet_phone: String,
    pub wallet_name: String,
    pub transfer_memo: String,
    pub notice_email: String,
}

impl Default for MerchantInfo {
    fn default() -> Self {
        Self {
            wallet_phone: "0123456789".into(),
            wallet_name: "STOREFRONT JSC".into(),
            transfer_memo: "Order payment".into(),
            notice_email: "orders@storefront.example".into(),
        }
    }
}

/// Static wallet-transfer details rendered for the QR step. The workflow
/// never verifies that the transfer actually happened.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferReference {
    pub recipient_phone: String,
    pub recipient_name: String,
    pub memo: String,
    pub amount: f64,
}

impl TransferReference {
    /// The pipe-delimited string encoded into the scannable QR code.
    pub fn qr_payload(&self) -> String {
        format!(
            "2|99|{}|{}|{}|0|0|{}",
            self.recipient_phone, self.recipient_name, self.memo, self.amount
        )
    }

    pub fn amount_display(&self) -> String {
        crate::domain::value_objects::format_vnd(self.amount)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutState {
    Idle,
    MethodSelection,
    FormInput,
    Validating,
    Processing,
    Success,
}

/// Result of a successful online submission. `notice_sent` is soft: a
/// failed notice never rolls back the checkout.
#[derive(Clone, Debug)]
pub struct CheckoutOutcome {
    pub confirmation: Confirmation,
    pub notice_sent: bool,
}

/// One checkout attempt over an injected gateway and notifier.
pub struct CheckoutWorkflow<G, N> {
    gateway: G,
    notifier: N,
    merchant: MerchantInfo,
    state: CheckoutState,
    method: Option<PaymentMethod>,
}

impl<G: PaymentGateway, N: NotificationSender> CheckoutWorkflow<G, N> {
    pub fn new(gateway: G, notifier: N) -> Self {
        Self {
            gateway,
            notifier,
            merchant: MerchantInfo::default(),
            state: CheckoutState::Idle,
            method: None,
        }
    }

    pub fn with_merchant(mut self, merchant: MerchantInfo) -> Self {
        self.merchant = merchant;
        self
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn selected_method(&self) -> Option<PaymentMethod> {
        self.method
    }

    /// Cash path: no payment details, no gateway call. Clears the cart and
    /// reports success immediately.
    pub async fn checkout_normal<R: CartRepository>(
        &mut self,
        store: &mut CartStore<R>,
    ) -> Result<Confirmation, CheckoutError> {
        if store.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let confirmation = Confirmation::new(store.cart().total(), "Cash");
        store.clear().await;
        self.state = CheckoutState::Success;
        Ok(confirmation)
    }

    /// Opens method selection for the online path.
    pub fn begin_online(&mut self) {
        self.state = CheckoutState::MethodSelection;
        self.method = None;
    }

    /// Card opens the form; the other methods only need the notification
    /// phone, collected on the selection screen.
    pub fn select_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
        self.state = match method {
            PaymentMethod::Card => CheckoutState::FormInput,
            _ => CheckoutState::MethodSelection,
        };
    }

    /// Wallet payment-reference payload for the current cart total.
    pub fn transfer_reference(&self, amount: f64) -> TransferReference {
        TransferReference {
            recipient_phone: self.merchant.wallet_phone.clone(),
            recipient_name: self.merchant.wallet_name.clone(),
            memo: self.merchant.transfer_memo.clone(),
            amount,
        }
    }

    /// Validates and processes the online payment. On a validation failure
    /// the cart and form are left untouched and the attempt returns to the
    /// selection/form step for retry.
    pub async fn submit<R: CartRepository>(
        &mut self,
        store: &mut CartStore<R>,
        form: &PaymentForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if store.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.state = CheckoutState::Validating;
        if let Err(err) = validate(self.method, form) {
            self.state = match self.method {
                Some(PaymentMethod::Card) => CheckoutState::FormInput,
                _ => CheckoutState::MethodSelection,
            };
            return Err(err.into());
        }
        let method = self.method.ok_or(ValidationError::MissingPaymentMethod)?;

        self.state = CheckoutState::Processing;
        let amount = store.cart().total();
        let confirmation = match self.gateway.charge(amount, method).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                self.state = match method {
                    PaymentMethod::Card => CheckoutState::FormInput,
                    _ => CheckoutState::MethodSelection,
                };
                return Err(err.into());
            }
        };

        let notice = PaymentNotice::for_confirmation(
            &self.merchant.notice_email,
            &confirmation,
            &form.notification_phone,
        );
        let notice_sent = match self.notifier.send(&notice).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "payment notice delivery failed");
                false
            }
        };

        store.clear().await;
        self.state = CheckoutState::Success;
        Ok(CheckoutOutcome { confirmation, notice_sent })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::gateway::SimulatedGateway;
    use super::notify::{LogNotifier, NotifyError};
    use super::*;
    use crate::domain::cart::{CartLine, Variant};
    use crate::domain::value_objects::PriceField;
    use crate::store::MemoryRepository;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new(Duration::from_millis(1))
    }

    async fn store_with_items() -> CartStore<MemoryRepository> {
        let mut store = CartStore::open(MemoryRepository::new()).await;
        store
            .add_item(CartLine {
                id: "7".into(),
                title: "Air Runner".into(),
                price: Some(PriceField::Number(2_929_000.0)),
                image: String::new(),
                quantity: 1,
                variant: Variant::color("black"),
            })
            .await;
        store
    }

    fn card_form(number: &str) -> PaymentForm {
        PaymentForm {
            card_number: number.into(),
            card_holder: "TRAN VAN B".into(),
            expiry_date: "12/27".into(),
            cvv: "123".into(),
            notification_phone: "0900000001".into(),
        }
    }

    struct FailingNotifier;

    impl NotificationSender for FailingNotifier {
        async fn send(&self, _notice: &PaymentNotice) -> Result<(), NotifyError> {
            Err(NotifyError::Endpoint("503".into()))
        }
    }

    #[test]
    fn test_validate_requires_method_then_phone() {
        let form = PaymentForm::default();
        assert_eq!(validate(None, &form), Err(ValidationError::MissingPaymentMethod));
        assert_eq!(
            validate(Some(PaymentMethod::WalletQr), &form),
            Err(ValidationError::MissingNotificationPhone)
        );
    }

    #[test]
    fn test_validate_wallet_needs_only_phone() {
        let form = PaymentForm { notification_phone: "0900000001".into(), ..Default::default() };
        assert_eq!(validate(Some(PaymentMethod::WalletQr), &form), Ok(()));
        assert_eq!(validate(Some(PaymentMethod::Redirect), &form), Ok(()));
    }

    #[test]
    fn test_validate_card_fields() {
        let mut form = card_form("4111 1111 1111 1111");
        assert_eq!(validate(Some(PaymentMethod::Card), &form), Ok(()));

        form.cvv.clear();
        assert_eq!(
            validate(Some(PaymentMethod::Card), &form),
            Err(ValidationError::MissingCardFields)
        );

        let short = card_form("4111 1111 1111 111");
        assert_eq!(
            validate(Some(PaymentMethod::Card), &short),
            Err(ValidationError::InvalidCardNumber)
        );
    }

    #[tokio::test]
    async fn test_normal_checkout_clears_cart() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        let confirmation = workflow.checkout_normal(&mut store).await.unwrap();
        assert_eq!(confirmation.method_label, "Cash");
        assert_eq!(confirmation.amount, 2_929_000.0);
        assert!(store.cart().is_empty());
        assert_eq!(store.cart().total(), 0.0);
        assert_eq!(workflow.state(), &CheckoutState::Success);
    }

    #[tokio::test]
    async fn test_checkout_rejects_empty_cart() {
        let mut store = CartStore::open(MemoryRepository::new()).await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        assert!(matches!(
            workflow.checkout_normal(&mut store).await,
            Err(CheckoutError::EmptyCart)
        ));
        assert!(matches!(
            workflow.submit(&mut store, &card_form("4111111111111111")).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_invalid_card_keeps_cart_and_returns_to_form() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        workflow.begin_online();
        workflow.select_method(PaymentMethod::Card);

        let result = workflow.submit(&mut store, &card_form("4111 1111 1111 111")).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidCardNumber))
        ));
        assert_eq!(store.cart().line_count(), 1);
        assert_eq!(store.cart().total(), 2_929_000.0);
        assert_eq!(workflow.state(), &CheckoutState::FormInput);
    }

    #[tokio::test]
    async fn test_missing_method_returns_to_selection() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        workflow.begin_online();

        let result = workflow.submit(&mut store, &card_form("4111111111111111")).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::MissingPaymentMethod))
        ));
        assert_eq!(workflow.state(), &CheckoutState::MethodSelection);
    }

    #[tokio::test]
    async fn test_card_checkout_succeeds_and_clears_cart() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        workflow.begin_online();
        workflow.select_method(PaymentMethod::Card);
        assert_eq!(workflow.state(), &CheckoutState::FormInput);

        let outcome = workflow
            .submit(&mut store, &card_form("4111 1111 1111 1111"))
            .await
            .unwrap();
        assert!(outcome.notice_sent);
        assert_eq!(outcome.confirmation.method_label, "Credit/debit card");
        assert_eq!(outcome.confirmation.amount, 2_929_000.0);
        assert!(store.cart().is_empty());
        assert_eq!(workflow.state(), &CheckoutState::Success);
    }

    #[tokio::test]
    async fn test_wallet_checkout_with_phone_only() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        workflow.begin_online();
        workflow.select_method(PaymentMethod::WalletQr);

        let form = PaymentForm { notification_phone: "0900000001".into(), ..Default::default() };
        let outcome = workflow.submit(&mut store, &form).await.unwrap();
        assert_eq!(outcome.confirmation.method_label, "Wallet transfer");
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_notice_failure_is_soft() {
        let mut store = store_with_items().await;
        let mut workflow = CheckoutWorkflow::new(gateway(), FailingNotifier);
        workflow.begin_online();
        workflow.select_method(PaymentMethod::Redirect);

        let form = PaymentForm { notification_phone: "0900000001".into(), ..Default::default() };
        let outcome = workflow.submit(&mut store, &form).await.unwrap();
        assert!(!outcome.notice_sent);
        assert!(store.cart().is_empty());
        assert_eq!(workflow.state(), &CheckoutState::Success);
    }

    #[test]
    fn test_transfer_reference_qr_payload() {
        let workflow = CheckoutWorkflow::new(gateway(), LogNotifier);
        let reference = workflow.transfer_reference(3_429_000.0);
        assert_eq!(
            reference.qr_payload(),
            "2|99|0123456789|STOREFRONT JSC|Order payment|0|0|3429000"
        );
        assert_eq!(reference.amount_display(), "3.429.000 ₫");
    }
}
