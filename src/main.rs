//! Storefront Cart - demo walkthrough of the cart and checkout engine.

use anyhow::Result;
use storefront_cart::{
    format_vnd, CartLine, CartStore, CheckoutWorkflow, FileRepository, LogNotifier, PaymentForm,
    PaymentMethod, PriceField, SimulatedGateway, Variant,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("CART_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let mut store = CartStore::open(FileRepository::new(&data_dir)).await;
    tracing::info!(lines = store.cart().line_count(), %data_dir, "cart loaded");

    store
        .add_item(CartLine {
            id: "7".into(),
            title: "Air Runner".into(),
            price: Some(PriceField::Number(2_929_000.0)),
            image: "https://img.example/air-runner.jpg".into(),
            quantity: 1,
            variant: Variant { color: "black".into(), storage: Some("42".into()) },
        })
        .await;
    store
        .add_item(CartLine {
            id: "12".into(),
            title: "Canvas Low".into(),
            price: Some(PriceField::Number(250_000.0)),
            image: "https://img.example/canvas-low.jpg".into(),
            quantity: 2,
            variant: Variant::color("white"),
        })
        .await;
    tracing::info!(total = %format_vnd(store.cart().total()), "cart total");

    let mut workflow = CheckoutWorkflow::new(SimulatedGateway::default(), LogNotifier);
    workflow.begin_online();
    workflow.select_method(PaymentMethod::Card);
    let form = PaymentForm {
        card_number: "4111 1111 1111 1111".into(),
        card_holder: "TRAN VAN B".into(),
        expiry_date: "12/27".into(),
        cvv: "123".into(),
        notification_phone: "0900000001".into(),
    };
    let outcome = workflow.submit(&mut store, &form).await?;
    tracing::info!(notice_sent = outcome.notice_sent, "{}", outcome.confirmation.message());
    tracing::info!(lines = store.cart().line_count(), "cart after checkout");
    Ok(())
}
