//! Orders: create, inspect, capture, cancel and refund card payments.
//!
//! Amounts are integer minor units (pence, cents). Dates are milliseconds since
//! the Unix epoch on the wire and [`DateTime<Utc>`] here.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Payment,
    Refund,
    Chargeback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,
    Processing,
    Authorised,
    Completed,
    Cancelled,
    Failed,
}

/// Whether an authorised payment is captured automatically or waits for
/// [`OrderService::capture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureMode {
    Manual,
    #[default]
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Minor currency units.
    pub value: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeType {
    Fx,
    Acquiring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub value: i64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: FeeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    Visa,
    Mastercard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Funding {
    Credit,
    Debit,
    Prepaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreeDsState {
    Verified,
    Failed,
    Challenge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeDs {
    pub state: ThreeDsState,
    pub version: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CvvVerification {
    Match,
    NotMatch,
    Incorrect,
    NotProcessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckResult {
    Match,
    NotMatch,
    #[serde(rename = "N_A")]
    NotApplicable,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    High,
}

/// Fraud and verification checks run on a card payment.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checks {
    pub proxy: Option<bool>,
    pub vpn: Option<bool>,
    pub country_by_ip: Option<String>,
    pub three_ds: Option<ThreeDs>,
    pub authorization_code: Option<String>,
    pub cvv_verification: Option<CvvVerification>,
    pub address: Option<CheckResult>,
    pub postal_code: Option<CheckResult>,
    pub card_holder: Option<CheckResult>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_line_1: Option<String>,
    pub street_line_2: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub postcode: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub card_type: Option<CardType>,
    pub funding: Option<Funding>,
    pub card_bin: Option<String>,
    pub card_last_four: Option<String>,
    /// `MM/YY`
    pub card_expiry: Option<String>,
    pub cardholder_name: Option<String>,
    pub checks: Option<Checks>,
    pub risk_level: Option<RiskLevel>,
    pub billing_address: Option<Address>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayment {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Amount,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub completed_date: Option<DateTime<Utc>>,
    pub card: Option<Card>,
}

/// A payment attempt or a refund/chargeback linked to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedOrder {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OrderType,
    pub amount: Amount,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Identifier for the hosted checkout page and the web widget.
    pub public_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: OrderType,
    pub state: OrderState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub completed_date: Option<DateTime<Utc>>,
    pub order_amount: Amount,
    pub settled_amount: Option<Amount>,
    pub refunded_amount: Option<Amount>,
    pub merchant_order_ext_ref: Option<String>,
    pub merchant_customer_ext_ref: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub fees: Vec<Fee>,
    #[serde(default)]
    pub payments: Vec<OrderPayment>,
    #[serde(default)]
    pub attempts: Vec<RelatedOrder>,
    #[serde(default)]
    pub related: Vec<RelatedOrder>,
    pub shipping_address: Option<Address>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub capture_mode: Option<CaptureMode>,
    pub merchant_order_id: Option<String>,
    pub customer_email: Option<String>,
    pub description: Option<String>,
    pub settlement_currency: Option<String>,
    pub merchant_customer_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Minor currency units; at most the amount not yet refunded.
    pub amount: i64,
    pub currency: String,
    pub merchant_order_id: Option<String>,
    pub description: Option<String>,
}

/// The refund order created by [`OrderService::refund`].
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OrderType,
    pub state: OrderState,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub completed_date: Option<DateTime<Utc>>,
    pub order_amount: Amount,
    pub merchant_customer_ext_ref: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub related: Vec<RelatedOrder>,
}

/// `/orders`
#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiContext,
}

impl OrderService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &OrderRequest) -> Result<Order, Error> {
        let call = Call::post("POST /orders", &["orders"]).json(request)?;
        self.api.send(call).await
    }

    pub async fn get(&self, id: &str) -> Result<Order, Error> {
        self.api
            .send(Call::get("GET /orders/{id}", &["orders", id]))
            .await
    }

    /// Captures an order created with [`CaptureMode::Manual`].
    pub async fn capture(&self, id: &str) -> Result<Order, Error> {
        self.api
            .send(Call::post("POST /orders/{id}/capture", &[
                "orders", id, "capture",
            ]))
            .await
    }

    /// Cancels an order that has not been captured yet.
    pub async fn cancel(&self, id: &str) -> Result<Order, Error> {
        self.api
            .send(Call::post("POST /orders/{id}/cancel", &[
                "orders", id, "cancel",
            ]))
            .await
    }

    pub async fn refund(&self, id: &str, request: &RefundRequest) -> Result<Refund, Error> {
        let call =
            Call::post("POST /orders/{id}/refund", &["orders", id, "refund"]).json(request)?;
        self.api.send(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use revolut_core::Environment;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn order_json(state: &str) -> serde_json::Value {
        json!({
            "id": "6516e61c-d279-a454-a837-bc52ce55ed49",
            "public_id": "0adc0e3c-ab44-4f33-bcc0-534ded7354ce",
            "type": "PAYMENT",
            "state": state,
            "created_date": 1_581_937_211_000_i64,
            "updated_date": 1_581_937_211_000_i64,
            "order_amount": {"value": 1000, "currency": "GBP"},
            "merchant_order_ext_ref": "order-42",
            "email": "customer@example.com",
            "payments": [{
                "type": "CARD",
                "amount": {"value": 1000, "currency": "GBP"},
                "created_date": 1_581_937_211_000_i64,
                "card": {
                    "card_type": "VISA",
                    "funding": "DEBIT",
                    "card_bin": "459678",
                    "card_last_four": "1234",
                    "card_expiry": "12/29",
                    "checks": {
                        "three_ds": {"state": "VERIFIED", "version": 2},
                        "cvv_verification": "MATCH",
                        "address": "N_A"
                    },
                    "risk_level": "LOW"
                }
            }]
        })
    }

    async fn client(server: &MockServer) -> Client {
        let base = url::Url::parse(&format!("{}/api/1.0/", server.uri())).unwrap();
        Client::builder("sk_test_key")
            .with_environment(Environment::Sandbox)
            .with_base_url(base)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_uses_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/1.0/orders"))
            .and(header("authorization", "Bearer sk_test_key"))
            .and(body_json(json!({
                "amount": 1000,
                "currency": "GBP",
                "capture_mode": "MANUAL",
                "merchant_order_id": "order-42"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_json("PENDING")))
            .expect(1)
            .mount(&server)
            .await;

        let order = client(&server)
            .await
            .orders()
            .create(&OrderRequest {
                amount: 1000,
                currency: "GBP".into(),
                capture_mode: Some(CaptureMode::Manual),
                merchant_order_id: Some("order-42".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(order.state, OrderState::Pending);
        assert_eq!(order.order_amount.value, 1000);
        assert_eq!(order.created_date.timestamp_millis(), 1_581_937_211_000);
        let card = order.payments[0].card.as_ref().unwrap();
        assert_eq!(card.card_type, Some(CardType::Visa));
        let checks = card.checks.as_ref().unwrap();
        assert_eq!(checks.address, Some(CheckResult::NotApplicable));
        assert_eq!(checks.three_ds.as_ref().unwrap().state, ThreeDsState::Verified);
    }

    #[tokio::test]
    async fn test_capture_and_cancel_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/1.0/orders/ord-1/capture"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_json("COMPLETED")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/1.0/orders/ord-2/cancel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_json("CANCELLED")))
            .expect(1)
            .mount(&server)
            .await;

        let orders = client(&server).await.orders();
        assert_eq!(orders.capture("ord-1").await.unwrap().state, OrderState::Completed);
        assert_eq!(orders.cancel("ord-2").await.unwrap().state, OrderState::Cancelled);
    }

    #[tokio::test]
    async fn test_refund() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/1.0/orders/ord-1/refund"))
            .and(body_json(json!({"amount": 500, "currency": "GBP", "description": "Damaged"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ref-1",
                "type": "REFUND",
                "state": "COMPLETED",
                "created_date": 1_581_937_311_000_i64,
                "order_amount": {"value": 500, "currency": "GBP"},
                "related": [{"id": "ord-1", "type": "PAYMENT", "amount": {"value": 1000, "currency": "GBP"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refund = client(&server)
            .await
            .orders()
            .refund("ord-1", &RefundRequest {
                amount: 500,
                currency: "GBP".into(),
                description: Some("Damaged".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(refund.kind, OrderType::Refund);
        assert_eq!(refund.related[0].kind, OrderType::Payment);
    }

    #[tokio::test]
    async fn test_missing_order_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1.0/orders/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"code":1018,"message":"Order not found"}"#))
            .mount(&server)
            .await;

        let err = client(&server).await.orders().get("missing").await.unwrap_err();
        match err {
            Error::Api { context, status, body } => {
                assert_eq!(context, "GET /orders/{id}");
                assert_eq!(status, http::StatusCode::NOT_FOUND);
                assert!(body.contains("Order not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
