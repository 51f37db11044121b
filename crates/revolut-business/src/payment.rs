//! Payments to counterparties and the transaction history.

use chrono::{DateTime, NaiveDate, Utc};
use revolut_core::{ApiContext, Call, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::transfer::TransactionState;

/// Where a payment goes.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub counterparty_id: String,
    /// Required when the counterparty has more than one account.
    pub account_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub request_id: String,
    pub account_id: String,
    pub receiver: Receiver,
    pub amount: Decimal,
    pub currency: String,
    pub reference: Option<String>,
    /// Future date on which to execute the payment.
    pub schedule_for: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Atm,
    CardPayment,
    CardRefund,
    CardChargeback,
    CardCredit,
    Exchange,
    Transfer,
    Loan,
    Fee,
    Refund,
    Topup,
    TopupReturn,
    Tax,
    TaxRefund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Atm => "atm",
            TransactionType::CardPayment => "card_payment",
            TransactionType::CardRefund => "card_refund",
            TransactionType::CardChargeback => "card_chargeback",
            TransactionType::CardCredit => "card_credit",
            TransactionType::Exchange => "exchange",
            TransactionType::Transfer => "transfer",
            TransactionType::Loan => "loan",
            TransactionType::Fee => "fee",
            TransactionType::Refund => "refund",
            TransactionType::Topup => "topup",
            TransactionType::TopupReturn => "topup_return",
            TransactionType::Tax => "tax",
            TransactionType::TaxRefund => "tax_refund",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegCounterparty {
    #[serde(rename = "type")]
    pub kind: String,
    pub account_id: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLeg {
    pub leg_id: String,
    pub account_id: String,
    pub counterparty: Option<LegCounterparty>,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    /// Account balance after the leg settled.
    pub balance: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    pub city: String,
    pub category_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub card_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub request_id: Option<String>,
    pub state: TransactionState,
    pub reason_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_for: Option<NaiveDate>,
    pub related_transaction_id: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub legs: Vec<TransactionLeg>,
    pub merchant: Option<Merchant>,
    pub card: Option<Card>,
}

/// Filters for [`PaymentService::list`]. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub counterparty: Option<String>,
    /// Maximum number of transactions to return.
    pub count: Option<u32>,
    pub kind: Option<TransactionType>,
}

/// `/pay`, `/transaction` and `/transactions`
#[derive(Debug, Clone)]
pub struct PaymentService {
    api: ApiContext,
}

impl PaymentService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &PaymentRequest) -> Result<Transaction, Error> {
        let call = Call::post("POST /pay", &["pay"]).json(request)?;
        self.api.send(call).await
    }

    pub async fn get(&self, id: &str) -> Result<Transaction, Error> {
        self.api
            .send(Call::get("GET /transaction/{id}", &["transaction", id]))
            .await
    }

    /// Looks a transaction up by the `request_id` it was created with.
    pub async fn get_by_request_id(&self, request_id: &str) -> Result<Transaction, Error> {
        let call = Call::get("GET /transaction/{id}?id_type=request_id", &[
            "transaction",
            request_id,
        ])
        .query("id_type", "request_id");
        self.api.send(call).await
    }

    /// Cancels a scheduled payment. The API answers `204 No Content`.
    pub async fn cancel(&self, id: &str) -> Result<(), Error> {
        self.api
            .send_empty(Call::delete("DELETE /transaction/{id}", &["transaction", id]))
            .await
    }

    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, Error> {
        let call = Call::get("GET /transactions", &["transactions"])
            .query_opt("from", filter.from.map(|d| d.to_string()))
            .query_opt("to", filter.to.map(|d| d.to_string()))
            .query_opt("counterparty", filter.counterparty.as_deref())
            .query_opt("count", filter.count.map(|c| c.to_string()))
            .query_opt("type", filter.kind.map(|k| k.as_str()));
        self.api.send(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use http::{Method, StatusCode};
    use revolut_core::{Credential, RawResponse};
    use std::sync::Arc;

    const TRANSACTION: &str = r#"{
        "id": "62b61a4f-fb09-4e12-b5a0-6dc2d6f1d0f9",
        "type": "transfer",
        "request_id": "e0cbf84637264ee082a848b",
        "state": "pending",
        "created_at": "2017-06-01T11:11:11.0Z",
        "updated_at": "2017-06-01T11:11:11.0Z",
        "reference": "To John Doe",
        "legs": [{
            "leg_id": "80b39b8a-5ee6-4e53-8c4c-1b2b1e2bb2d1",
            "account_id": "acc-gbp",
            "counterparty": {"type": "revolut", "account_id": "cp-acc-1"},
            "amount": -123.11,
            "currency": "GBP",
            "description": "Payment for Blows & Wigs"
        }]
    }"#;

    fn service(transport: Arc<RecordingTransport>) -> PaymentService {
        let base = url::Url::parse("https://b2b.revolut.com/api/1.0/").unwrap();
        PaymentService::new(ApiContext::new(
            transport,
            base,
            Credential::AccessToken("tok".into()),
        ))
    }

    #[tokio::test]
    async fn test_create_payment() {
        let transport = RecordingTransport::ok(TRANSACTION);
        let payment = service(transport.clone())
            .create(&PaymentRequest {
                request_id: "e0cbf84637264ee082a848b".into(),
                account_id: "acc-gbp".into(),
                receiver: Receiver {
                    counterparty_id: "cp-1".into(),
                    account_id: Some("cp-acc-1".into()),
                },
                amount: Decimal::new(12311, 2),
                currency: "GBP".into(),
                reference: Some("To John Doe".into()),
                schedule_for: None,
            })
            .await
            .unwrap();
        assert_eq!(payment.kind, TransactionType::Transfer);
        assert_eq!(payment.state, TransactionState::Pending);
        assert_eq!(payment.legs[0].amount, Decimal::new(-12311, 2));
        assert_eq!(transport.requests()[0].url.path(), "/api/1.0/pay");
    }

    #[tokio::test]
    async fn test_get_by_request_id_adds_id_type() {
        let transport = RecordingTransport::ok(TRANSACTION);
        service(transport.clone())
            .get_by_request_id("e0cbf84637264ee082a848b")
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].url.as_str(),
            "https://b2b.revolut.com/api/1.0/transaction/e0cbf84637264ee082a848b?id_type=request_id"
        );
    }

    #[tokio::test]
    async fn test_cancel_accepts_empty_no_content() {
        let transport = RecordingTransport::new(|_| Ok(RawResponse::new(StatusCode::NO_CONTENT, "")));
        service(transport.clone()).cancel("tx-1").await.unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url.path(), "/api/1.0/transaction/tx-1");
    }

    #[tokio::test]
    async fn test_list_sends_only_set_filters() {
        let transport = RecordingTransport::ok("[]");
        let payments = service(transport.clone());

        payments.list(&TransactionFilter::default()).await.unwrap();
        let filter = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            counterparty: Some(String::new()),
            count: Some(50),
            kind: Some(TransactionType::CardPayment),
            ..Default::default()
        };
        payments.list(&filter).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://b2b.revolut.com/api/1.0/transactions"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "https://b2b.revolut.com/api/1.0/transactions?from=2024-01-01&count=50&type=card_payment"
        );
    }

    #[test]
    fn test_transaction_type_parses_wire_names() {
        assert_eq!(
            "topup_return".parse::<TransactionType>().unwrap(),
            TransactionType::TopupReturn
        );
        assert!("wire".parse::<TransactionType>().is_err());
        assert_eq!(TransactionType::TaxRefund.to_string(), "tax_refund");
    }
}
