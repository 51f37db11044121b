//! Accounts and their bank details.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
    pub balance: Decimal,
    pub currency: String,
    pub state: AccountState,
    /// Whether the account is visible to other businesses on Revolut.
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment scheme an account can receive through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentScheme {
    Chaps,
    Bacs,
    FasterPayments,
    Sepa,
    Swift,
    Ach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Hours,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedTime {
    pub unit: TimeUnit,
    pub min: u32,
    pub max: u32,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryAddress {
    pub street_line1: Option<String>,
    pub street_line2: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// One set of coordinates for paying into an account.
///
/// An account usually has several, e.g. local and SWIFT details.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub account_no: Option<String>,
    pub sort_code: Option<String>,
    pub routing_number: Option<String>,
    pub beneficiary: String,
    pub beneficiary_address: BeneficiaryAddress,
    pub bank_country: Option<String>,
    pub pooled: Option<bool>,
    pub unique_reference: Option<String>,
    pub schemes: Vec<PaymentScheme>,
    pub estimated_time: EstimatedTime,
}

/// `/accounts`
#[derive(Debug, Clone)]
pub struct AccountService {
    api: ApiContext,
}

impl AccountService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    /// Lists all accounts of the business.
    pub async fn list(&self) -> Result<Vec<Account>, Error> {
        self.api
            .send(Call::get("GET /accounts", &["accounts"]))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Account, Error> {
        self.api
            .send(Call::get("GET /accounts/{id}", &["accounts", id]))
            .await
    }

    pub async fn bank_details(&self, id: &str) -> Result<Vec<BankDetails>, Error> {
        self.api
            .send(Call::get(
                "GET /accounts/{id}/bank-details",
                &["accounts", id, "bank-details"],
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use revolut_core::Credential;
    use url::Url;

    fn service(transport: std::sync::Arc<RecordingTransport>) -> AccountService {
        let base = Url::parse("https://b2b.revolut.com/api/1.0/").unwrap();
        AccountService::new(ApiContext::new(
            transport,
            base,
            Credential::AccessToken("tok".into()),
        ))
    }

    #[tokio::test]
    async fn test_list_accounts() {
        let transport = RecordingTransport::ok(
            r#"[{
                "id": "2a0c9e2a-9b3e-4e3b-a4b4-6f3ff86b3c1a",
                "name": "Main",
                "balance": 1250.75,
                "currency": "GBP",
                "state": "active",
                "public": false,
                "created_at": "2017-06-01T11:11:11.0Z",
                "updated_at": "2017-06-01T11:11:11.0Z"
            }]"#,
        );
        let accounts = service(transport.clone()).list().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, Decimal::new(125075, 2));
        assert_eq!(accounts[0].state, AccountState::Active);
        assert_eq!(
            transport.requests()[0].url.as_str(),
            "https://b2b.revolut.com/api/1.0/accounts"
        );
    }

    #[tokio::test]
    async fn test_bank_details() {
        let transport = RecordingTransport::ok(
            r#"[{
                "iban": "GB75REVO00997001234567",
                "bic": "REVOGB21",
                "beneficiary": "Example Ltd",
                "beneficiary_address": {"street_line1": "1 Canada Square", "city": "London", "country": "GB", "postcode": "E14 5AB"},
                "bank_country": "GB",
                "pooled": false,
                "schemes": ["swift", "faster_payments"],
                "estimated_time": {"unit": "days", "min": 1, "max": 3}
            }]"#,
        );
        let details = service(transport.clone()).bank_details("acc-1").await.unwrap();
        assert_eq!(
            details[0].schemes,
            vec![PaymentScheme::Swift, PaymentScheme::FasterPayments]
        );
        assert_eq!(details[0].estimated_time.unit, TimeUnit::Days);
        assert_eq!(
            details[0].beneficiary_address.city.as_deref(),
            Some("London")
        );
        assert_eq!(
            transport.requests()[0].url.path(),
            "/api/1.0/accounts/acc-1/bank-details"
        );
    }

    #[tokio::test]
    async fn test_unknown_account_state_fails_decoding() {
        let transport = RecordingTransport::ok(
            r#"{"id":"a","balance":0,"currency":"GBP","state":"frozen","public":false,
                "created_at":"2017-06-01T11:11:11Z","updated_at":"2017-06-01T11:11:11Z"}"#,
        );
        let err = service(transport).get("a").await.unwrap_err();
        assert!(matches!(err, Error::Decode { context: "GET /accounts/{id}", .. }));
    }
}
