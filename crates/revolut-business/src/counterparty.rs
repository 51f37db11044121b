//! Counterparties: the people and businesses payments can be sent to.
//!
//! A counterparty is either another Revolut user, found by phone number or
//! email, or an external bank account described by its coordinates.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Business,
    Personal,
}

/// Adds another Revolut user as a counterparty.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevolutCounterpartyRequest {
    pub profile_type: ProfileType,
    pub name: Option<String>,
    /// Required for personal profiles.
    pub phone: Option<String>,
    /// Required for business profiles.
    pub email: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_line1: Option<String>,
    pub street_line2: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Adds an external bank account as a counterparty.
///
/// Set `company_name` for businesses and `individual_name` for people.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCounterpartyRequest {
    pub company_name: Option<String>,
    pub individual_name: Option<IndividualName>,
    pub bank_country: String,
    pub currency: String,
    pub account_no: Option<String>,
    pub sort_code: Option<String>,
    pub routing_number: Option<String>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyState {
    Created,
    Deleted,
}

/// Who pays the fees of an incoming transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientCharges {
    No,
    Expected,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAccount {
    pub id: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub account_no: Option<String>,
    pub iban: Option<String>,
    pub sort_code: Option<String>,
    pub routing_number: Option<String>,
    pub bic: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bank_country: Option<String>,
    pub recipient_charges: Option<RecipientCharges>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub profile_type: Option<ProfileType>,
    pub country: Option<String>,
    pub state: CounterpartyState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub accounts: Vec<CounterpartyAccount>,
}

/// `/counterparty` and `/counterparties`
#[derive(Debug, Clone)]
pub struct CounterpartyService {
    api: ApiContext,
}

impl CounterpartyService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn create_revolut(
        &self,
        request: &RevolutCounterpartyRequest,
    ) -> Result<Counterparty, Error> {
        let call = Call::post("POST /counterparty", &["counterparty"]).json(request)?;
        self.api.send(call).await
    }

    pub async fn create_external(
        &self,
        request: &ExternalCounterpartyRequest,
    ) -> Result<Counterparty, Error> {
        let call = Call::post("POST /counterparty", &["counterparty"]).json(request)?;
        self.api.send(call).await
    }

    pub async fn get(&self, id: &str) -> Result<Counterparty, Error> {
        self.api
            .send(Call::get("GET /counterparty/{id}", &["counterparty", id]))
            .await
    }

    /// Deletes a counterparty. The API answers `204 No Content`.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api
            .send_empty(Call::delete("DELETE /counterparty/{id}", &["counterparty", id]))
            .await
    }

    pub async fn list(&self) -> Result<Vec<Counterparty>, Error> {
        self.api
            .send(Call::get("GET /counterparties", &["counterparties"]))
            .await
    }
}
