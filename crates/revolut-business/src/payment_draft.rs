//! Payment drafts: batches of payments that wait for approval in the web app.

use chrono::{DateTime, NaiveDate, Utc};
use revolut_core::{ApiContext, Call, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::exchange::RateAmount;
use crate::payment::Receiver;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPayment {
    pub account_id: String,
    pub receiver: Receiver,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraftRequest {
    pub title: Option<String>,
    pub schedule_for: Option<NaiveDate>,
    pub payments: Vec<DraftPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraftCreated {
    pub id: String,
}

/// Summary of a draft in [`PaymentDrafts`].
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub scheduled_for: Option<NaiveDate>,
    pub title: Option<String>,
    pub payments_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDrafts {
    pub payment_orders: Vec<PaymentOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftPaymentState {
    Created,
    Pending,
    Completed,
    Reverted,
    Declined,
    Cancelled,
    Failed,
    Deleted,
}

/// Exchange applied to a draft payment in a different currency than its account.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeOptions {
    pub from: Option<RateAmount>,
    pub to: Option<RateAmount>,
    pub rate: Option<Decimal>,
    pub fee: Option<RateAmount>,
    pub rate_date: Option<DateTime<Utc>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPaymentDetail {
    pub id: String,
    pub amount: RateAmount,
    pub account_id: String,
    pub receiver: Receiver,
    pub state: DraftPaymentState,
    pub reference: Option<String>,
    pub reason: Option<String>,
    pub error_message: Option<String>,
    pub current_charge_options: Option<ChargeOptions>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub scheduled_for: Option<NaiveDate>,
    pub title: Option<String>,
    pub payments: Vec<DraftPaymentDetail>,
}

/// `/payment-drafts`
#[derive(Debug, Clone)]
pub struct PaymentDraftService {
    api: ApiContext,
}

impl PaymentDraftService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &PaymentDraftRequest) -> Result<PaymentDraftCreated, Error> {
        let call = Call::post("POST /payment-drafts", &["payment-drafts"]).json(request)?;
        self.api.send(call).await
    }

    pub async fn list(&self) -> Result<PaymentDrafts, Error> {
        self.api
            .send(Call::get("GET /payment-drafts", &["payment-drafts"]))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<PaymentDraft, Error> {
        self.api
            .send(Call::get("GET /payment-drafts/{id}", &["payment-drafts", id]))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api
            .send_empty(Call::delete("DELETE /payment-drafts/{id}", &[
                "payment-drafts",
                id,
            ]))
            .await
    }
}
