//! Transfers between accounts of the same business.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// State of a transfer, payment or exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Created,
    Pending,
    Completed,
    Declined,
    Failed,
    Reverted,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Caller-chosen idempotency key; resubmitting the same id does not
    /// create a second transfer.
    pub request_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub reference: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub state: TransactionState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// `/transfer`
#[derive(Debug, Clone)]
pub struct TransferService {
    api: ApiContext,
}

impl TransferService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &TransferRequest) -> Result<Transfer, Error> {
        let call = Call::post("POST /transfer", &["transfer"]).json(request)?;
        self.api.send(call).await
    }
}
