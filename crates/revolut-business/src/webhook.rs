//! Business webhook registration and the events Revolut posts to it.
//!
//! Event payloads are provided for decoding incoming webhook requests; this
//! crate does not verify their origin.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::payment::{TransactionLeg, TransactionType};
use crate::transfer::TransactionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookUrl {
    pub url: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreated {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub request_id: Option<String>,
    pub state: TransactionState,
    pub reason_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_for: Option<chrono::NaiveDate>,
    pub reference: Option<String>,
    #[serde(default)]
    pub legs: Vec<TransactionLeg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStateChanged {
    pub id: String,
    pub old_state: TransactionState,
    pub new_state: TransactionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreatedEvent {
    pub timestamp: DateTime<Utc>,
    pub data: TransactionCreated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStateChangedEvent {
    pub timestamp: DateTime<Utc>,
    pub data: TransactionStateChanged,
}

/// Body of a business webhook request, tagged by its `event` field.
///
/// ```
/// use revolut_business::webhook::WebhookEvent;
///
/// let body = r#"{
///     "event": "TransactionStateChanged",
///     "timestamp": "2024-03-01T10:00:00Z",
///     "data": {"id": "tx-1", "old_state": "pending", "new_state": "completed"}
/// }"#;
/// let event: WebhookEvent = serde_json::from_str(body).unwrap();
/// assert!(matches!(event, WebhookEvent::TransactionStateChanged(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum WebhookEvent {
    TransactionCreated(TransactionCreatedEvent),
    TransactionStateChanged(TransactionStateChangedEvent),
}

/// `/webhook`
#[derive(Debug, Clone)]
pub struct WebhookService {
    api: ApiContext,
}

impl WebhookService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    /// Registers `url` as the business webhook, replacing any previous one.
    pub async fn set(&self, url: &str) -> Result<(), Error> {
        let call = Call::post("POST /webhook", &["webhook"])
            .expect(http::StatusCode::NO_CONTENT)
            .json(&WebhookUrl {
                url: url.to_string(),
            })?;
        self.api.send_empty(call).await
    }

    pub async fn delete(&self) -> Result<(), Error> {
        self.api
            .send_empty(Call::delete("DELETE /webhook", &["webhook"]))
            .await
    }
}
