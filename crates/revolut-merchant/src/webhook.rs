//! Merchant webhook registration.

use revolut_core::{ApiContext, Call, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookUrl {
    pub url: String,
}

/// Body Revolut posts to a merchant webhook when an order completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
    pub order_id: String,
}

/// `/webhooks`
#[derive(Debug, Clone)]
pub struct WebhookService {
    api: ApiContext,
}

impl WebhookService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn set(&self, webhook: &WebhookUrl) -> Result<(), Error> {
        let call = Call::post("POST /webhooks", &["webhooks"])
            .expect(http::StatusCode::NO_CONTENT)
            .json(webhook)?;
        self.api.send_empty(call).await
    }

    pub async fn list(&self) -> Result<Vec<WebhookUrl>, Error> {
        self.api
            .send(Call::get("GET /webhooks", &["webhooks"]))
            .await
    }
}
