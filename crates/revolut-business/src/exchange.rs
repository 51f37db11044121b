//! Exchange rates and currency exchange between the business's own accounts.

use chrono::{DateTime, Utc};
use revolut_core::{ApiContext, Call, Error};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::transfer::TransactionState;

/// Quote request for `GET /rate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub from: String,
    pub to: String,
    /// Amount of `from` currency to quote. Sent with two decimals.
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateAmount {
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub from: RateAmount,
    pub to: RateAmount,
    pub rate: Decimal,
    pub fee: RateAmount,
    pub rate_date: DateTime<Utc>,
}

/// One side of an exchange.
///
/// Set `amount` on exactly one side: on `from` to sell a fixed amount, on
/// `to` to buy one.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeLeg {
    pub account_id: String,
    pub currency: String,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub from: ExchangeLeg,
    pub to: ExchangeLeg,
    pub reference: String,
    pub request_id: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub id: String,
    pub state: TransactionState,
    pub reason_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// `/rate` and `/exchange`
#[derive(Debug, Clone)]
pub struct ExchangeService {
    api: ApiContext,
}

impl ExchangeService {
    pub(crate) fn new(api: ApiContext) -> Self {
        Self { api }
    }

    pub async fn rate(&self, request: &RateRequest) -> Result<Rate, Error> {
        let call = Call::get("GET /rate", &["rate"])
            .query("from", request.from.as_str())
            .query("to", request.to.as_str())
            .query("amount", format_amount(request.amount));
        self.api.send(call).await
    }

    pub async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeResult, Error> {
        let call = Call::post("POST /exchange", &["exchange"]).json(request)?;
        self.api.send(call).await
    }
}

/// Formats `amount` with exactly two decimals, rounding half away from zero.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
