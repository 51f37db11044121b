//! Configuration values that may live in the environment.
//!
//! Credentials such as refresh tokens and API keys should not be written into
//! configuration files. A [`LiteralOrEnv`] field accepts either the value itself
//! or a reference to an environment variable:
//!
//! ```json
//! {
//!   "client_id": "pOoEBEmp8CwpBDgf3opC7aPnSe9OaSCC",
//!   "refresh_token": "$REVOLUT_REFRESH_TOKEN",
//!   "api_key": "${REVOLUT_MERCHANT_API_KEY}"
//! }
//! ```
//!
//! The reference is resolved once, at deserialization time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// A value given literally or as `$VAR` / `${VAR}`.
#[derive(Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T> {
    value: T,
    source: ValueSource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ValueSource {
    Literal,
    Env(String),
}

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self {
            value,
            source: ValueSource::Literal,
        }
    }

    pub fn inner(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// Name of the environment variable the value came from, if any.
    pub fn env_var(&self) -> Option<&str> {
        match &self.source {
            ValueSource::Literal => None,
            ValueSource::Env(name) => Some(name),
        }
    }

    /// Extracts `VAR` from `$VAR` or `${VAR}`.
    ///
    /// Names are restricted to ASCII alphanumerics and underscores so that
    /// literal values which merely start with `$` are left alone.
    fn env_var_name(s: &str) -> Option<&str> {
        let name = if let Some(braced) = s.strip_prefix("${") {
            braced.strip_suffix('}')?
        } else {
            s.strip_prefix('$')?
        };
        let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then_some(name)
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Never prints the value: literals are redacted, env-sourced values show the
/// variable name.
impl<T> fmt::Debug for LiteralOrEnv<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ValueSource::Literal => write!(f, "Literal(<redacted>)"),
            ValueSource::Env(name) => write!(f, "Env(${name})"),
        }
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let (text, source) = match Self::env_var_name(&raw) {
            Some(name) => {
                let value = std::env::var(name).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "Environment variable '{name}' not found (referenced as '{raw}')"
                    ))
                })?;
                (value, ValueSource::Env(name.to_string()))
            }
            None => (raw, ValueSource::Literal),
        };
        let value = text
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {e}")))?;
        Ok(Self { value, source })
    }
}

/// Env-sourced values serialize back to their `$VAR` reference, never the secret.
impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.source {
            ValueSource::Literal => self.value.serialize(serializer),
            ValueSource::Env(name) => serializer.serialize_str(&format!("${name}")),
        }
    }
}
