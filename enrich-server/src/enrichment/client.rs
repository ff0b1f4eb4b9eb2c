//! HTTP enrichment against agify / genderize / nationalize style providers
//!
//! Each provider takes `?name=<name>` and answers with a JSON object:
//! - age: `{"age": 42}`
//! - gender: `{"gender": "female"}`
//! - nationality: `{"country": [{"country_id": "UA", ...}, ...]}` (first entry wins)
//!
//! No retries, no caching, no timeout beyond the transport default.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn, Instrument, Span};

use super::{Attributes, Enrichment};

const USER_AGENT: &str = concat!("enrich-server/", env!("CARGO_PKG_VERSION"));

/// Provider base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub age_url: String,
    pub gender_url: String,
    pub nationality_url: String,
}

/// Why a single lookup produced no data
#[derive(Debug, Error)]
pub(crate) enum ProviderError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("response missing '{0}'")]
    MissingField(&'static str),
}

type Extract<T> = fn(&Value) -> Result<T, ProviderError>;

/// Enricher calling the three providers over HTTP
pub struct HttpEnricher {
    client: Client,
    endpoints: ProviderEndpoints,
    span: Span,
}

impl HttpEnricher {
    /// Create an enricher; lookups run inside `span`
    pub fn new(endpoints: ProviderEndpoints, span: Span) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            endpoints,
            span,
        })
    }

    async fn fetch(&self, url: &str, name: &str) -> Result<Value, ProviderError> {
        let response = self.client.get(url).query(&[("name", name)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn lookup<T: Default>(
        &self,
        provider: &'static str,
        url: &str,
        name: &str,
        extract: Extract<T>,
    ) -> T {
        let result = match self.fetch(url, name).await {
            Ok(body) => extract(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => {
                debug!(provider, "Lookup succeeded");
                value
            }
            Err(e) => {
                warn!(provider, person = name, error = %e, "Lookup failed, attribute left empty");
                T::default()
            }
        }
    }
}

#[async_trait]
impl Enrichment for HttpEnricher {
    async fn enrich(&self, name: &str) -> Attributes {
        if name.is_empty() {
            debug!("Empty name, skipping enrichment");
            return Attributes::default();
        }

        async {
            debug!(person = name, "Enriching person data");

            let (age, gender, nationality) = tokio::join!(
                self.lookup("age", &self.endpoints.age_url, name, extract_age),
                self.lookup("gender", &self.endpoints.gender_url, name, extract_gender),
                self.lookup(
                    "nationality",
                    &self.endpoints.nationality_url,
                    name,
                    extract_nationality
                ),
            );

            Attributes {
                age,
                gender,
                nationality,
            }
        }
        .instrument(self.span.clone())
        .await
    }
}

/// `age` as a non-negative number; fractional values are truncated
pub(crate) fn extract_age(body: &Value) -> Result<i64, ProviderError> {
    let age = body.get("age").ok_or(ProviderError::MissingField("age"))?;
    age.as_i64()
        .or_else(|| age.as_f64().map(|f| f as i64))
        .filter(|age| *age >= 0)
        .ok_or(ProviderError::MissingField("age"))
}

pub(crate) fn extract_gender(body: &Value) -> Result<String, ProviderError> {
    body.get("gender")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProviderError::MissingField("gender"))
}

/// `country_id` of the first `country` entry
pub(crate) fn extract_nationality(body: &Value) -> Result<String, ProviderError> {
    body.get("country")
        .and_then(Value::as_array)
        .and_then(|countries| countries.first())
        .and_then(|country| country.get("country_id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProviderError::MissingField("country"))
}
