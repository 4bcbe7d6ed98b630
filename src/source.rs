//! Fetches raw transaction records for the dashboard.
//!
//! Records come from the transactions service over HTTP, from a JSON file
//! written by the SMS importer, or from a fixed payload. All three accept the
//! same [RecordQuery] filters.

use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use crate::{
    Error,
    transaction::{integer_field, parse_date},
};

/// The filters sent to the record source.
///
/// Absent fields are left out of the query string.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RecordQuery {
    /// Only records with this category label.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Only records on this date, formatted as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Only records with an amount of at least this many RWF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<u64>,
    /// Only records with an amount of at most this many RWF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<u64>,
}

impl RecordQuery {
    /// Build a query from HTML form values.
    ///
    /// Empty strings mean "no filter". Amounts that are not whole numbers are
    /// ignored, matching how the transactions service treats them.
    pub fn from_form(
        category: Option<&str>,
        date: Option<&str>,
        min_amount: Option<&str>,
        max_amount: Option<&str>,
    ) -> Self {
        Self {
            category: non_empty(category),
            date: non_empty(date),
            min_amount: parse_amount(min_amount),
            max_amount: parse_amount(max_amount),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Encode the query as a URL query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_else(|error| {
            tracing::error!("could not encode record query {self:?}: {error}");
            String::new()
        })
    }

    /// Whether `record` passes the filters.
    ///
    /// Only JSON objects can pass a non-empty query.
    fn matches(&self, record: &Value) -> bool {
        if self.is_empty() {
            return true;
        }

        let Some(record) = record.as_object() else {
            return false;
        };

        let record_category = record.get("category").and_then(Value::as_str);
        if self
            .category
            .as_deref()
            .is_some_and(|category| record_category != Some(category))
        {
            return false;
        }

        let amount = integer_field(record, "amount");
        if self.min_amount.is_some_and(|min| amount < min)
            || self.max_amount.is_some_and(|max| amount > max)
        {
            return false;
        }

        if let Some(date) = &self.date {
            let record_date = record
                .get("datetime")
                .and_then(Value::as_str)
                .and_then(|text| parse_date(text.trim()));

            if record_date.map(|record_date| record_date.to_string()).as_ref() != Some(date) {
                return false;
            }
        }

        true
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn parse_amount(value: Option<&str>) -> Option<u64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match value.parse() {
        Ok(amount) => Some(amount),
        Err(error) => {
            tracing::debug!("ignoring amount filter {value:?}: {error}");
            None
        }
    }
}

/// Where raw transaction records are fetched from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// The transactions service, e.g. `http://127.0.0.1:5000/transactions`.
    Remote { client: reqwest::Client, url: String },
    /// A JSON file containing an array of records. It is read on every fetch.
    File(PathBuf),
    /// A payload that never changes.
    Fixed(Arc<Value>),
}

impl RecordSource {
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn fixed(payload: Value) -> Self {
        Self::Fixed(Arc::new(payload))
    }

    /// Fetch the records that match `query`.
    ///
    /// The payload is returned as is. It is up to the normalizer to check it
    /// is an array of records.
    ///
    /// # Errors
    /// - [Error::TransportFailure] if the source cannot be reached or read.
    /// - [Error::MalformedPayload] if the response is not JSON.
    pub async fn fetch(&self, query: &RecordQuery) -> Result<Value, Error> {
        match self {
            RecordSource::Remote { client, url } => fetch_remote(client, url, query).await,
            RecordSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|error| {
                    Error::TransportFailure(format!("could not read {}: {error}", path.display()))
                })?;
                let payload = parse_payload(&text)?;

                Ok(apply_query(payload, query))
            }
            RecordSource::Fixed(payload) => Ok(apply_query(payload.as_ref().clone(), query)),
        }
    }
}

async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    query: &RecordQuery,
) -> Result<Value, Error> {
    tracing::debug!("fetching records from {url} with query {query:?}");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|error| Error::TransportFailure(format!("request to {url} failed: {error}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::TransportFailure(format!(
            "{url} responded with {status}: {body}"
        )));
    }

    let text = response.text().await.map_err(|error| {
        Error::TransportFailure(format!("could not read response from {url}: {error}"))
    })?;

    parse_payload(&text)
}

fn parse_payload(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|error| Error::MalformedPayload(error.to_string()))
}

/// Keep the records in an array payload that match `query`.
///
/// Payloads that are not arrays are returned unchanged.
fn apply_query(payload: Value, query: &RecordQuery) -> Value {
    match payload {
        Value::Array(records) if !query.is_empty() => Value::Array(
            records
                .into_iter()
                .filter(|record| query.matches(record))
                .collect(),
        ),
        payload => payload,
    }
}
