//! Converts untrusted records from the record source into [Transaction]s.
//!
//! Normalization never rejects a record for a missing or malformed field.
//! Each field falls back to a default instead:
//! - `id`: a fresh UUID
//! - `category`: [CategoryTag::Other]
//! - `amount`, `fee`: 0
//! - `datetime`: the raw string, marking the date as unreliable
//! - `sender`, `recipient`: [UNKNOWN_PARTY]
//!
//! Only a record that is not a JSON object at all is dropped.

use std::collections::HashSet;

use serde_json::{Map, Value};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use uuid::Uuid;

use crate::{
    Error,
    transaction::{
        category::CategoryTag,
        core::{Transaction, TransactionDate, TransactionStatus, UNKNOWN_PARTY},
    },
};

/// A record as received from the record source.
///
/// No field is guaranteed to be present or to have the expected type.
pub type RawRecord = Map<String, Value>;

/// Why a single record could not be normalized.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizationFailure {
    /// The record was a JSON value other than an object.
    #[error("expected a JSON object but got {0}")]
    NotAnObject(&'static str),
}

/// Normalize a single record.
///
/// # Errors
/// Returns [NormalizationFailure::NotAnObject] if `raw` is not a JSON object.
pub fn normalize(raw: &Value) -> Result<Transaction, NormalizationFailure> {
    let record = raw
        .as_object()
        .ok_or_else(|| NormalizationFailure::NotAnObject(json_type_name(raw)))?;

    Ok(normalize_record(record))
}

/// Normalize a record that is known to be an object.
pub fn normalize_record(record: &RawRecord) -> Transaction {
    let id = text_field(record, "id").unwrap_or_else(generate_id);

    let category = match record.get("category") {
        Some(Value::String(label)) => CategoryTag::from_label(label).unwrap_or(CategoryTag::Other),
        _ => CategoryTag::Other,
    };

    let date = parse_transaction_date(record.get("datetime"));
    let display_date = date.display_text();

    Transaction {
        id,
        category,
        amount: integer_field(record, "amount"),
        fee: integer_field(record, "fee"),
        date,
        display_date,
        sender: text_field(record, "sender").unwrap_or_else(|| UNKNOWN_PARTY.to_owned()),
        recipient: text_field(record, "recipient").unwrap_or_else(|| UNKNOWN_PARTY.to_owned()),
        status: TransactionStatus::Completed,
        raw_text: text_field(record, "raw_text"),
        code: text_field(record, "code"),
        account_or_phone: text_field(record, "account_or_phone"),
    }
}

/// Normalize the full payload returned by the record source.
///
/// Records that fail to normalize are logged and dropped. Records whose ID
/// was already seen in this payload are given a fresh ID.
///
/// # Errors
/// - [Error::MalformedPayload] if `payload` is not a JSON array.
/// - [Error::EmptyResult] if no transactions remain. `received` tells an
///   empty array (0) apart from an array where every record failed.
pub fn normalize_payload(payload: &Value) -> Result<Vec<Transaction>, Error> {
    let records = payload.as_array().ok_or_else(|| {
        Error::MalformedPayload(format!(
            "expected a JSON array but got {}",
            json_type_name(payload)
        ))
    })?;

    let mut seen_ids = HashSet::with_capacity(records.len());
    let mut transactions = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let mut transaction = match normalize(record) {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::warn!("dropping record {index}: {error}");
                continue;
            }
        };

        if !seen_ids.insert(transaction.id.clone()) {
            let replacement = generate_id();
            tracing::warn!(
                "record {index} reuses the ID {}, assigning {replacement}",
                transaction.id
            );
            transaction.id = replacement.clone();
            seen_ids.insert(replacement);
        }

        transactions.push(transaction);
    }

    if transactions.is_empty() {
        return Err(Error::EmptyResult {
            received: records.len(),
        });
    }

    tracing::debug!(
        "normalized {} of {} records",
        transactions.len(),
        records.len()
    );

    Ok(transactions)
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Get a non-empty text value, rendering numbers as decimal strings.
fn text_field(record: &RawRecord, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Get a non-negative integer, or 0 if the value is missing or unusable.
pub(crate) fn integer_field(record: &RawRecord, key: &str) -> u64 {
    match record.get(key) {
        Some(Value::Number(number)) => {
            if let Some(integer) = number.as_u64() {
                integer
            } else {
                match number.as_f64() {
                    Some(float) if float.is_finite() && float >= 0.0 => float.trunc() as u64,
                    _ => 0,
                }
            }
        }
        Some(Value::String(text)) => parse_leading_integer(text),
        _ => 0,
    }
}

/// Parse the leading decimal digits of `text`, e.g. "1500 RWF" -> 1500.
fn parse_leading_integer(text: &str) -> u64 {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digit_count = text.bytes().take_while(u8::is_ascii_digit).count();

    text[..digit_count].parse().unwrap_or(0)
}

fn parse_transaction_date(value: Option<&Value>) -> TransactionDate {
    match value {
        Some(Value::String(text)) => match parse_date(text.trim()) {
            Some(date) => TransactionDate::Parsed(date),
            None => TransactionDate::Unreliable(text.clone()),
        },
        // Numeric datetimes are epoch milliseconds, as in SMS backups.
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(date_from_epoch_millis)
            .map(TransactionDate::Parsed)
            .unwrap_or_else(|| TransactionDate::Unreliable(number.to_string())),
        None | Some(Value::Null) => TransactionDate::Unreliable(String::new()),
        Some(other) => TransactionDate::Unreliable(other.to_string()),
    }
}

/// Parse a date-time string and truncate it to a UTC calendar date.
pub(crate) fn parse_date(text: &str) -> Option<Date> {
    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time.to_offset(UtcOffset::UTC).date());
    }

    let naive_formats: [&[BorrowedFormatItem<'_>]; 4] = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];

    for format in naive_formats {
        if let Ok(date_time) = PrimitiveDateTime::parse(text, format) {
            return Some(date_time.date());
        }
    }

    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

fn date_from_epoch_millis(millis: i64) -> Option<Date> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .map(|date_time| date_time.date())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
