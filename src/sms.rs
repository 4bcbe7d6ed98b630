//! Converts an SMS backup of MTN MoMo notifications into transaction records.
//!
//! The records have the shape the record source serves, so the output of
//! [parse_backup] can be written to a JSON file and loaded with
//! [crate::RecordSource::File].

use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    Error,
    transaction::{CategoryTag, RawRecord},
};

/// Messages mentioning these are never MoMo transactions.
const EXCLUDED_KEYWORDS: [&str; 3] = ["onafriq mauritius", "rwandaltd", "mtn data push"];
const BUNDLE_KEYWORDS: [&str; 8] = [
    "bundle", "bundles", "packs", "mb", "gb", "internet", "voice", "data",
];
const NOT_CASH_POWER_KEYWORDS: [&str; 6] = ["mb", "gb", "bundle", "data", "internet", "airtime"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Pick the category of an SMS from its text.
///
/// Keywords are matched case-insensitively and the first matching rule wins.
pub fn categorize(body: &str) -> CategoryTag {
    let body = body.to_lowercase();

    if contains_any(&body, &EXCLUDED_KEYWORDS) {
        tracing::debug!("excluded message: {body:?}");
        return CategoryTag::Other;
    }

    if body.contains("you have received") || body.contains("credited to your") {
        CategoryTag::IncomingMoney
    } else if body.contains("bank deposit") {
        CategoryTag::BankDeposits
    } else if body.contains("transferred") {
        CategoryTag::BankTransfers
    } else if body.contains("airtime") {
        CategoryTag::AirtimeBillPayments
    } else if contains_any(&body, &BUNDLE_KEYWORDS) {
        CategoryTag::BundlePurchases
    } else if body.contains("cash power")
        || (body.contains("token") && !contains_any(&body, &NOT_CASH_POWER_KEYWORDS))
    {
        CategoryTag::CashPowerBillPayments
    } else if body.contains("your payment of") {
        CategoryTag::CodeHolderPayments
    } else if body.contains("from") && (body.contains("received") || body.contains("credited")) {
        CategoryTag::ThirdPartyTransactions
    } else if body.contains("withdrawn") || body.contains("withdrawal") || body.contains("agent") {
        CategoryTag::AgentWithdrawals
    } else {
        tracing::info!("no category matches message: {body:?}");
        CategoryTag::Other
    }
}

struct Patterns {
    amount: Regex,
    fee: Regex,
    code_holder_payment: Regex,
    bank_transfer: Regex,
    incoming_sender: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();

    PATTERNS.get_or_init(|| Patterns {
        amount: Regex::new(r"([0-9,]+)\s*RWF").unwrap(),
        fee: Regex::new(r"Fee (?:was|:) (\d+)").unwrap(),
        code_holder_payment: Regex::new(r"payment of .*? RWF to (.+?) (\d+)").unwrap(),
        bank_transfer: Regex::new(r"transferred to (.+?) \((\d+)\)").unwrap(),
        incoming_sender: Regex::new(r"from\s+(.+?)\s+\(\*+\d+\)").unwrap(),
    })
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` in UTC.
fn format_timestamp(timestamp_ms: &str) -> Result<String, Error> {
    let millis: i64 = timestamp_ms
        .trim()
        .parse()
        .map_err(|error| Error::SmsImport(format!("invalid timestamp {timestamp_ms:?}: {error}")))?;

    let date_time = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|error| Error::SmsImport(format!("invalid timestamp {timestamp_ms:?}: {error}")))?;

    date_time
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|error| Error::SmsImport(format!("could not format {date_time}: {error}")))
}

/// The first amount in RWF mentioned in `body`, or 0.
fn parse_amount(body: &str) -> u64 {
    let Some(captures) = patterns().amount.captures(body) else {
        tracing::info!("no amount found in message: {body:?}");
        return 0;
    };

    let digits = captures[1].replace(',', "");
    digits.parse().unwrap_or_else(|error| {
        tracing::info!("could not read amount {:?}: {error}", &captures[1]);
        0
    })
}

fn parse_fee(body: &str) -> u64 {
    patterns()
        .fee
        .captures(body)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0)
}

/// Build a transaction record from the text and timestamp of one SMS.
///
/// `timestamp_ms` is milliseconds since the Unix epoch, as stored in SMS
/// backups.
///
/// # Errors
/// Returns [Error::SmsImport] if `timestamp_ms` is not a valid timestamp.
pub fn parse_message(body: &str, timestamp_ms: &str) -> Result<RawRecord, Error> {
    let datetime = format_timestamp(timestamp_ms)?;
    let category = categorize(body);

    let mut record = RawRecord::new();
    record.insert("category".to_owned(), json!(category.label()));
    record.insert("datetime".to_owned(), json!(datetime));
    record.insert("raw_text".to_owned(), json!(body));
    record.insert("amount".to_owned(), json!(parse_amount(body)));
    record.insert("fee".to_owned(), json!(parse_fee(body)));

    let patterns = patterns();
    match category {
        CategoryTag::CodeHolderPayments => {
            if let Some(captures) = patterns.code_holder_payment.captures(body) {
                record.insert("recipient".to_owned(), json!(&captures[1]));
                record.insert("code".to_owned(), json!(&captures[2]));
            }
        }
        CategoryTag::BankTransfers => {
            if let Some(captures) = patterns.bank_transfer.captures(body) {
                record.insert("recipient".to_owned(), json!(&captures[1]));
                record.insert("account_or_phone".to_owned(), json!(&captures[2]));
            }
        }
        CategoryTag::IncomingMoney => {
            if let Some(captures) = patterns.incoming_sender.captures(body) {
                record.insert("sender".to_owned(), json!(&captures[1]));
            }
        }
        _ => {}
    }

    Ok(record)
}

/// Convert every `<sms>` element of an SMS backup into a transaction record.
///
/// Messages with an invalid timestamp are skipped, as are repeats of a
/// message with the same text and time. Records are given sequential IDs
/// starting at 1.
pub fn parse_backup(xml: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(xml);
    let Ok(sms_selector) = Selector::parse("sms") else {
        tracing::error!("could not build the SMS selector");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for element in document.select(&sms_selector) {
        let body = element.value().attr("body").unwrap_or_default();
        let timestamp = element.value().attr("date").unwrap_or("0");

        let mut record = match parse_message(body, timestamp) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!("skipping message {body:?}: {error}");
                continue;
            }
        };

        let datetime = record
            .get("datetime")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        if !seen.insert((datetime, body.to_owned())) {
            tracing::debug!("skipping duplicate message {body:?}");
            continue;
        }

        record.insert("id".to_owned(), json!(records.len() + 1));
        records.push(record);
    }

    tracing::info!("imported {} messages", records.len());

    records
}

/// The records of an SMS backup, encoded as a JSON array.
#[derive(Debug)]
pub struct ImportedBackup {
    /// The number of records.
    pub count: usize,
    pub json: String,
}

/// Convert an SMS backup into a JSON array of transaction records.
///
/// # Errors
/// Returns [Error::SmsImport] if the records cannot be encoded as JSON.
pub fn import_backup(xml: &str) -> Result<ImportedBackup, Error> {
    let records = parse_backup(xml);
    let json = serde_json::to_string_pretty(&records)
        .map_err(|error| Error::SmsImport(format!("could not encode records: {error}")))?;

    Ok(ImportedBackup {
        count: records.len(),
        json,
    })
}
