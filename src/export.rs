//! Exports transactions as a CSV file.

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    snapshot::SnapshotStore,
    timezone::local_now,
    transaction::{Period, Transaction, filter_by_period},
};

/// The header line of an exported CSV file.
pub const CSV_HEADER: &str = "Date,Type,Amount (RWF),From,To,Status";

/// Encode `transactions` as CSV.
///
/// The header is followed by one row per transaction with the display date,
/// category, amount, sender, recipient and status. Every field in the rows is
/// quoted, quotes inside fields are doubled and lines end with `\n`.
///
/// # Errors
/// Returns [Error::CsvExport] if the CSV writer fails.
pub fn to_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut buffer = Vec::with_capacity(64 * (transactions.len() + 1));
    buffer.extend_from_slice(CSV_HEADER.as_bytes());
    buffer.push(b'\n');

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(buffer);

    for transaction in transactions {
        writer
            .write_record([
                transaction.display_date.as_str(),
                transaction.category.label(),
                &transaction.amount.to_string(),
                transaction.sender.as_str(),
                transaction.recipient.as_str(),
                transaction.status.label(),
            ])
            .map_err(|error| Error::CsvExport(error.to_string()))?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|error| Error::CsvExport(error.to_string()))?;

    String::from_utf8(buffer).map_err(|error| Error::CsvExport(error.to_string()))
}

/// The name of the file an export made on `date` is saved as.
pub fn export_file_name(date: Date) -> String {
    format!("MTN_MoMo_Transactions_{date}.csv")
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub snapshots: SnapshotStore,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Kigali".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            snapshots: state.snapshots.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for an export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Only export transactions in this period. Defaults to all time.
    #[serde(default)]
    pub period: Period,
}

/// Download the transactions in the current snapshot as a CSV attachment.
pub async fn export_transactions(
    State(state): State<ExportState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;

    let transactions = match state.snapshots.current() {
        Some(snapshot) => filter_by_period(&snapshot.transactions, query.period, now),
        None => Vec::new(),
    };

    let csv = to_csv(&transactions)
        .inspect_err(|error| tracing::error!("could not export transactions: {error}"))?;
    let file_name = export_file_name(now.date());

    tracing::info!(
        "exporting {} transactions as {file_name}",
        transactions.len()
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
