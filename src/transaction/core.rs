//! Defines the canonical transaction model the dashboard works with.

use std::fmt::Display;

use time::{Date, macros::format_description};

use crate::transaction::category::CategoryTag;

/// The sender or recipient shown when the record does not name one.
pub const UNKNOWN_PARTY: &str = "N/A";

/// A normalized mobile-money transaction.
///
/// Transactions are only created by the normalizer and are never modified
/// afterwards. A new fetch produces a new collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique within a loaded collection.
    pub id: String,
    pub category: CategoryTag,
    /// The amount in RWF.
    pub amount: u64,
    /// The fee in RWF.
    pub fee: u64,
    /// When the transaction happened, to day precision.
    pub date: TransactionDate,
    /// The human readable form of `date`, e.g. "Mar 1, 2024".
    pub display_date: String,
    pub sender: String,
    pub recipient: String,
    pub status: TransactionStatus,
    /// The SMS text the record was parsed from.
    pub raw_text: Option<String>,
    /// The merchant code for payments to code holders.
    pub code: Option<String>,
    /// The account number or phone number for bank transfers.
    pub account_or_phone: Option<String>,
}

impl Transaction {
    /// The calendar date, if the source datetime could be parsed.
    pub fn calendar_date(&self) -> Option<Date> {
        self.date.calendar_date()
    }

    /// Whether the source datetime could not be parsed.
    pub fn has_unreliable_date(&self) -> bool {
        self.calendar_date().is_none()
    }
}

/// The date of a transaction.
///
/// Records with a datetime that could not be parsed keep the raw string so it
/// can still be shown, but they are left out of anything bucketed by time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionDate {
    Parsed(Date),
    Unreliable(String),
}

impl TransactionDate {
    pub fn calendar_date(&self) -> Option<Date> {
        match self {
            TransactionDate::Parsed(date) => Some(*date),
            TransactionDate::Unreliable(_) => None,
        }
    }

    /// Render the date as "Mon D, YYYY", or the raw string for unreliable dates.
    pub fn display_text(&self) -> String {
        match self {
            TransactionDate::Parsed(date) => format_display_date(*date),
            TransactionDate::Unreliable(raw) => raw.clone(),
        }
    }
}

impl Display for TransactionDate {
    /// ISO 8601 (`YYYY-MM-DD`), or the raw string for unreliable dates.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionDate::Parsed(date) => write!(f, "{date}"),
            TransactionDate::Unreliable(raw) => f.write_str(raw),
        }
    }
}

/// The state of a transaction.
///
/// The record source only reports completed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    #[default]
    Completed,
}

impl TransactionStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn format_display_date(date: Date) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");

    date.format(format).unwrap_or_else(|error| {
        tracing::warn!("could not format date {date}: {error}");
        date.to_string()
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{TransactionDate, TransactionStatus};

    #[test]
    fn parsed_date_displays_short_month() {
        let date = TransactionDate::Parsed(date!(2024 - 03 - 01));

        assert_eq!(date.display_text(), "Mar 1, 2024");
        assert_eq!(date.to_string(), "2024-03-01");
    }

    #[test]
    fn two_digit_day_is_not_padded_differently() {
        let date = TransactionDate::Parsed(date!(2023 - 12 - 25));

        assert_eq!(date.display_text(), "Dec 25, 2023");
    }

    #[test]
    fn unreliable_date_keeps_raw_text() {
        let date = TransactionDate::Unreliable("yesterday-ish".to_owned());

        assert_eq!(date.display_text(), "yesterday-ish");
        assert_eq!(date.to_string(), "yesterday-ish");
        assert_eq!(date.calendar_date(), None);
    }

    #[test]
    fn status_label() {
        assert_eq!(TransactionStatus::default().to_string(), "Completed");
    }
}
