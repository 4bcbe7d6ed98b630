//! Named display periods and the date ranges they cover.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::transaction::core::Transaction;

/// The window of time the dashboard displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    #[default]
    #[serde(rename = "alltime")]
    AllTime,
}

impl Period {
    /// The periods in the order their buttons are shown.
    pub const ALL: [Period; 4] = [Period::AllTime, Period::Daily, Period::Weekly, Period::Monthly];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::AllTime => "alltime",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::AllTime => "All Time",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Get the dates covered by `period`, ending on the day of `now`.
///
/// Returns `None` for [Period::AllTime], which covers every transaction.
///
/// Transaction dates are UTC calendar dates, so the ranges are computed on
/// `now`'s UTC calendar date:
/// - daily: today
/// - weekly: the 7 days before today, and today
/// - monthly: the same day last month up to today, with the day clamped to
///   the length of last month (e.g. 31 March -> 29 February in a leap year)
pub fn date_range(period: Period, now: OffsetDateTime) -> Option<DateRange> {
    let today = now.to_offset(UtcOffset::UTC).date();

    let start = match period {
        Period::Daily => today,
        Period::Weekly => today - Duration::days(7),
        Period::Monthly => one_month_before(today),
        Period::AllTime => return None,
    };

    Some(DateRange { start, end: today })
}

/// Get the transactions that fall within `period`, keeping their order.
///
/// Transactions with an unreliable date are only included for
/// [Period::AllTime].
pub fn filter_by_period(
    transactions: &[Transaction],
    period: Period,
    now: OffsetDateTime,
) -> Vec<Transaction> {
    let Some(range) = date_range(period, now) else {
        return transactions.to_vec();
    };

    transactions
        .iter()
        .filter(|transaction| {
            transaction
                .calendar_date()
                .is_some_and(|date| range.contains(date))
        })
        .cloned()
        .collect()
}

fn one_month_before(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::January => (date.year() - 1, Month::December),
        month => (date.year(), month.previous()),
    };
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).unwrap_or(date)
}
