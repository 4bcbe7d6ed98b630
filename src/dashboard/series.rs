//! Builds the data series behind the dashboard charts.

use time::Month;

use crate::{
    dashboard::aggregation::count_by_category,
    transaction::{CategoryTag, Transaction},
};

/// The twelve calendar months in order.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The number of transactions in every category, in [CategoryTag::ALL] order.
///
/// Categories with no transactions are included with a count of zero.
pub fn category_series(transactions: &[Transaction]) -> Vec<(CategoryTag, usize)> {
    let counts = count_by_category(transactions);

    CategoryTag::ALL
        .into_iter()
        .map(|category| (category, counts[category.index()]))
        .collect()
}

/// The total amount per calendar month, January to December.
///
/// Amounts from different years that fall in the same month are added
/// together. Transactions with an unreliable date are skipped.
pub fn monthly_series(transactions: &[Transaction]) -> Vec<(Month, u64)> {
    let mut totals = [0_u64; 12];

    for transaction in transactions {
        if let Some(date) = transaction.calendar_date() {
            let slot = &mut totals[month_index(date.month())];
            *slot = slot.saturating_add(transaction.amount);
        }
    }

    MONTHS.into_iter().zip(totals).collect()
}

/// Three-letter month labels for the chart axis, e.g. "Jan".
pub fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn month_index(month: Month) -> usize {
    u8::from(month) as usize - 1
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::{
        test_utils::{dated_transaction, undated_transaction},
        transaction::CategoryTag,
    };

    use super::{MONTHS, category_series, month_label, monthly_series};

    #[test]
    fn category_series_includes_every_category_in_order() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
            dated_transaction("2", CategoryTag::IncomingMoney, 1, date!(2024 - 03 - 01)),
            dated_transaction("3", CategoryTag::IncomingMoney, 1, date!(2024 - 03 - 01)),
        ];

        let series = category_series(&transactions);

        let categories: Vec<_> = series.iter().map(|(category, _)| *category).collect();
        assert_eq!(categories, CategoryTag::ALL);
        assert_eq!(series[0], (CategoryTag::IncomingMoney, 2));
        assert_eq!(series[1], (CategoryTag::BankDeposits, 0));
        assert_eq!(series[9], (CategoryTag::Other, 1));
        assert_eq!(series.iter().map(|(_, count)| count).sum::<usize>(), 3);
    }

    #[test]
    fn category_series_for_empty_collection_is_all_zero() {
        let series = category_series(&[]);

        assert_eq!(series.len(), 10);
        assert!(series.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn monthly_series_merges_years() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::Other, 100, date!(2023 - 01 - 15)),
            dated_transaction("2", CategoryTag::Other, 250, date!(2024 - 01 - 02)),
            dated_transaction("3", CategoryTag::Other, 40, date!(2024 - 12 - 31)),
        ];

        let series = monthly_series(&transactions);

        assert_eq!(series.len(), 12);
        assert_eq!(series[0], (Month::January, 350));
        assert_eq!(series[1], (Month::February, 0));
        assert_eq!(series[11], (Month::December, 40));
    }

    #[test]
    fn monthly_series_skips_unreliable_dates() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::Other, 100, date!(2024 - 05 - 15)),
            undated_transaction("2", CategoryTag::Other, 900, "no idea"),
        ];

        let series = monthly_series(&transactions);
        let total: u64 = series.iter().map(|(_, amount)| amount).sum();

        assert_eq!(total, 100);
        assert_eq!(series[4], (Month::May, 100));
    }

    #[test]
    fn month_labels_are_three_letters() {
        let labels: Vec<_> = MONTHS.into_iter().map(month_label).collect();

        assert_eq!(
            labels,
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
        );
    }
}
