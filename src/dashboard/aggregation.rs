//! Summary metrics for a collection of transactions.

use crate::transaction::{CategoryTag, Transaction};

/// The headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub total_count: usize,
    /// The sum of all amounts in RWF.
    pub total_volume: u64,
    /// The sum of all fees in RWF.
    pub total_fees: u64,
    /// The category with the most transactions.
    pub dominant_category: CategoryTag,
    /// The share of transactions in `dominant_category`, rounded to a whole percent.
    pub dominant_percentage: u8,
}

/// Count the transactions in each category, indexed by [CategoryTag::index].
pub(crate) fn count_by_category(transactions: &[Transaction]) -> [usize; CategoryTag::ALL.len()] {
    let mut counts = [0; CategoryTag::ALL.len()];

    for transaction in transactions {
        counts[transaction.category.index()] += 1;
    }

    counts
}

/// Compute the summary metrics for `transactions`.
///
/// Returns `None` if there are no transactions, since there is no dominant
/// category or percentage for an empty collection.
///
/// Ties for the dominant category go to the category that comes first in
/// [CategoryTag::ALL].
pub fn aggregate(transactions: &[Transaction]) -> Option<Metrics> {
    if transactions.is_empty() {
        return None;
    }

    let counts = count_by_category(transactions);

    let mut dominant_category = CategoryTag::ALL[0];
    let mut dominant_count = counts[0];
    for category in CategoryTag::ALL.into_iter().skip(1) {
        let count = counts[category.index()];
        if count > dominant_count {
            dominant_category = category;
            dominant_count = count;
        }
    }

    let total_count = transactions.len();
    // Integer rounding of 100 * count / total, halves rounded up.
    let dominant_percentage = ((200 * dominant_count + total_count) / (2 * total_count)) as u8;

    let (total_volume, total_fees) = transactions
        .iter()
        .fold((0_u64, 0_u64), |(volume, fees), transaction| {
            (
                volume.saturating_add(transaction.amount),
                fees.saturating_add(transaction.fee),
            )
        });

    Some(Metrics {
        total_count,
        total_volume,
        total_fees,
        dominant_category,
        dominant_percentage,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        test_utils::{dated_transaction, undated_transaction},
        transaction::CategoryTag,
    };

    use super::{Metrics, aggregate, count_by_category};

    #[test]
    fn empty_collection_has_no_metrics() {
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn dominant_category_is_most_common() {
        let mut transactions = Vec::new();
        for i in 0..6 {
            transactions.push(dated_transaction(
                &format!("in-{i}"),
                CategoryTag::IncomingMoney,
                1000,
                date!(2024 - 03 - 01),
            ));
        }
        for i in 0..4 {
            transactions.push(dated_transaction(
                &format!("out-{i}"),
                CategoryTag::AgentWithdrawals,
                500,
                date!(2024 - 03 - 02),
            ));
        }

        let metrics = aggregate(&transactions).unwrap();

        assert_eq!(
            metrics,
            Metrics {
                total_count: 10,
                total_volume: 8000,
                total_fees: 0,
                dominant_category: CategoryTag::IncomingMoney,
                dominant_percentage: 60,
            }
        );
    }

    #[test]
    fn ties_go_to_the_first_category() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
            dated_transaction("2", CategoryTag::BankTransfers, 1, date!(2024 - 03 - 01)),
            dated_transaction("3", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
            dated_transaction("4", CategoryTag::BankTransfers, 1, date!(2024 - 03 - 01)),
        ];

        let metrics = aggregate(&transactions).unwrap();

        assert_eq!(metrics.dominant_category, CategoryTag::BankTransfers);
        assert_eq!(metrics.dominant_percentage, 50);
    }

    #[test]
    fn percentage_is_rounded() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::BankDeposits, 1, date!(2024 - 03 - 01)),
            dated_transaction("2", CategoryTag::BankDeposits, 1, date!(2024 - 03 - 01)),
            dated_transaction("3", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
        ];

        assert_eq!(aggregate(&transactions).unwrap().dominant_percentage, 67);
        assert_eq!(aggregate(&transactions[2..]).unwrap().dominant_percentage, 100);
    }

    #[test]
    fn volume_and_fees_include_unreliable_dates() {
        let mut dated = dated_transaction("1", CategoryTag::Other, 1500, date!(2024 - 03 - 01));
        dated.fee = 20;
        let mut undated = undated_transaction("2", CategoryTag::Other, 2500, "sometime");
        undated.fee = 100;

        let metrics = aggregate(&[dated, undated]).unwrap();

        assert_eq!(metrics.total_volume, 4000);
        assert_eq!(metrics.total_fees, 120);
    }

    #[test]
    fn category_counts_sum_to_total() {
        let transactions = vec![
            dated_transaction("1", CategoryTag::AirtimeBillPayments, 1, date!(2024 - 03 - 01)),
            dated_transaction("2", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
            dated_transaction("3", CategoryTag::Other, 1, date!(2024 - 03 - 01)),
        ];

        let counts = count_by_category(&transactions);

        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert_eq!(counts[CategoryTag::Other.index()], 2);
        assert_eq!(counts[CategoryTag::AirtimeBillPayments.index()], 1);
    }
}
