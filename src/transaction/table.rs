//! Limits a collection for the paginated table and indexes rows for lookup.

use std::collections::HashMap;

use crate::transaction::core::Transaction;

/// How many rows the transaction table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// The number of rows shown before "Show More" is used.
    pub default_limit: usize,
    /// How many rows each "Show More" click adds.
    pub step: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            step: 5,
        }
    }
}

impl TableConfig {
    /// The limit to use when the request does not specify one.
    pub fn limit_or_default(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.default_limit)
    }

    /// The limit after one more "Show More" click.
    pub fn next_limit(&self, limit: usize) -> usize {
        limit.saturating_add(self.step.max(1))
    }
}

/// Get the first `limit` transactions, in the given order.
///
/// A limit of `None` or 0 means no limit.
pub fn page(transactions: &[Transaction], limit: Option<usize>) -> &[Transaction] {
    match limit {
        Some(limit) if limit > 0 => &transactions[..limit.min(transactions.len())],
        _ => transactions,
    }
}

/// Whether a page with `limit` rows already shows every transaction.
pub fn is_fully_loaded(total: usize, limit: Option<usize>) -> bool {
    match limit {
        Some(limit) if limit > 0 => limit >= total,
        _ => true,
    }
}

/// Looks up transactions by ID for the detail panel.
#[derive(Debug, Default, Clone)]
pub struct TransactionIndex {
    positions: HashMap<String, usize>,
}

impl TransactionIndex {
    /// Build an index over `transactions`.
    ///
    /// IDs are expected to be unique. If they are not, the first occurrence
    /// wins.
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut positions = HashMap::with_capacity(transactions.len());

        for (position, transaction) in transactions.iter().enumerate() {
            positions.entry(transaction.id.clone()).or_insert(position);
        }

        Self { positions }
    }

    /// Get the transaction with `id` from the collection the index was built from.
    pub fn get<'a>(&self, transactions: &'a [Transaction], id: &str) -> Option<&'a Transaction> {
        self.positions
            .get(id)
            .and_then(|&position| transactions.get(position))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
