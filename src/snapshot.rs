//! Holds the collection of transactions the dashboard is showing.
//!
//! Every fetch is issued a [Ticket]. Fetches can finish out of order, so only
//! the response to the most recently issued ticket may replace the snapshot.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    source::RecordQuery,
    transaction::{Transaction, TransactionIndex},
};

/// A collection of transactions loaded by one fetch.
#[derive(Debug)]
pub struct Snapshot {
    /// The filters the collection was fetched with.
    pub query: RecordQuery,
    pub transactions: Arc<[Transaction]>,
    pub index: TransactionIndex,
}

impl Snapshot {
    pub fn new(query: RecordQuery, transactions: Vec<Transaction>) -> Self {
        let index = TransactionIndex::build(&transactions);

        Self {
            query,
            transactions: transactions.into(),
            index,
        }
    }

    /// Get the transaction with `id`.
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.index.get(&self.transactions, id)
    }
}

/// Identifies one fetch. Tickets are issued in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Shared storage for the current [Snapshot].
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    latest_ticket: Arc<AtomicU64>,
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    /// Issue the ticket for a new fetch, making every earlier ticket stale.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the most recently issued ticket.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket.0
    }

    /// Replace the current snapshot with `snapshot` if `ticket` is still the
    /// most recently issued ticket.
    ///
    /// Returns the stored snapshot, or `None` if the ticket was stale and the
    /// snapshot was dropped.
    pub fn accept(&self, ticket: Ticket, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let mut current = match self.current.write() {
            Ok(current) => current,
            Err(poisoned) => {
                tracing::warn!("snapshot lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        // Checked while holding the lock so an older fetch cannot overwrite a
        // newer one that was accepted in between.
        if !self.is_latest(ticket) {
            tracing::debug!(
                "dropping stale snapshot for ticket {} (latest is {})",
                ticket.0,
                self.latest_ticket.load(Ordering::SeqCst)
            );
            return None;
        }

        let snapshot = Arc::new(snapshot);
        *current = Some(snapshot.clone());

        Some(snapshot)
    }

    /// Get the current snapshot, if any fetch has been accepted.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
