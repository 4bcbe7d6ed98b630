//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::{
    Error, dashboard::DashboardCharts, snapshot::SnapshotStore, source::RecordSource,
    timezone::get_local_offset, transaction::TableConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Where transaction records are fetched from.
    pub source: RecordSource,

    /// The transactions loaded by the most recent fetch.
    pub snapshots: SnapshotStore,

    /// The dashboard charts, created once and redrawn with new data.
    pub charts: Arc<Mutex<DashboardCharts>>,

    /// The config that controls how many rows the transaction table shows.
    pub table_config: TableConfig,

    /// The local timezone as a canonical timezone name, e.g. "Africa/Kigali".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] that loads transactions from `source`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Africa/Kigali".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(
        source: RecordSource,
        local_timezone: &str,
        table_config: TableConfig,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        Ok(Self {
            source,
            snapshots: SnapshotStore::default(),
            charts: Arc::new(Mutex::new(DashboardCharts::default())),
            table_config,
            local_timezone: local_timezone.to_owned(),
        })
    }
}
