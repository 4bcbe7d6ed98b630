//! MoMo Dashboard is a web app for exploring MTN MoMo mobile-money transactions.
//!
//! Transaction records are fetched from a transactions service (or a JSON
//! file made from an SMS backup), normalized into [Transaction]s and shown
//! as summary metrics, charts and a paginated table. The library provides a
//! REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod endpoints;
mod error;
mod export;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod sms;
mod snapshot;
mod source;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use dashboard::{ChartHandle, ChartSeries, DashboardCharts, Metrics, aggregate};
pub use dashboard::{category_series, monthly_series};
pub use error::Error;
pub use export::{CSV_HEADER, export_file_name, to_csv};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use sms::{ImportedBackup, categorize, import_backup, parse_backup, parse_message};
pub use snapshot::{Snapshot, SnapshotStore, Ticket};
pub use source::{RecordQuery, RecordSource};
pub use transaction::{
    CategoryTag, DateRange, NormalizationFailure, Period, RawRecord, TableConfig, Transaction,
    TransactionDate, TransactionIndex, TransactionStatus, UNKNOWN_PARTY, date_range,
    filter_by_period, is_fully_loaded, normalize, normalize_payload, page,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
