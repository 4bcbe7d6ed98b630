//! Dashboard HTTP handlers.
//!
//! The dashboard page fetches from the record source on every request. The
//! period buttons, the "Show More" button and the detail panel only read the
//! snapshot loaded by the most recent fetch.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::html;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    alert::Alert,
    dashboard::{
        aggregation::aggregate,
        charts::DashboardCharts,
        views::{
            DashboardContent, dashboard_content, dashboard_page, transaction_detail,
            transaction_table,
        },
    },
    snapshot::{Snapshot, SnapshotStore, Ticket},
    source::{RecordQuery, RecordSource},
    timezone::local_now,
    transaction::{Period, TableConfig, Transaction, filter_by_period, normalize_payload},
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Where transaction records are fetched from.
    pub source: RecordSource,
    /// The transactions loaded by the most recent fetch.
    pub snapshots: SnapshotStore,
    /// The chart handles, redrawn whenever the content is rendered.
    pub charts: Arc<Mutex<DashboardCharts>>,
    pub table_config: TableConfig,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Kigali".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            source: state.source.clone(),
            snapshots: state.snapshots.clone(),
            charts: state.charts.clone(),
            table_config: state.table_config,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters sent by the filter form.
///
/// Values are kept as text so that an empty or invalid filter is ignored
/// rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub period: Option<String>,
}

impl DashboardQuery {
    fn record_query(&self) -> RecordQuery {
        RecordQuery::from_form(
            self.category.as_deref(),
            self.date.as_deref(),
            self.min_amount.as_deref(),
            self.max_amount.as_deref(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub period: Option<String>,
    pub limit: Option<usize>,
}

/// Parse a period from a query parameter, falling back to all time.
fn parse_period(value: Option<&str>) -> Period {
    let Some(value) = value else {
        return Period::default();
    };

    Period::ALL
        .into_iter()
        .find(|period| period.as_query_value() == value)
        .unwrap_or_else(|| {
            tracing::debug!("unknown period {value:?}, showing all time");
            Period::default()
        })
}

/// The result of fetching transactions for the dashboard.
#[derive(Debug)]
enum Load {
    /// The snapshot to show, and an alert to show with it.
    Loaded {
        snapshot: Option<Arc<Snapshot>>,
        alert: Option<Alert>,
    },
    /// A newer fetch was issued while this one was in flight.
    Stale,
    Failed(Error),
}

/// Decide what to show for the fetch identified by `ticket`.
fn resolve_fetch(
    snapshots: &SnapshotStore,
    ticket: Ticket,
    query: RecordQuery,
    result: Result<Vec<Transaction>, Error>,
) -> Load {
    let accept = |transactions| match snapshots.accept(ticket, Snapshot::new(query, transactions))
    {
        Some(snapshot) => Load::Loaded {
            snapshot: Some(snapshot),
            alert: None,
        },
        None => Load::Stale,
    };

    match result {
        Ok(transactions) => {
            tracing::info!("loaded {} transactions", transactions.len());
            accept(transactions)
        }
        Err(Error::EmptyResult { received }) => {
            tracing::info!("no transactions to show, {received} records were received");
            accept(Vec::new())
        }
        Err(_) if !snapshots.is_latest(ticket) => Load::Stale,
        Err(error @ Error::MalformedPayload(_)) => {
            tracing::error!("{error}");
            Load::Loaded {
                snapshot: snapshots.current(),
                alert: Some(Alert::Warning {
                    message: "Could not read transactions".to_owned(),
                    details: "The transactions service sent data that could not be read. \
                        Showing the previously loaded transactions."
                        .to_owned(),
                }),
            }
        }
        Err(error) => {
            tracing::error!("could not load transactions: {error}");
            Load::Failed(error)
        }
    }
}

async fn fetch_transactions(state: &DashboardState, query: RecordQuery) -> Load {
    let ticket = state.snapshots.issue();
    let result = state
        .source
        .fetch(&query)
        .await
        .and_then(|payload| normalize_payload(&payload));

    resolve_fetch(&state.snapshots, ticket, query, result)
}

/// Redraw the charts for `transactions` and take a copy for rendering.
fn redraw_charts(charts: &Mutex<DashboardCharts>, transactions: &[Transaction]) -> DashboardCharts {
    let mut charts = match charts.lock() {
        Ok(charts) => charts,
        Err(poisoned) => {
            tracing::warn!("chart lock was poisoned, recovering");
            poisoned.into_inner()
        }
    };

    charts.redraw(transactions);
    charts.clone()
}

enum Layout {
    Page,
    Partial,
}

fn render_dashboard(
    state: &DashboardState,
    snapshot: Option<&Snapshot>,
    query: &RecordQuery,
    period: Period,
    now: OffsetDateTime,
    layout: Layout,
    alert: Option<Alert>,
) -> Response {
    let transactions = snapshot
        .map(|snapshot| filter_by_period(&snapshot.transactions, period, now))
        .unwrap_or_default();
    let charts = redraw_charts(&state.charts, &transactions);

    let content = DashboardContent {
        query,
        period,
        transactions: &transactions,
        metrics: aggregate(&transactions),
        charts: &charts,
        table_config: state.table_config,
    };

    match layout {
        Layout::Page => dashboard_page(&content, alert).into_response(),
        Layout::Partial => html!(
            (dashboard_content(&content))
            @if let Some(alert) = alert {
                (alert.into_html())
            }
        )
        .into_response(),
    }
}

fn error_response(error: Error, is_htmx: bool) -> Response {
    if is_htmx {
        error.into_alert_response()
    } else {
        error.into_response()
    }
}

/// Fetch the transactions matching the filters and display the dashboard.
///
/// Requests made by htmx get the dashboard content only. If a newer request
/// was made while this one was fetching, responds with 204 No Content so the
/// newer content is kept.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error_response(error, is_htmx),
    };
    let period = parse_period(query.period.as_deref());
    let record_query = query.record_query();

    let (snapshot, alert) = match fetch_transactions(&state, record_query.clone()).await {
        Load::Loaded { snapshot, alert } => (snapshot, alert),
        Load::Stale => return StatusCode::NO_CONTENT.into_response(),
        Load::Failed(error) => return error_response(error, is_htmx),
    };

    let layout = if is_htmx { Layout::Partial } else { Layout::Page };

    render_dashboard(
        &state,
        snapshot.as_deref(),
        &record_query,
        period,
        now,
        layout,
        alert,
    )
}

/// Display the dashboard content for a period using the loaded transactions.
pub async fn get_dashboard_content(
    State(state): State<DashboardState>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };
    let period = parse_period(query.period.as_deref());
    let snapshot = state.snapshots.current();
    let record_query = snapshot
        .as_ref()
        .map(|snapshot| snapshot.query.clone())
        .unwrap_or_default();

    render_dashboard(
        &state,
        snapshot.as_deref(),
        &record_query,
        period,
        now,
        Layout::Partial,
        None,
    )
}

/// Display the transaction table with the first `limit` transactions in the period.
pub async fn get_transaction_table(
    State(state): State<DashboardState>,
    Query(query): Query<TableQuery>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };
    let period = parse_period(query.period.as_deref());
    let limit = state.table_config.limit_or_default(query.limit);

    let transactions = state
        .snapshots
        .current()
        .map(|snapshot| filter_by_period(&snapshot.transactions, period, now))
        .unwrap_or_default();

    transaction_table(&transactions, period, limit, state.table_config).into_response()
}

/// Display the detail panel for a transaction in the loaded transactions.
pub async fn get_transaction_detail(
    State(state): State<DashboardState>,
    Path(transaction_id): Path<String>,
) -> Response {
    let Some(snapshot) = state.snapshots.current() else {
        return Error::NotFound.into_alert_response();
    };

    match snapshot.get(&transaction_id) {
        Some(transaction) => transaction_detail(transaction).into_response(),
        None => {
            tracing::debug!("transaction {transaction_id} is not in the loaded transactions");
            Error::NotFound.into_alert_response()
        }
    }
}
