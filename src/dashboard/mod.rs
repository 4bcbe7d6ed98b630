//! Dashboard module
//!
//! Provides the overview page with summary metrics, charts and the
//! transaction table, plus the partials htmx swaps into it.

mod aggregation;
mod charts;
mod handlers;
mod series;
mod views;

pub use aggregation::{Metrics, aggregate};
pub use charts::{ChartHandle, ChartSeries, DashboardCharts};
pub use handlers::{
    get_dashboard_content, get_dashboard_page, get_transaction_detail, get_transaction_table,
};
pub use series::{category_series, monthly_series};
