//! Chart generation and rendering for the dashboard.
//!
//! The dashboard has two ECharts visualizations:
//! - **Category chart**: a pie chart of the number of transactions per category
//! - **Volume chart**: a bar chart of the transaction volume per calendar month
//!
//! Each chart lives in a [ChartHandle] that is created once and updated with
//! [ChartHandle::redraw]. The browser side reuses the ECharts instance that
//! already exists for a container instead of creating a new one.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};
use time::Month;

use crate::{
    dashboard::series::{category_series, month_label, monthly_series},
    transaction::{CategoryTag, Transaction},
};

/// The HTML element ID of the category chart.
pub(crate) const CATEGORY_CHART_ID: &str = "category-chart";
/// The HTML element ID of the monthly volume chart.
pub(crate) const VOLUME_CHART_ID: &str = "volume-chart";

const VOLUME_BAR_COLOR: &str = "#FFCC00";

/// The data a chart is drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Categories(Vec<(CategoryTag, usize)>),
    MonthlyVolume(Vec<(Month, u64)>),
}

/// An owned chart: its HTML container ID and current ECharts configuration.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    /// The HTML element ID to use for the chart (kebab-case)
    id: &'static str,
    /// The ECharts configuration as a JSON string
    options: String,
}

impl ChartHandle {
    /// Create a chart that has nothing drawn yet.
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            options: String::from("{}"),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    /// Replace the chart's configuration with one drawn from `series`.
    pub fn redraw(&mut self, series: &ChartSeries) {
        let chart = match series {
            ChartSeries::Categories(counts) => category_chart(counts),
            ChartSeries::MonthlyVolume(totals) => volume_chart(totals),
        };

        self.options = chart.to_string();
    }
}

/// The two charts shown on the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardCharts {
    pub category: ChartHandle,
    pub volume: ChartHandle,
}

impl Default for DashboardCharts {
    fn default() -> Self {
        Self {
            category: ChartHandle::new(CATEGORY_CHART_ID),
            volume: ChartHandle::new(VOLUME_CHART_ID),
        }
    }
}

impl DashboardCharts {
    /// Redraw both charts from `transactions`.
    pub fn redraw(&mut self, transactions: &[Transaction]) {
        self.category
            .redraw(&ChartSeries::Categories(category_series(transactions)));
        self.volume
            .redraw(&ChartSeries::MonthlyVolume(monthly_series(transactions)));
    }

    pub fn handles(&self) -> [&ChartHandle; 2] {
        [&self.category, &self.volume]
    }
}

/// Renders the HTML containers for dashboard charts.
pub(crate) fn charts_view(charts: &DashboardCharts) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts.handles() {
                    div
                        id=(chart.id())
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the script that draws the charts into their containers.
///
/// The script is rendered inline after the containers so that it also runs
/// when htmx swaps in new dashboard content. An existing ECharts instance for
/// a container is updated in place.
pub(crate) fn charts_script(charts: &DashboardCharts) -> Markup {
    let script_content = charts
        .handles()
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom || typeof echarts === "undefined") {{
                        return;
                    }}
                    let chart = echarts.getInstanceByDom(chartDom);
                    if (!chart) {{
                        chart = echarts.init(chartDom);
                        window.addEventListener('resize', () => chart.resize());

                        const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                        const updateTheme = () => {{
                            const isDarkMode = darkModeMediaQuery.matches;
                            chart.setTheme(isDarkMode ? 'dark' : 'default');
                        }}
                        darkModeMediaQuery.addEventListener('change', updateTheme);
                        updateTheme();
                    }}
                    chart.setOption({}, true);
                }})();"#,
                chart.id(),
                chart.options()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        script { (PreEscaped(script_content)) }
    )
}

fn category_chart(counts: &[(CategoryTag, usize)]) -> Chart {
    let colors: Vec<Color> = counts
        .iter()
        .map(|(category, _)| Color::from(category.color()))
        .collect();
    let data: Vec<(f64, &str)> = counts
        .iter()
        .map(|(category, count)| (*count as f64, category.label()))
        .collect();

    Chart::new()
        .title(Title::new().text("Transactions by Category").left("center"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter("{b}: {c} ({d}%)"),
        )
        .legend(Legend::new().bottom(0))
        .color(colors)
        .series(
            Pie::new()
                .name("Transactions")
                .radius(vec!["35%", "65%"])
                .data(data),
        )
}

fn volume_chart(totals: &[(Month, u64)]) -> Chart {
    let labels: Vec<String> = totals
        .iter()
        .map(|(month, _)| month_label(*month).to_owned())
        .collect();
    let values: Vec<f64> = totals.iter().map(|(_, amount)| *amount as f64).collect();

    Chart::new()
        .title(Title::new().text("Transaction Volume (RWF)"))
        .tooltip(rwf_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(rwf_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Transaction Volume (RWF)")
                .item_style(ItemStyle::new().color(VOLUME_BAR_COLOR))
                .data(values),
        )
}

#[inline]
fn rwf_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const formatter = new Intl.NumberFormat('en-US', { maximumFractionDigits: 0 });
            return (number) ? formatter.format(number) + ' RWF' : \"-\";",
    )
}

fn rwf_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(rwf_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{test_utils::dated_transaction, transaction::CategoryTag};

    use super::{
        CATEGORY_CHART_ID, ChartHandle, ChartSeries, DashboardCharts, VOLUME_CHART_ID,
        charts_script,
    };

    #[test]
    fn new_handle_has_empty_options() {
        let handle = ChartHandle::new("test-chart");

        assert_eq!(handle.id(), "test-chart");
        assert_eq!(handle.options(), "{}");
    }

    #[test]
    fn redraw_replaces_options() {
        let mut handle = ChartHandle::new(CATEGORY_CHART_ID);

        handle.redraw(&ChartSeries::Categories(vec![
            (CategoryTag::IncomingMoney, 3),
            (CategoryTag::Other, 1),
        ]));
        let first = handle.options().to_owned();
        handle.redraw(&ChartSeries::Categories(vec![(CategoryTag::BankDeposits, 7)]));

        assert!(first.contains("Incoming Money"));
        assert!(first.contains("#4CAF50"));
        assert!(handle.options().contains("Bank Deposits"));
        assert!(!handle.options().contains("Incoming Money"));
    }

    #[test]
    fn volume_chart_uses_brand_color_and_title() {
        let mut charts = DashboardCharts::default();

        charts.redraw(&[dated_transaction(
            "1",
            CategoryTag::Other,
            2500,
            date!(2024 - 03 - 01),
        )]);

        let options = charts.volume.options();
        assert!(options.contains("Transaction Volume (RWF)"));
        assert!(options.contains("#FFCC00"));
        assert!(options.contains("Mar"));
    }

    #[test]
    fn script_reuses_existing_instances() {
        let charts = DashboardCharts::default();

        let script = charts_script(&charts).into_string();

        assert!(script.contains("getInstanceByDom"));
        assert!(script.contains(CATEGORY_CHART_ID));
        assert!(script.contains(VOLUME_CHART_ID));
    }
}
