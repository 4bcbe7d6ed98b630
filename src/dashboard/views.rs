//! HTML views for the dashboard page and its partials.

use maud::{Markup, html};

use crate::{
    alert::Alert,
    dashboard::{
        aggregation::Metrics,
        charts::{DashboardCharts, charts_script, charts_view},
    },
    endpoints::{self, format_endpoint, with_query},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, background_color, base,
        format_count, format_rwf, format_volume_millions, loading_spinner,
    },
    source::RecordQuery,
    transaction::{
        CategoryTag, Period, TableConfig, Transaction, UNKNOWN_PARTY, is_fully_loaded, page,
    },
};

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// Everything needed to render the dashboard content for one period.
pub(crate) struct DashboardContent<'a> {
    pub query: &'a RecordQuery,
    pub period: Period,
    /// The transactions in `period`.
    pub transactions: &'a [Transaction],
    pub metrics: Option<Metrics>,
    pub charts: &'a DashboardCharts,
    pub table_config: TableConfig,
}

/// Renders the full dashboard page.
///
/// `alert` is shown on load, e.g. to warn that the data could not be refreshed.
pub(crate) fn dashboard_page(content: &DashboardContent, alert: Option<Alert>) -> Markup {
    let body = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            (filters_form(content.query))

            div
                id="dashboard-content"
                class="w-full"
            {
                (dashboard_content(content))
            }

            @if let Some(alert) = alert {
                (alert.into_html())
            }
        }
    );

    let scripts = [HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned())];

    base("Dashboard", &scripts, &body)
}

/// Renders the part of the dashboard that depends on the loaded data and the
/// selected period.
pub(crate) fn dashboard_content(content: &DashboardContent) -> Markup {
    let export_url = with_query(
        endpoints::EXPORT,
        &format!("period={}", content.period.as_query_value()),
    );

    html!(
        input
            type="hidden"
            id="current-period"
            name="period"
            value=(content.period.as_query_value());

        (period_buttons(content.period))

        @match content.metrics {
            Some(metrics) => (metrics_view(&metrics)),
            None => {
                p
                    id="no-data"
                    class="w-full my-6 text-center text-lg text-gray-600 dark:text-gray-400"
                {
                    "No transactions found for this period."
                }
            }
        }

        (charts_view(content.charts))
        (charts_script(content.charts))

        section class="w-full mb-8"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Transactions" }

                a
                    id="export-link"
                    href=(export_url)
                    download
                    class=(LINK_STYLE)
                {
                    "Export CSV"
                }
            }

            (transaction_table(
                content.transactions,
                content.period,
                content.table_config.default_limit,
                content.table_config,
            ))
        }

        section id="transaction-detail" class="w-full mb-8" {}
    )
}

fn filters_form(query: &RecordQuery) -> Markup {
    let selected_category = query.category.as_deref().unwrap_or_default();
    let min_amount = query.min_amount.map(|amount| amount.to_string());
    let max_amount = query.max_amount.map(|amount| amount.to_string());

    html!(
        form
            id="filters"
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-include="#current-period"
            hx-indicator="#indicator"
            class="w-full grid grid-cols-1 md:grid-cols-5 gap-4 items-end mb-6"
        {
            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                select id="type" name="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All Types" }

                    @for category in CategoryTag::ALL {
                        option
                            value=(category.label())
                            selected[selected_category == category.label()]
                        {
                            (category.label())
                        }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    id="date"
                    name="date"
                    value=[query.date.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="min_amount" class=(FORM_LABEL_STYLE) { "Min Amount" }

                input
                    type="number"
                    id="min_amount"
                    name="min_amount"
                    min="0"
                    placeholder="Min Amount"
                    value=[min_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="max_amount" class=(FORM_LABEL_STYLE) { "Max Amount" }

                input
                    type="number"
                    id="max_amount"
                    name="max_amount"
                    min="0"
                    placeholder="Max Amount"
                    value=[max_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Apply Filters"
            }
        }
    )
}

fn period_buttons(selected: Period) -> Markup {
    html!(
        div id="period-buttons" class="flex gap-2 mb-6"
        {
            @for period in Period::ALL {
                @let url = with_query(
                    endpoints::DASHBOARD_CONTENT,
                    &format!("period={}", period.as_query_value()),
                );
                @let style = if period == selected {
                    format!("{BUTTON_SECONDARY_STYLE} active bg-yellow-400 border-yellow-400")
                } else {
                    BUTTON_SECONDARY_STYLE.to_owned()
                };

                button
                    type="button"
                    hx-get=(url)
                    hx-target="#dashboard-content"
                    hx-target-error="#alert-container"
                    hx-swap="innerHTML"
                    aria-pressed=(period == selected)
                    class=(style)
                {
                    (period.label())
                }
            }
        }
    )
}

fn metrics_view(metrics: &Metrics) -> Markup {
    let dominant_color = background_color(metrics.dominant_category.color());
    let progress_width = format!("width: {}%;", metrics.dominant_percentage);

    html!(
        section
            id="metrics"
            class="w-full grid grid-cols-1 md:grid-cols-4 gap-4 mb-6"
        {
            div class=(CARD_STYLE)
            {
                h4 class="text-sm text-gray-600 dark:text-gray-400" { "Total Transactions" }
                p id="total-transactions" class="text-2xl font-bold" { (format_count(metrics.total_count)) }
            }

            div class=(CARD_STYLE)
            {
                h4 class="text-sm text-gray-600 dark:text-gray-400" { "Total Volume" }
                p id="total-volume" class="text-2xl font-bold" { (format_volume_millions(metrics.total_volume)) }
            }

            div class=(CARD_STYLE)
            {
                h4 class="text-sm text-gray-600 dark:text-gray-400" { "Total Fees" }
                p id="total-fees" class="text-2xl font-bold" { (format_rwf(metrics.total_fees)) }
            }

            div class=(CARD_STYLE)
            {
                h4 class="text-sm text-gray-600 dark:text-gray-400" { "Most Common Type" }
                p id="dominant-category" class="text-lg font-bold" { (metrics.dominant_category) }

                div class="w-full h-2 mt-2 bg-gray-200 rounded-full dark:bg-gray-700"
                {
                    div
                        class="h-2 rounded-full"
                        style={(dominant_color) " " (progress_width)}
                    {}
                }

                p id="dominant-percentage" class="text-sm mt-1 text-gray-600 dark:text-gray-400"
                {
                    (metrics.dominant_percentage) "% of total"
                }
            }
        }
    )
}

/// Renders the transaction table showing the first `limit` transactions.
///
/// The "Show More" button replaces the table with one that has
/// [TableConfig::step] more rows.
pub(crate) fn transaction_table(
    transactions: &[Transaction],
    period: Period,
    limit: usize,
    config: TableConfig,
) -> Markup {
    let rows = page(transactions, Some(limit));
    let fully_loaded = is_fully_loaded(transactions.len(), Some(limit));
    let show_more_url = with_query(
        endpoints::DASHBOARD_TABLE,
        &format!(
            "period={}&limit={}",
            period.as_query_value(),
            config.next_limit(limit)
        ),
    );

    html!(
        div id="transaction-table"
        {
            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "From" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "To" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        }
                    }

                    tbody
                    {
                        @for transaction in rows {
                            (transaction_row(transaction))
                        }

                        @if rows.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="6" class={(TABLE_CELL_STYLE) " text-center"}
                                {
                                    "No transactions found"
                                }
                            }
                        }
                    }
                }
            }

            div class="flex justify-center mt-4"
            {
                @if fully_loaded {
                    button
                        type="button"
                        id="show-more"
                        disabled
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "All transactions loaded"
                    }
                } @else {
                    button
                        type="button"
                        id="show-more"
                        hx-get=(show_more_url)
                        hx-target="#transaction-table"
                        hx-target-error="#alert-container"
                        hx-swap="outerHTML"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Show More"
                    }
                }
            }
        }
    )
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let detail_url = format_endpoint(endpoints::TRANSACTION_DETAIL, &transaction.id);

    html!(
        tr
            class=(TABLE_ROW_STYLE)
            data-transaction-id=(transaction.id)
            hx-get=(detail_url)
            hx-target="#transaction-detail"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
        {
            td class=(TABLE_CELL_STYLE) { (transaction.display_date) }
            td class=(TABLE_CELL_STYLE) { (category_badge(transaction.category)) }
            td class=(TABLE_CELL_STYLE) { (format_rwf(transaction.amount)) }
            td class=(TABLE_CELL_STYLE) { (transaction.sender) }
            td class=(TABLE_CELL_STYLE) { (transaction.recipient) }
            td class=(TABLE_CELL_STYLE) { (transaction.status) }
        }
    )
}

fn category_badge(category: CategoryTag) -> Markup {
    html!(
        span class=(CATEGORY_BADGE_STYLE) style=(background_color(category.color()))
        {
            (category)
        }
    )
}

/// Renders the detail panel for a single transaction.
pub(crate) fn transaction_detail(transaction: &Transaction) -> Markup {
    let optional = |value: &Option<String>| {
        value
            .clone()
            .unwrap_or_else(|| UNKNOWN_PARTY.to_owned())
    };

    html!(
        div class=(CARD_STYLE)
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Transaction Details" }

                button
                    type="button"
                    aria-label="Close"
                    class=(LINK_STYLE)
                    onclick="document.getElementById('transaction-detail').innerHTML = ''"
                {
                    "Close"
                }
            }

            dl class="grid grid-cols-1 md:grid-cols-2 gap-x-6 gap-y-2"
            {
                dt class="font-medium" { "Date" }
                dd { (transaction.display_date) }

                dt class="font-medium" { "Type" }
                dd { (category_badge(transaction.category)) }

                dt class="font-medium" { "Amount" }
                dd { (format_rwf(transaction.amount)) }

                dt class="font-medium" { "Fee" }
                dd { (format_rwf(transaction.fee)) }

                dt class="font-medium" { "From" }
                dd { (transaction.sender) }

                dt class="font-medium" { "To" }
                dd { (transaction.recipient) }

                dt class="font-medium" { "Status" }
                dd { (transaction.status) }

                dt class="font-medium" { "Code" }
                dd { (optional(&transaction.code)) }

                dt class="font-medium" { "Account or Phone" }
                dd { (optional(&transaction.account_or_phone)) }

                @if transaction.has_unreliable_date() {
                    dt class="font-medium" { "Note" }
                    dd { "The date of this transaction could not be read." }
                }
            }

            @if let Some(raw_text) = &transaction.raw_text {
                h4 class="font-medium mt-4" { "Message" }
                p class="text-sm text-gray-600 dark:text-gray-400 whitespace-pre-wrap" { (raw_text) }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        dashboard::{aggregation::aggregate, charts::DashboardCharts},
        source::RecordQuery,
        test_utils::{assert_valid_html, dated_transaction, undated_transaction},
        transaction::{CategoryTag, Period, TableConfig, Transaction},
    };

    use super::{DashboardContent, dashboard_content, dashboard_page, transaction_detail, transaction_table};

    fn transactions(count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| {
                dated_transaction(
                    &format!("t{i}"),
                    CategoryTag::IncomingMoney,
                    1000,
                    date!(2024 - 03 - 01),
                )
            })
            .collect()
    }

    fn text_of(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    fn count(html: &Html, selector: &str) -> usize {
        html.select(&Selector::parse(selector).unwrap()).count()
    }

    #[test]
    fn table_shows_first_page_and_show_more() {
        let transactions = transactions(12);

        let html = transaction_table(&transactions, Period::AllTime, 5, TableConfig::default());
        let html = Html::parse_fragment(&html.into_string());

        assert_eq!(count(&html, "tbody tr"), 5);
        assert_eq!(text_of(&html, "#show-more"), "Show More");
        let show_more = html
            .select(&Selector::parse("#show-more").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            show_more.value().attr("hx-get"),
            Some("/dashboard/table?period=alltime&limit=10")
        );
    }

    #[test]
    fn table_disables_show_more_when_everything_is_shown() {
        let transactions = transactions(12);

        let html = transaction_table(&transactions, Period::Weekly, 15, TableConfig::default());
        let html = Html::parse_fragment(&html.into_string());

        assert_eq!(count(&html, "tbody tr"), 12);
        assert_eq!(text_of(&html, "#show-more"), "All transactions loaded");
        assert_eq!(count(&html, "#show-more[disabled]"), 1);
    }

    #[test]
    fn empty_table_says_so() {
        let html = transaction_table(&[], Period::Daily, 5, TableConfig::default());
        let html = Html::parse_fragment(&html.into_string());

        assert_eq!(text_of(&html, "tbody td"), "No transactions found");
    }

    #[test]
    fn rows_link_to_detail_panel() {
        let transactions = transactions(1);

        let html = transaction_table(&transactions, Period::AllTime, 5, TableConfig::default());
        let html = Html::parse_fragment(&html.into_string());
        let row = html
            .select(&Selector::parse("tbody tr").unwrap())
            .next()
            .unwrap();

        assert_eq!(row.value().attr("hx-get"), Some("/transactions/t0"));
        assert_eq!(row.value().attr("hx-target"), Some("#transaction-detail"));
    }

    #[test]
    fn content_shows_metrics() {
        let transactions = transactions(3);
        let mut charts = DashboardCharts::default();
        charts.redraw(&transactions);
        let query = RecordQuery::default();
        let content = DashboardContent {
            query: &query,
            period: Period::AllTime,
            transactions: &transactions,
            metrics: aggregate(&transactions),
            charts: &charts,
            table_config: TableConfig::default(),
        };

        let html = Html::parse_fragment(&dashboard_content(&content).into_string());

        assert_eq!(text_of(&html, "#total-transactions"), "3");
        assert_eq!(text_of(&html, "#total-volume"), "0.0M RWF");
        assert_eq!(text_of(&html, "#dominant-category"), "Incoming Money");
        assert_eq!(text_of(&html, "#dominant-percentage"), "100% of total");
        assert_eq!(count(&html, "#category-chart"), 1);
        assert_eq!(count(&html, "#volume-chart"), 1);
        assert_eq!(count(&html, "#no-data"), 0);
    }

    #[test]
    fn content_without_transactions_shows_message() {
        let charts = DashboardCharts::default();
        let query = RecordQuery::default();
        let content = DashboardContent {
            query: &query,
            period: Period::Daily,
            transactions: &[],
            metrics: None,
            charts: &charts,
            table_config: TableConfig::default(),
        };

        let html = Html::parse_fragment(&dashboard_content(&content).into_string());

        assert_eq!(text_of(&html, "#no-data"), "No transactions found for this period.");
        assert_eq!(count(&html, "#metrics"), 0);
        assert_eq!(text_of(&html, "tbody td"), "No transactions found");
    }

    #[test]
    fn selected_period_is_marked() {
        let charts = DashboardCharts::default();
        let query = RecordQuery::default();
        let content = DashboardContent {
            query: &query,
            period: Period::Monthly,
            transactions: &[],
            metrics: None,
            charts: &charts,
            table_config: TableConfig::default(),
        };

        let html = Html::parse_fragment(&dashboard_content(&content).into_string());

        assert_eq!(text_of(&html, "#period-buttons [aria-pressed=true]"), "Monthly");
        assert_eq!(count(&html, "#period-buttons button"), 4);
        let export = html
            .select(&Selector::parse("#export-link").unwrap())
            .next()
            .unwrap();
        assert_eq!(export.value().attr("href"), Some("/export?period=monthly"));
    }

    #[test]
    fn page_keeps_filter_values() {
        let charts = DashboardCharts::default();
        let query = RecordQuery {
            category: Some("Bank Deposits".to_owned()),
            date: Some("2024-03-01".to_owned()),
            min_amount: Some(100),
            max_amount: None,
        };
        let content = DashboardContent {
            query: &query,
            period: Period::AllTime,
            transactions: &[],
            metrics: None,
            charts: &charts,
            table_config: TableConfig::default(),
        };

        let html = Html::parse_document(&dashboard_page(&content, None).into_string());

        assert_valid_html(&html);
        assert_eq!(text_of(&html, "#type option[selected]"), "Bank Deposits");
        let date = html
            .select(&Selector::parse("#date").unwrap())
            .next()
            .unwrap();
        assert_eq!(date.value().attr("value"), Some("2024-03-01"));
        let min_amount = html
            .select(&Selector::parse("#min_amount").unwrap())
            .next()
            .unwrap();
        assert_eq!(min_amount.value().attr("value"), Some("100"));
        let max_amount = html
            .select(&Selector::parse("#max_amount").unwrap())
            .next()
            .unwrap();
        assert_eq!(max_amount.value().attr("value"), None);
    }

    #[test]
    fn detail_panel_shows_every_field() {
        let mut transaction =
            dated_transaction("abc", CategoryTag::CodeHolderPayments, 5000, date!(2024 - 05 - 10));
        transaction.fee = 100;
        transaction.recipient = "Jane Smith".to_owned();
        transaction.code = Some("12845".to_owned());
        transaction.raw_text = Some("Your payment of 5,000 RWF to Jane Smith 12845".to_owned());

        let html = Html::parse_fragment(&transaction_detail(&transaction).into_string());
        let text = html.root_element().text().collect::<String>();

        assert!(text.contains("May 10, 2024"));
        assert!(text.contains("Payments to Code Holders"));
        assert!(text.contains("Jane Smith"));
        assert!(text.contains("12845"));
        assert!(text.contains("Your payment of 5,000 RWF"));
        assert!(text.contains("Completed"));
    }

    #[test]
    fn detail_panel_notes_unreliable_dates() {
        let transaction = undated_transaction("x", CategoryTag::Other, 1, "last tuesday");

        let html = Html::parse_fragment(&transaction_detail(&transaction).into_string());
        let text = html.root_element().text().collect::<String>();

        assert!(text.contains("last tuesday"));
        assert!(text.contains("could not be read"));
    }
}
