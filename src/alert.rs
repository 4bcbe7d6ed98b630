//! Alerts for displaying warnings and errors to users.
//!
//! Alerts are swapped into the `#alert-container` element of the base page
//! by htmx.

use maud::{Markup, html};

/// An alert message with its styling.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Warning { message: String, details: String },
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details, container_style, icon_style) = match &self {
            Alert::Warning { message, details } => (
                message,
                details,
                "text-yellow-800 border-yellow-300 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800",
                "text-yellow-500 dark:text-yellow-300",
            ),
            Alert::Error { message, details } => (
                message,
                details,
                "text-red-800 border-red-300 bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                "text-red-500 dark:text-red-400",
            ),
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class={"flex items-start p-4 mb-4 border rounded-lg " (container_style)}
                {
                    span class={"shrink-0 me-3 font-bold " (icon_style)} { "!" }

                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Close"
                        class="ms-3 text-sm font-medium"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let alert = Alert::Error {
            message: "Could not load transactions".to_owned(),
            details: "Try again".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());
        let selector = Selector::parse("[role=alert] p").unwrap();
        let text: Vec<_> = html
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .collect();

        assert_eq!(text, ["Could not load transactions", "Try again"]);
    }

    #[test]
    fn empty_details_are_omitted() {
        let alert = Alert::Warning {
            message: "Showing previous data".to_owned(),
            details: String::new(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());
        let selector = Selector::parse("[role=alert] p").unwrap();

        assert_eq!(html.select(&selector).count(), 1);
    }
}
