//! Defines the page to display when the server cannot serve a request.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// An error page for 5xx responses.
pub struct InternalServerError<'a> {
    pub status: StatusCode,
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl InternalServerError<'_> {
    pub fn into_html(self) -> Html<String> {
        let title = self
            .status
            .canonical_reason()
            .unwrap_or("Internal Server Error");

        Html(error_view(title, self.status.as_str(), self.description, self.fix).into_string())
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let status = self.status;

        (status, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::InternalServerError;

    #[tokio::test]
    async fn renders_status_and_fix() {
        let response = InternalServerError {
            status: StatusCode::BAD_GATEWAY,
            description: "Could not load transactions",
            fix: "Check the transactions service",
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.html();
        assert!(text.contains("502"));
        assert!(text.contains("Check the transactions service"));
    }
}
