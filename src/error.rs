//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The record source could not be reached, responded with an error
    /// status, or could not be read.
    #[error("could not fetch transactions: {0}")]
    TransportFailure(String),

    /// The record source responded with something other than a JSON array.
    #[error("the record source returned a malformed payload: {0}")]
    MalformedPayload(String),

    /// The record source returned no usable transactions.
    ///
    /// `received` is the number of records in the payload. Zero means the
    /// source had no records, otherwise every record failed to normalize.
    #[error("no transactions in a payload of {received} records")]
    EmptyResult {
        /// The number of records in the payload.
        received: usize,
    },

    /// The requested resource was not found.
    ///
    /// For the detail panel, the transaction ID is not in the current snapshot.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The transactions could not be written as CSV.
    #[error("could not export transactions as CSV: {0}")]
    CsvExport(String),

    /// The SMS backup could not be converted into records.
    #[error("could not import SMS backup: {0}")]
    SmsImport(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::TransportFailure(_) => InternalServerError {
                status: StatusCode::BAD_GATEWAY,
                description: "Could not load transactions",
                fix: "The transactions service is not responding. Check that it is running and try again.",
            }
            .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::TransportFailure(_) => (
                StatusCode::BAD_GATEWAY,
                Alert::Error {
                    message: "Could not load transactions".to_owned(),
                    details: "The transactions service is not responding. \
                        Check that it is running and try again."
                        .to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Transaction not found".to_owned(),
                    details: "The transaction is not in the loaded data. \
                        Try refreshing the page to load the latest transactions."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_content_type, parse_html_fragment};

    use super::Error;

    #[tokio::test]
    async fn transport_failure_alert_is_bad_gateway() {
        let response = Error::TransportFailure("connection refused".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("Could not load transactions"));
        assert!(!html.html().contains("connection refused"));
    }

    #[tokio::test]
    async fn not_found_alert_is_404() {
        let response = Error::NotFound.into_alert_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_page_is_404() {
        assert_eq!(Error::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unexpected_errors_are_500() {
        let response = Error::CsvExport("disk full".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_result_distinguishes_empty_input() {
        assert_ne!(
            Error::EmptyResult { received: 0 },
            Error::EmptyResult { received: 3 }
        );
        assert_eq!(
            Error::EmptyResult { received: 3 }.to_string(),
            "no transactions in a payload of 3 records"
        );
    }
}
