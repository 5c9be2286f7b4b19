//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, budget_item::BudgetItemId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested budget item was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the budget item has not been deleted.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested budget item could not be found")]
    NotFound,

    /// A budget item with the given ID already exists in the database.
    #[error("a budget item with the ID {0} already exists")]
    DuplicateKey(BudgetItemId),

    /// A field was missing or held a value that is not allowed, e.g., a
    /// negative or non-numeric amount.
    ///
    /// The message is intended to be shown to the user.
    #[error("{0}")]
    Validation(String),

    /// The database connection could not be used, e.g., the lock guarding it
    /// was poisoned by a panicking request.
    #[error("could not acquire the database connection")]
    ConnectionError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The CSV had issues that prevented it from being loaded.
    #[error("could not load the CSV file: {0}")]
    InvalidCSV(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateKey(_) => StatusCode::CONFLICT,
            Error::Validation(_) | Error::InvalidCSV(_) => StatusCode::BAD_REQUEST,
            Error::ConnectionError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to a client.
    ///
    /// Server-side failures are replaced with a generic message, the details
    /// should be logged instead.
    pub fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            _ => self.to_string(),
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();
        let alert = match self {
            Error::NotFound => Alert::Error {
                message: "Budget item not found".to_owned(),
                details: "The budget item could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                    .to_owned(),
            },
            Error::DuplicateKey(id) => Alert::Error {
                message: "Duplicate budget item ID".to_owned(),
                details: format!(
                    "A budget item with the ID {id} already exists. \
                    Choose a different ID, or edit the existing budget item."
                ),
            },
            Error::Validation(details) => Alert::Error {
                message: "Invalid budget item".to_owned(),
                details,
            },
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: error.client_message(),
                }
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::ConnectionError => InternalServerError {
                description: "Database Unavailable",
                fix: "Could not access the database. Try again later or check the server logs.",
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
