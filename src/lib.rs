//! Exchequer is a web app for tracking budgets and spending across currencies.
//!
//! This library provides the HTML pages for budget reports and a JSON API for
//! managing currency exchange rates.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod budget;
mod currency;
mod database_id;
mod db;
mod endpoints;
mod exchange_rate;
mod html;
mod internal_server_error;
mod journal;
mod json_api;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod timezone;
mod user_group;

#[cfg(test)]
mod test_utils;

pub use account::{Account, AccountType, NewAccount, create_account};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_id, update_password,
};
pub use budget::{Budget, BudgetLimit, NewBudgetLimit, create_budget, create_budget_limit};
pub use currency::{Currency, get_currency_by_code};
pub use db::initialize as initialize_db;
pub use exchange_rate::{ExchangeRate, NewExchangeRate, create_exchange_rate};
pub use journal::{Journal, NewJournal, TransactionType, create_journal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use user_group::{UserGroup, UserGroupId, create_user_group};

use crate::{
    alert::Alert, html::error_page, internal_server_error::InternalServerError,
    json_api::{ErrorDocument, ValidationErrors},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth cookie could not be decoded or has expired.
    #[error("the auth token is invalid or has expired")]
    InvalidToken,

    /// The request requires a logged in user, but no user ID was attached to it.
    #[error("the request is not authenticated")]
    Unauthenticated,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The user asked for a user group they are not a member of.
    #[error("the user is not a member of the user group {0}")]
    UserGroupForbidden(UserGroupId),

    /// The fields of a JSON API request failed validation.
    #[error("the request data is invalid: {0:?}")]
    InvalidRequest(ValidationErrors),

    /// The body or query of a JSON API request could not be read, e.g. the body
    /// is not valid JSON or has the wrong content type.
    #[error("could not read the request: {message}")]
    MalformedRequest {
        /// The status code to respond with, e.g. 400 for a JSON syntax error.
        status: StatusCode,
        /// Why the request was rejected.
        message: String,
    },

    /// An exchange rate already exists for the currency pair and date.
    #[error("an exchange rate already exists for this currency pair and date")]
    DuplicateExchangeRate,

    /// A journal was given an amount that is zero, negative or not a number.
    #[error("{0} is not a valid journal amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// A journal was given the same account as its source and destination.
    #[error("a journal cannot move money from an account to itself")]
    SameSourceAndDestination,

    /// A date range ends before it starts.
    #[error("the end date {end} is before the start date {start}")]
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },

    /// A report was requested without any accounts.
    #[error("a report needs at least one account")]
    EmptyAccountSelection,

    /// A report was requested without any budgets.
    #[error("a report needs at least one budget")]
    EmptyBudgetSelection,

    /// A report could not be generated.
    #[error("{0}")]
    ReportGenerationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067
                    && desc.contains("currency_exchange_rate.") =>
            {
                Error::DuplicateExchangeRate
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidDateRange { .. } => error_page(
                StatusCode::BAD_REQUEST,
                "End date must be after start date.",
                "Pick an end date that is on or after the start date.",
            ),
            Error::UserGroupForbidden(_) => error_page(
                StatusCode::FORBIDDEN,
                "You do not have access to this financial administration.",
                "Ask the owner of the administration to add you as a member.",
            ),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for HTMX requests.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidDateRange { start, end } => Alert::error(
                "Invalid date range",
                &format!("The end date {end} is before the start date {start}."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptyAccountSelection => Alert::error(
                "No accounts selected",
                "Select at least one account to include in the report.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptyBudgetSelection => Alert::error(
                "No budgets selected",
                "Select at least one budget to include in the report.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::UserGroupForbidden(_) => Alert::error(
                "Forbidden",
                "You do not have access to this financial administration.",
            )
            .into_response_with_status(StatusCode::FORBIDDEN),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Render the error as a JSON body for the JSON API.
    fn into_api_response(self) -> Response {
        match self {
            Error::Unauthenticated | Error::CookieMissing | Error::InvalidToken => {
                ErrorDocument::new("Unauthenticated.").into_response(StatusCode::UNAUTHORIZED)
            }
            Error::NotFound => {
                ErrorDocument::new("Resource not found").into_response(StatusCode::NOT_FOUND)
            }
            Error::UserGroupForbidden(_) => {
                ErrorDocument::new("You do not have access to this financial administration.")
                    .into_response(StatusCode::FORBIDDEN)
            }
            Error::InvalidRequest(errors) => errors.into_response(),
            Error::MalformedRequest { status, message } => {
                ErrorDocument::new(&message).into_response(status)
            }
            Error::DuplicateExchangeRate => ErrorDocument::with_field_error(
                "date",
                "An exchange rate for this currency pair and date already exists.",
            )
            .into_response(StatusCode::UNPROCESSABLE_ENTITY),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorDocument::new("Internal server error")
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use time::macros::date;

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn html_response_status_codes() {
        assert_eq!(
            Error::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidDateRange {
                start: date!(2024 - 02 - 01),
                end: date!(2024 - 01 - 01)
            }
            .into_response()
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::UserGroupForbidden(2).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::DatabaseLockError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_response_status_codes() {
        assert_eq!(
            Error::Unauthenticated.into_api_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::NotFound.into_api_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::UserGroupForbidden(2).into_api_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::DuplicateExchangeRate.into_api_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::MalformedRequest {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                message: "Expected request with `Content-Type: application/json`".to_owned(),
            }
            .into_api_response()
            .status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            Error::DatabaseLockError.into_api_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn alert_response_status_codes() {
        assert_eq!(
            Error::EmptyAccountSelection.into_alert_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::EmptyBudgetSelection.into_alert_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::SqlError(rusqlite::Error::InvalidQuery)
                .into_alert_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
