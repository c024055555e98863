//! The page shown when the server cannot complete a request.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_page;

pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        error_page(StatusCode::INTERNAL_SERVER_ERROR, self.description, self.fix)
    }
}

/// The page that HTMX handlers redirect to when they fail.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}
