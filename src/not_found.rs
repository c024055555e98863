//! The page to display when a resource or route cannot be found.
use axum::{http::StatusCode, response::Response};

use crate::html::error_page;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    error_page(
        StatusCode::NOT_FOUND,
        "Something's missing.",
        "The page, account or budget you asked for does not exist in this administration.",
    )
}
