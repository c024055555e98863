//! Defines the JSON API endpoint for fetching a single exchange rate.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    exchange_rate::{
        ExchangeRateId, ExchangeRateState, core::get_exchange_rate,
        transformer::ExchangeRateTransformer,
    },
    json_api::{ApiError, Document},
    user_group::ValidatedUserGroup,
};

pub async fn show_exchange_rate_endpoint(
    State(state): State<ExchangeRateState>,
    path: Result<Path<ExchangeRateId>, PathRejection>,
    user_group: Result<ValidatedUserGroup, Error>,
) -> Result<Response, ApiError> {
    let user_group = user_group?;
    let Path(exchange_rate_id) = path.map_err(|_| Error::NotFound)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let exchange_rate = get_exchange_rate(exchange_rate_id, user_group.id(), &connection)?;
    let resource = ExchangeRateTransformer::new(&connection).transform(&exchange_rate)?;

    Ok(Document::single(resource).into_response(StatusCode::OK))
}
