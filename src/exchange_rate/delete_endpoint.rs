//! Defines the JSON API endpoint for deleting an exchange rate.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    exchange_rate::{ExchangeRateId, ExchangeRateState, core::delete_exchange_rate},
    json_api::ApiError,
    user_group::ValidatedUserGroup,
};

pub async fn delete_exchange_rate_endpoint(
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

    delete_exchange_rate(exchange_rate_id, user_group.id(), &connection).inspect_err(|error| {
        tracing::debug!("Could not delete exchange rate {exchange_rate_id}: {error}")
    })?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
