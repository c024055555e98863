//! Defines the JSON API endpoint for changing an exchange rate.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    exchange_rate::{
        ExchangeRateId, ExchangeRateState,
        core::{get_exchange_rate, update_exchange_rate},
        request::UpdateExchangeRateRequest,
        transformer::ExchangeRateTransformer,
    },
    json_api::{ApiError, Document},
    user_group::ValidatedUserGroup,
};

/// Set the rate, and optionally the date, of an exchange rate in the user's group.
///
/// Responds with the updated rate, 404 if the rate is not in the group,
/// 422 if the body fails validation, or 400 if the body is not valid JSON.
pub async fn update_exchange_rate_endpoint(
    State(state): State<ExchangeRateState>,
    path: Result<Path<ExchangeRateId>, PathRejection>,
    user_group: Result<ValidatedUserGroup, Error>,
    body: Result<Json<UpdateExchangeRateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_group = user_group?;
    let Path(exchange_rate_id) = path.map_err(|_| Error::NotFound)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let exchange_rate = get_exchange_rate(exchange_rate_id, user_group.id(), &connection)?;
    let Json(request) = body?;
    let update = request.validate()?;

    tracing::debug!(
        "Updating exchange rate {exchange_rate_id} to {} on {:?}",
        update.rate,
        update.date
    );

    let updated = update_exchange_rate(&exchange_rate, update.rate, update.date, &connection)
        .inspect_err(|error| {
            tracing::debug!("Could not update exchange rate {exchange_rate_id}: {error}")
        })?;
    let resource = ExchangeRateTransformer::new(&connection).transform(&updated)?;

    Ok(Document::single(resource).into_response(StatusCode::OK))
}
