//! Defines the JSON API endpoint for recording a new exchange rate.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    exchange_rate::{
        ExchangeRateState, NewExchangeRate, create_exchange_rate,
        request::StoreExchangeRateRequest, transformer::ExchangeRateTransformer,
    },
    json_api::{ApiError, Document},
    user_group::ValidatedUserGroup,
};

/// Record a new exchange rate in the user's group and respond with 201 and the stored rate.
pub async fn store_exchange_rate_endpoint(
    State(state): State<ExchangeRateState>,
    user_group: Result<ValidatedUserGroup, Error>,
    body: Result<Json<StoreExchangeRateRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_group = user_group?;
    let Json(request) = body?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let validated = request.validate(&connection)?;

    let new_rate = NewExchangeRate {
        user_group_id: user_group.id(),
        from_currency_id: validated.from.id,
        to_currency_id: validated.to.id,
        date: validated.date,
        rate: validated.rate,
    };

    let exchange_rate = create_exchange_rate(new_rate, &connection)
        .inspect_err(|error| tracing::debug!("Could not store exchange rate: {error}"))?;
    let resource = ExchangeRateTransformer::new(&connection).transform(&exchange_rate)?;

    Ok(Document::single(resource).into_response(StatusCode::CREATED))
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        body::{Bytes, to_bytes},
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        exchange_rate::{
            core::count_exchange_rates,
            test_utils::{TestContext, get_test_context, get_test_server},
        },
    };

    use super::{StoreExchangeRateRequest, store_exchange_rate_endpoint};

    async fn post(context: &TestContext, body: Value) -> Response {
        store_exchange_rate_endpoint(
            State(context.state.clone()),
            Ok(context.user_group.clone()),
            Ok(Json(
                serde_json::from_value::<StoreExchangeRateRequest>(body).unwrap(),
            )),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn stores_rate() {
        let context = get_test_context();

        let response = post(
            &context,
            json!({"from": "EUR", "to": "USD", "date": "2024-02-29", "rate": 1.0812}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"]["attributes"]["date"], "2024-02-29");
        assert_eq!(body["data"]["attributes"]["rate"], "1.081200000000");
    }

    #[tokio::test]
    async fn duplicate_rate_is_422() {
        let context = get_test_context();
        let body = json!({"from": "EUR", "to": "USD", "date": "2024-02-29", "rate": 1.08});
        post(&context, body.clone()).await;

        let response = post(&context, body).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let connection = context.state.db_connection.lock().unwrap();
        assert_eq!(
            count_exchange_rates(context.user_group.id(), &connection),
            Ok(1)
        );
    }

    #[tokio::test]
    async fn invalid_body_is_422() {
        let context = get_test_context();

        let response = post(&context, json!({"from": "EUR", "to": "EUR", "rate": -2})).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["errors"]["date"].is_array());
        assert!(body["errors"]["rate"].is_array());
        assert!(body["errors"]["to"].is_array());
    }

    #[tokio::test]
    async fn malformed_json_is_400_with_json_body() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::EXCHANGE_RATES_API)
            .bytes(Bytes::from_static(b"{not json"))
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].is_string(), "want a message, got {body}");
        assert_eq!(body["errors"], json!({}));
    }

    #[tokio::test]
    async fn missing_content_type_is_415_with_json_body() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::EXCHANGE_RATES_API)
            .bytes(Bytes::from_static(
                br#"{"from": "EUR", "to": "USD", "date": "2024-02-29", "rate": 1.08}"#,
            ))
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = response.json();
        assert!(body["message"].is_string(), "want a message, got {body}");
    }

    #[tokio::test]
    async fn stores_rate_over_http() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::EXCHANGE_RATES_API)
            .json(&json!({"from": "EUR", "to": "USD", "date": "2024-02-29", "rate": 1.08}))
            .await;

        response.assert_status(StatusCode::CREATED);
    }
}
