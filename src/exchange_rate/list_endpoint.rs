//! Defines the JSON API endpoint for listing a group's exchange rates a page at a time.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{
    Error, endpoints,
    exchange_rate::{
        ExchangeRateState,
        core::{count_exchange_rates, get_exchange_rates},
        transformer::ExchangeRateTransformer,
    },
    json_api::{ApiError, Document},
    pagination::{Page, PageQuery},
    user_group::ValidatedUserGroup,
};

pub async fn list_exchange_rates_endpoint(
    State(state): State<ExchangeRateState>,
    user_group: Result<ValidatedUserGroup, Error>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let user_group = user_group?;
    let Query(query) = query?;
    let page = Page::from_query(&query, &state.pagination_config);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    build_page(&user_group, page, &connection)
        .inspect_err(|error| tracing::error!("Could not list exchange rates: {error}"))
        .map_err(ApiError::from)
}

fn build_page(
    user_group: &ValidatedUserGroup,
    page: Page,
    connection: &Connection,
) -> Result<Response, Error> {
    let total = count_exchange_rates(user_group.id(), connection)?;
    let exchange_rates = get_exchange_rates(user_group.id(), page, connection)?;
    let resources = ExchangeRateTransformer::new(connection).transform_all(&exchange_rates)?;

    Ok(
        Document::page(resources, page, total, endpoints::EXCHANGE_RATES_API)
            .into_response(StatusCode::OK),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::{Value, json};
    use time::{Date, Month};

    use crate::{
        endpoints,
        exchange_rate::{
            NewExchangeRate, create_exchange_rate,
            test_utils::{get_test_context, get_test_server},
        },
        pagination::PageQuery,
    };

    use super::list_exchange_rates_endpoint;

    #[tokio::test]
    async fn lists_page_with_pagination() {
        let context = get_test_context();
        {
            let connection = context.state.db_connection.lock().unwrap();
            for day in 1..=3 {
                create_exchange_rate(
                    NewExchangeRate {
                        user_group_id: context.user_group.id(),
                        from_currency_id: context.euro_id,
                        to_currency_id: context.dollar_id,
                        date: Date::from_calendar_date(2024, Month::May, day).unwrap(),
                        rate: 1.0 + day as f64 / 10.0,
                    },
                    &connection,
                )
                .unwrap();
            }
        }

        let response = list_exchange_rates_endpoint(
            State(context.state.clone()),
            Ok(context.user_group.clone()),
            Ok(Query(PageQuery {
                page: Some(1),
                limit: Some(2),
            })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        let dates: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|resource| resource["attributes"]["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-02"]);
        assert_eq!(
            body["meta"]["pagination"],
            json!({"total": 3, "count": 2, "per_page": 2, "current_page": 1, "total_pages": 2})
        );
        assert_eq!(
            body["links"]["last"],
            "/api/v2/exchange-rates?page=2&limit=2"
        );
    }

    #[tokio::test]
    async fn empty_group_has_one_empty_page() {
        let context = get_test_context();

        let response = list_exchange_rates_endpoint(
            State(context.state.clone()),
            Ok(context.user_group.clone()),
            Ok(Query(PageQuery::default())),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["meta"]["pagination"]["total_pages"], 1);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let context = get_test_context();
        {
            let connection = context.state.db_connection.lock().unwrap();
            create_exchange_rate(
                NewExchangeRate {
                    user_group_id: context.user_group.id(),
                    from_currency_id: context.euro_id,
                    to_currency_id: context.dollar_id,
                    date: Date::from_calendar_date(2024, Month::May, 1).unwrap(),
                    rate: 1.1,
                },
                &connection,
            )
            .unwrap();
        }

        let response = list_exchange_rates_endpoint(
            State(context.state.clone()),
            Ok(context.user_group.clone()),
            Ok(Query(PageQuery {
                page: Some(u64::MAX),
                limit: None,
            })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["meta"]["pagination"]["total"], 1);
        assert_eq!(body["meta"]["pagination"]["count"], 0);
    }

    #[tokio::test]
    async fn invalid_query_is_400_with_json_body() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::EXCHANGE_RATES_API)
            .add_query_param("page", "first")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"].is_string(), "want a message, got {body}");
    }
}
