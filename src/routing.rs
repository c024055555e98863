//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_api, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    endpoints,
    exchange_rate::{
        delete_exchange_rate_endpoint, list_exchange_rates_endpoint, show_exchange_rate_endpoint,
        store_exchange_rate_endpoint, update_exchange_rate_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{get_budget_report_page, get_reports_page, post_report_options},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::BUDGET_REPORT_VIEW, get(get_budget_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // The report form is submitted by HTMX, so auth redirects must use the HX-Redirect header.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::BUDGET_REPORT_API, post(post_report_options))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    let json_api_routes = Router::new()
        .route(
            endpoints::EXCHANGE_RATES_API,
            get(list_exchange_rates_endpoint).post(store_exchange_rate_endpoint),
        )
        .route(
            endpoints::EXCHANGE_RATE_API,
            get(show_exchange_rate_endpoint)
                .put(update_exchange_rate_endpoint)
                .delete(delete_exchange_rate_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    protected_routes
        .merge(json_api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the reports page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::REPORTS_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, pagination::PaginationConfig, routing::build_router};

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let server = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn reports_page_requires_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::REPORTS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert!(
            response
                .header("location")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn exchange_rate_api_requires_log_in() {
        let server = get_test_server();

        server
            .get(endpoints::EXCHANGE_RATES_API)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .put("/api/v2/exchange-rates/1")
            .json(&serde_json::json!({ "rate": 1.5 }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
