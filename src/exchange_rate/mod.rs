//! Exchange rates between currencies, the JSON API for managing them, and the
//! converter that reports use to show amounts in a group's primary currency.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, pagination::PaginationConfig};

mod converter;
mod core;
mod delete_endpoint;
mod list_endpoint;
mod request;
mod show_endpoint;
mod store_endpoint;
mod transformer;
mod update_endpoint;

pub use converter::ExchangeRateConverter;
pub use core::{
    ExchangeRate, ExchangeRateId, NewExchangeRate, create_exchange_rate,
    create_exchange_rate_table,
};
pub use delete_endpoint::delete_exchange_rate_endpoint;
pub use list_endpoint::list_exchange_rates_endpoint;
pub use show_endpoint::show_exchange_rate_endpoint;
pub use store_endpoint::store_exchange_rate_endpoint;
pub use update_endpoint::update_exchange_rate_endpoint;

/// The state needed by the exchange rate endpoints.
#[derive(Debug, Clone)]
pub struct ExchangeRateState {
    /// The database connection for managing exchange rates.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The page sizes used when listing exchange rates.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExchangeRateState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

#[cfg(test)]
mod test_utils {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router,
        routing::{get, put},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, PasswordHash,
        auth::create_user,
        currency::{CurrencyId, get_currency_by_code},
        db::initialize,
        endpoints,
        pagination::PaginationConfig,
        user_group::{ValidatedUserGroup, create_user_group, resolve_user_group},
    };

    use super::{
        ExchangeRateState, list_exchange_rates_endpoint, store_exchange_rate_endpoint,
        update_exchange_rate_endpoint,
    };

    pub struct TestContext {
        pub state: ExchangeRateState,
        pub user_group: ValidatedUserGroup,
        pub euro_id: CurrencyId,
        pub dollar_id: CurrencyId,
    }

    pub fn get_test_context() -> TestContext {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let euro = get_currency_by_code("EUR", &connection).unwrap();
        let dollar = get_currency_by_code("USD", &connection).unwrap();
        let group = create_user_group("Default", euro.id, &connection).unwrap();
        let user = create_user(
            PasswordHash::new_unchecked("hunter2"),
            group.id,
            &connection,
        )
        .unwrap();
        let user_group = resolve_user_group(user.id, None, &connection).unwrap();

        TestContext {
            state: ExchangeRateState {
                db_connection: Arc::new(Mutex::new(connection)),
                pagination_config: PaginationConfig::default(),
            },
            user_group,
            euro_id: euro.id,
            dollar_id: dollar.id,
        }
    }

    /// A server with the exchange rate routes where every request is from a
    /// logged in user whose default group has no exchange rates yet.
    pub fn get_test_server() -> (TestServer, AppState) {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "42",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .unwrap();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let euro = get_currency_by_code("EUR", &connection).unwrap();
            let group = create_user_group("Default", euro.id, &connection).unwrap();
            create_user(PasswordHash::new_unchecked("hunter2"), group.id, &connection)
                .unwrap()
                .id
        };
        let app = Router::new()
            .route(
                endpoints::EXCHANGE_RATES_API,
                get(list_exchange_rates_endpoint).post(store_exchange_rate_endpoint),
            )
            .route(endpoints::EXCHANGE_RATE_API, put(update_exchange_rate_endpoint))
            .layer(Extension(user_id))
            .with_state(state.clone());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        (server, state)
    }
}
