//! Turns exchange rates into JSON:API resource objects.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use time::{
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{
    Error,
    currency::{Currency, CurrencyId, get_currency_by_id},
    endpoints::{self, format_endpoint},
    exchange_rate::ExchangeRate,
    json_api::{ResourceLinks, ResourceObject},
};

/// The JSON:API type of exchange rate resources.
pub const RESOURCE_TYPE: &str = "exchange-rates";

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The attributes of an exchange rate resource.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExchangeRateAttributes {
    pub created_at: String,
    pub updated_at: String,
    pub from_currency_id: String,
    pub from_currency_code: String,
    pub from_currency_symbol: String,
    pub from_currency_decimal_places: u8,
    pub to_currency_id: String,
    pub to_currency_code: String,
    pub to_currency_symbol: String,
    pub to_currency_decimal_places: u8,
    /// The rate with 12 fractional digits, e.g. "1.080000000000".
    pub rate: String,
    pub date: String,
}

/// Builds resource objects, loading each currency from the database at most once.
pub struct ExchangeRateTransformer<'a> {
    connection: &'a Connection,
    currencies: HashMap<CurrencyId, Currency>,
}

impl<'a> ExchangeRateTransformer<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self {
            connection,
            currencies: HashMap::new(),
        }
    }

    fn currency(&mut self, id: CurrencyId) -> Result<Currency, Error> {
        if let Some(currency) = self.currencies.get(&id) {
            return Ok(currency.clone());
        }

        let currency = get_currency_by_id(id, self.connection)?;
        self.currencies.insert(id, currency.clone());

        Ok(currency)
    }

    pub fn transform(
        &mut self,
        exchange_rate: &ExchangeRate,
    ) -> Result<ResourceObject<ExchangeRateAttributes>, Error> {
        let from = self.currency(exchange_rate.from_currency_id)?;
        let to = self.currency(exchange_rate.to_currency_id)?;

        let format_error = |error: time::error::Format| {
            tracing::error!("Could not format exchange rate {}: {error}", exchange_rate.id);
            Error::JSONSerializationError(error.to_string())
        };

        Ok(ResourceObject {
            resource_type: RESOURCE_TYPE,
            id: exchange_rate.id.to_string(),
            attributes: ExchangeRateAttributes {
                created_at: exchange_rate
                    .created_at
                    .format(&Rfc3339)
                    .map_err(format_error)?,
                updated_at: exchange_rate
                    .updated_at
                    .format(&Rfc3339)
                    .map_err(format_error)?,
                from_currency_id: from.id.to_string(),
                from_currency_code: from.code,
                from_currency_symbol: from.symbol,
                from_currency_decimal_places: from.decimal_places,
                to_currency_id: to.id.to_string(),
                to_currency_code: to.code,
                to_currency_symbol: to.symbol,
                to_currency_decimal_places: to.decimal_places,
                rate: format!("{:.12}", exchange_rate.rate),
                date: exchange_rate
                    .date
                    .format(DATE_FORMAT)
                    .map_err(format_error)?,
            },
            links: ResourceLinks {
                self_link: format_endpoint(endpoints::EXCHANGE_RATE_API, exchange_rate.id),
            },
        })
    }

    pub fn transform_all(
        &mut self,
        exchange_rates: &[ExchangeRate],
    ) -> Result<Vec<ResourceObject<ExchangeRateAttributes>>, Error> {
        exchange_rates
            .iter()
            .map(|exchange_rate| self.transform(exchange_rate))
            .collect()
    }
}
