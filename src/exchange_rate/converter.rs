//! Converting amounts between currencies with a group's recorded exchange rates.

use std::collections::HashMap;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error, currency::CurrencyId, exchange_rate::core::find_latest_rate, user_group::UserGroupId,
};

/// Converts amounts of money between currencies using the exchange rates of one user group.
///
/// Rates are looked up once per currency pair and date and then reused for
/// the lifetime of the converter.
pub struct ExchangeRateConverter<'a> {
    connection: &'a Connection,
    user_group_id: UserGroupId,
    cache: HashMap<(CurrencyId, CurrencyId, Date), f64>,
}

impl<'a> ExchangeRateConverter<'a> {
    pub fn new(connection: &'a Connection, user_group_id: UserGroupId) -> Self {
        Self {
            connection,
            user_group_id,
            cache: HashMap::new(),
        }
    }

    /// The factor that converts an amount in `from` into `to` on `date`.
    ///
    /// The latest `from` to `to` rate on or before `date` is used. Failing that,
    /// the inverse of the latest `to` to `from` rate is used. If the group has
    /// neither, the amounts are treated as equal.
    pub fn get_rate(&mut self, from: CurrencyId, to: CurrencyId, date: Date) -> Result<f64, Error> {
        if from == to {
            return Ok(1.0);
        }

        if let Some(rate) = self.cache.get(&(from, to, date)) {
            tracing::debug!("Using cached rate {rate} from {from} to {to} on {date}.");
            return Ok(*rate);
        }

        let rate = match find_latest_rate(self.user_group_id, from, to, date, self.connection)? {
            Some(rate) => rate,
            None => match find_latest_rate(self.user_group_id, to, from, date, self.connection)? {
                Some(inverse_rate) => 1.0 / inverse_rate,
                None => {
                    tracing::warn!(
                        "No exchange rate from currency {from} to {to} on or before {date}, using 1."
                    );
                    1.0
                }
            },
        };

        self.cache.insert((from, to, date), rate);

        Ok(rate)
    }

    /// Convert `amount` from the currency `from` into `to` using the rate on `date`.
    pub fn convert(
        &mut self,
        amount: f64,
        from: CurrencyId,
        to: CurrencyId,
        date: Date,
    ) -> Result<f64, Error> {
        Ok(amount * self.get_rate(from, to, date)?)
    }
}
