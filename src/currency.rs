//! Currencies and formatting amounts of money.

use numfmt::{Formatter, Precision};
use rusqlite::{Connection, Row};

use crate::{Error, database_id::DatabaseId};

/// The database ID of a currency.
pub type CurrencyId = DatabaseId;

/// A currency that amounts of money are recorded in.
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    /// The ID of the currency in the database.
    pub id: CurrencyId,
    /// The ISO 4217 code, e.g. "EUR".
    pub code: String,
    /// The display name, e.g. "Euro".
    pub name: String,
    /// The symbol placed before amounts, e.g. "€".
    pub symbol: String,
    /// The number of digits after the decimal point.
    pub decimal_places: u8,
}

/// The currencies every database starts with: code, name, symbol and decimal places.
const DEFAULT_CURRENCIES: &[(&str, &str, &str, u8)] = &[
    ("EUR", "Euro", "€", 2),
    ("USD", "US Dollar", "$", 2),
    ("GBP", "British Pound", "£", 2),
    ("NZD", "New Zealand Dollar", "NZ$", 2),
    ("AUD", "Australian Dollar", "A$", 2),
    ("CAD", "Canadian Dollar", "C$", 2),
    ("CHF", "Swiss Franc", "CHF", 2),
    ("JPY", "Japanese Yen", "¥", 0),
    ("CNY", "Chinese Yuan", "CN¥", 2),
    ("SEK", "Swedish Krona", "kr", 2),
];

pub fn create_currency_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS currency (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            symbol TEXT NOT NULL,
            decimal_places INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert the default currencies, skipping any that already exist.
pub fn seed_currencies(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO currency (code, name, symbol, decimal_places)
        VALUES (?1, ?2, ?3, ?4)",
    )?;

    for (code, name, symbol, decimal_places) in DEFAULT_CURRENCIES {
        statement.execute((code, name, symbol, decimal_places))?;
    }

    Ok(())
}

fn map_row_to_currency(row: &Row) -> Result<Currency, rusqlite::Error> {
    Ok(Currency {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        symbol: row.get(3)?,
        decimal_places: row.get(4)?,
    })
}

/// Get a currency by its database ID.
///
/// # Errors
/// Returns [Error::NotFound] if no currency has the ID `id`.
pub fn get_currency_by_id(id: CurrencyId, connection: &Connection) -> Result<Currency, Error> {
    connection
        .prepare("SELECT id, code, name, symbol, decimal_places FROM currency WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_currency)
        .map_err(|error| error.into())
}

/// Get a currency by its ISO 4217 code, e.g. "NZD".
///
/// # Errors
/// Returns [Error::NotFound] if no currency has the code `code`.
pub fn get_currency_by_code(code: &str, connection: &Connection) -> Result<Currency, Error> {
    connection
        .prepare("SELECT id, code, name, symbol, decimal_places FROM currency WHERE code = :code")?
        .query_row(&[(":code", &code)], map_row_to_currency)
        .map_err(|error| error.into())
}

/// Format `amount` with thousands separators, the currency symbol and the
/// currency's number of decimal places, e.g. "-€1,234.50".
pub fn format_amount(amount: f64, currency: &Currency) -> String {
    let decimal_places = currency.decimal_places as usize;
    let scale = 10f64.powi(currency.decimal_places as i32);
    let rounded = (amount * scale).round() / scale;

    // numfmt renders zero as "0" without a prefix.
    if rounded == 0.0 {
        return format!("{}{:.*}", currency.symbol, decimal_places, 0.0);
    }

    let prefix = if rounded < 0.0 {
        format!("-{}", currency.symbol)
    } else {
        currency.symbol.clone()
    };

    let mut formatted = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(currency.decimal_places))
            .fmt_string(rounded.abs()),
        Err(error) => {
            tracing::warn!("Could not create number formatter for {prefix}: {error:?}");
            format!("{prefix}{:.*}", decimal_places, rounded.abs())
        }
    };

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
    if decimal_places > 0 {
        let fraction_digits = match formatted.rfind('.') {
            Some(index) => formatted.len() - index - 1,
            None => {
                formatted.push('.');
                0
            }
        };

        for _ in fraction_digits..decimal_places {
            formatted.push('0');
        }
    }

    formatted
}
