//! The exchange rate model and its queries. Every query is scoped to a user group.

use rusqlite::{Connection, OptionalExtension, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, currency::CurrencyId, database_id::DatabaseId, pagination::Page,
    user_group::UserGroupId,
};

/// The database ID of an exchange rate.
pub type ExchangeRateId = DatabaseId;

/// How many units of `to_currency_id` one unit of `from_currency_id` was worth on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    /// The ID of the exchange rate in the database.
    pub id: ExchangeRateId,
    /// The group the rate belongs to.
    pub user_group_id: UserGroupId,
    /// The currency converted from.
    pub from_currency_id: CurrencyId,
    /// The currency converted to.
    pub to_currency_id: CurrencyId,
    /// The day the rate applies from.
    pub date: Date,
    /// The conversion factor, always greater than zero.
    pub rate: f64,
    /// When the rate was first recorded.
    pub created_at: OffsetDateTime,
    /// When the rate was last changed.
    pub updated_at: OffsetDateTime,
}

/// The fields needed to record a new exchange rate.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExchangeRate {
    /// The group the rate belongs to.
    pub user_group_id: UserGroupId,
    /// The currency converted from.
    pub from_currency_id: CurrencyId,
    /// The currency converted to.
    pub to_currency_id: CurrencyId,
    /// The day the rate applies from.
    pub date: Date,
    /// The conversion factor.
    pub rate: f64,
}

pub fn create_exchange_rate_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS currency_exchange_rate (
            id INTEGER PRIMARY KEY,
            user_group_id INTEGER NOT NULL,
            from_currency_id INTEGER NOT NULL,
            to_currency_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            rate REAL NOT NULL CHECK (rate > 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_group_id, from_currency_id, to_currency_id, date),
            FOREIGN KEY(user_group_id) REFERENCES user_group(id) ON DELETE CASCADE,
            FOREIGN KEY(from_currency_id) REFERENCES currency(id),
            FOREIGN KEY(to_currency_id) REFERENCES currency(id)
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_exchange_rate_lookup
        ON currency_exchange_rate(user_group_id, from_currency_id, to_currency_id, date)",
        (),
    )?;

    Ok(())
}

const SELECT_COLUMNS: &str = "SELECT id, user_group_id, from_currency_id, to_currency_id, date, \
    rate, created_at, updated_at FROM currency_exchange_rate";

fn map_row_to_exchange_rate(row: &Row) -> Result<ExchangeRate, rusqlite::Error> {
    Ok(ExchangeRate {
        id: row.get(0)?,
        user_group_id: row.get(1)?,
        from_currency_id: row.get(2)?,
        to_currency_id: row.get(3)?,
        date: row.get(4)?,
        rate: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Record a new exchange rate.
///
/// # Errors
/// Returns [Error::DuplicateExchangeRate] if the group already has a rate
/// for the currency pair on that date.
pub fn create_exchange_rate(
    new_rate: NewExchangeRate,
    connection: &Connection,
) -> Result<ExchangeRate, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO currency_exchange_rate
        (user_group_id, from_currency_id, to_currency_id, date, rate, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            new_rate.user_group_id,
            new_rate.from_currency_id,
            new_rate.to_currency_id,
            new_rate.date,
            new_rate.rate,
            now,
        ),
    )?;

    get_exchange_rate(
        connection.last_insert_rowid(),
        new_rate.user_group_id,
        connection,
    )
}

/// Get the exchange rate `id` if it belongs to `user_group_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such rate or it belongs to another group.
pub fn get_exchange_rate(
    id: ExchangeRateId,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<ExchangeRate, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE id = :id AND user_group_id = :user_group_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_group_id", &user_group_id)],
            map_row_to_exchange_rate,
        )
        .map_err(|error| error.into())
}

/// Get one page of the group's exchange rates, newest first.
pub fn get_exchange_rates(
    user_group_id: UserGroupId,
    page: Page,
    connection: &Connection,
) -> Result<Vec<ExchangeRate>, Error> {
    let Some(offset) = page.offset() else {
        tracing::debug!("Page {} of size {} is past the last row", page.number, page.size);
        return Ok(Vec::new());
    };

    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_group_id = ?1 ORDER BY date DESC, id ASC LIMIT ?2 OFFSET ?3"
        ))?
        .query_map(
            (user_group_id, page.limit(), offset),
            map_row_to_exchange_rate,
        )?
        .map(|maybe_rate| maybe_rate.map_err(Error::from))
        .collect()
}

pub fn count_exchange_rates(
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM currency_exchange_rate WHERE user_group_id = ?1",
            (user_group_id,),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Set a new rate on `exchange_rate` and, if `new_date` is given, move it to that date.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the rate has since been deleted.
/// - [Error::DuplicateExchangeRate] if the group already has a rate for the pair on `new_date`.
pub fn update_exchange_rate(
    exchange_rate: &ExchangeRate,
    new_rate: f64,
    new_date: Option<Date>,
    connection: &Connection,
) -> Result<ExchangeRate, Error> {
    let rows_affected = connection.execute(
        "UPDATE currency_exchange_rate
        SET rate = ?1, date = COALESCE(?2, date), updated_at = ?3
        WHERE id = ?4 AND user_group_id = ?5",
        (
            new_rate,
            new_date,
            OffsetDateTime::now_utc(),
            exchange_rate.id,
            exchange_rate.user_group_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_exchange_rate(exchange_rate.id, exchange_rate.user_group_id, connection)
}

/// Delete the exchange rate `id` from `user_group_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such rate in the group.
pub fn delete_exchange_rate(
    id: ExchangeRateId,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM currency_exchange_rate WHERE id = ?1 AND user_group_id = ?2",
        (id, user_group_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The most recent rate from `from` to `to` dated on or before `date`.
pub fn find_latest_rate(
    user_group_id: UserGroupId,
    from: CurrencyId,
    to: CurrencyId,
    date: Date,
    connection: &Connection,
) -> Result<Option<f64>, Error> {
    connection
        .query_row(
            "SELECT rate FROM currency_exchange_rate
            WHERE user_group_id = ?1 AND from_currency_id = ?2 AND to_currency_id = ?3 AND date <= ?4
            ORDER BY date DESC
            LIMIT 1",
            (user_group_id, from, to, date),
            |row| row.get(0),
        )
        .optional()
        .map_err(|error| error.into())
}

#[cfg(test)]
pub mod test_utils {
    use rusqlite::Connection;

    use crate::{
        currency::{Currency, get_currency_by_code},
        db::initialize,
        user_group::{UserGroup, create_user_group},
    };

    pub struct Fixture {
        pub connection: Connection,
        pub group: UserGroup,
        pub euro: Currency,
        pub dollar: Currency,
        pub pound: Currency,
    }

    pub fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let euro = get_currency_by_code("EUR", &connection).unwrap();
        let dollar = get_currency_by_code("USD", &connection).unwrap();
        let pound = get_currency_by_code("GBP", &connection).unwrap();
        let group = create_user_group("Default", euro.id, &connection).unwrap();

        Fixture {
            connection,
            group,
            euro,
            dollar,
            pound,
        }
    }
}
