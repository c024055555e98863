//! Creates the application's SQLite schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    account::create_account_table,
    auth::create_user_table,
    budget::{create_budget_limit_table, create_budget_table},
    currency::{create_currency_table, seed_currencies},
    exchange_rate::create_exchange_rate_table,
    journal::create_journal_table,
    user_group::{create_group_membership_table, create_user_group_table},
};

/// Turn on foreign key enforcement, create the tables for the domain models
/// and seed the currency table.
///
/// Tables that already exist are left untouched, so this is safe to call
/// every time the server starts.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_currency_table(&transaction)?;
    seed_currencies(&transaction)?;
    create_user_group_table(&transaction)?;
    create_user_table(&transaction)?;
    create_group_membership_table(&transaction)?;
    create_account_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_budget_limit_table(&transaction)?;
    create_journal_table(&transaction)?;
    create_exchange_rate_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
