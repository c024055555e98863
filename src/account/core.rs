use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{Error, currency::CurrencyId, database_id::DatabaseId, user_group::UserGroupId};

pub type AccountId = DatabaseId;

/// What an account represents. Only asset accounts can be picked for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// A bank account, credit card or wallet owned by the user.
    Asset,
    /// A shop or payee that money is spent at.
    Expense,
    /// An employer or other source of income.
    Revenue,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Expense => "expense",
            AccountType::Revenue => "revenue",
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "asset" => Ok(AccountType::Asset),
            "expense" => Ok(AccountType::Expense),
            "revenue" => Ok(AccountType::Revenue),
            other => Err(FromSqlError::Other(
                format!("unknown account type {other}").into(),
            )),
        }
    }
}

/// A place money moves into or out of.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The group that owns the account.
    pub user_group_id: UserGroupId,
    /// The display name of the account, unique within its group.
    pub name: String,
    /// Whether the account is an asset, expense or revenue account.
    pub account_type: AccountType,
    /// The currency the account is kept in.
    pub currency_id: CurrencyId,
}

/// The fields needed to create an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The group that owns the account.
    pub user_group_id: UserGroupId,
    /// The display name of the account.
    pub name: String,
    /// Whether the account is an asset, expense or revenue account.
    pub account_type: AccountType,
    /// The currency the account is kept in.
    pub currency_id: CurrencyId,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_group_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            account_type TEXT NOT NULL CHECK (account_type IN ('asset', 'expense', 'revenue')),
            currency_id INTEGER NOT NULL,
            UNIQUE(user_group_id, name),
            FOREIGN KEY(user_group_id) REFERENCES user_group(id) ON DELETE CASCADE,
            FOREIGN KEY(currency_id) REFERENCES currency(id)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_group_id = row.get(1)?;
    let name = row.get(2)?;
    let account_type = row.get(3)?;
    let currency_id = row.get(4)?;

    Ok(Account {
        id,
        user_group_id,
        name,
        account_type,
        currency_id,
    })
}

/// Create an account.
///
/// # Errors
/// Returns [Error::SqlError] if the group already has an account with the same name.
pub fn create_account(account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    connection.execute(
        "INSERT INTO account (user_group_id, name, account_type, currency_id)
        VALUES (?1, ?2, ?3, ?4)",
        (
            account.user_group_id,
            &account.name,
            account.account_type,
            account.currency_id,
        ),
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        user_group_id: account.user_group_id,
        name: account.name,
        account_type: account.account_type,
        currency_id: account.currency_id,
    })
}

/// Get the accounts in `ids` that belong to `user_group_id`, sorted by name.
///
/// IDs of missing accounts or accounts in other groups are skipped.
pub fn get_accounts_by_ids(
    ids: &[AccountId],
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = std::iter::repeat_n("?", ids.len())
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "SELECT id, user_group_id, name, account_type, currency_id FROM account
        WHERE user_group_id = ?1 AND id IN ({placeholders})
        ORDER BY name ASC, id ASC"
    );

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(ids.len() + 1);
    params.push(&user_group_id);
    for id in ids {
        params.push(id);
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Get the group's asset accounts, sorted by name.
pub fn get_asset_accounts(
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_group_id, name, account_type, currency_id FROM account
            WHERE user_group_id = ?1 AND account_type = ?2
            ORDER BY name ASC, id ASC",
        )?
        .query_map((user_group_id, AccountType::Asset), map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}
