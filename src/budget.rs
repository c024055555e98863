//! Budgets and the amounts budgeted for them over periods of time.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use time::Date;

use crate::{Error, currency::CurrencyId, database_id::DatabaseId, user_group::UserGroupId};

pub type BudgetId = DatabaseId;

/// A named pot of spending, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget in the database.
    pub id: BudgetId,
    /// The group that owns the budget.
    pub user_group_id: UserGroupId,
    /// The display name of the budget, unique within its group.
    pub name: String,
    /// Inactive budgets are hidden from the report options.
    pub active: bool,
}

/// The amount budgeted for a budget from `start` to `end`, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLimit {
    /// The ID of the limit in the database.
    pub id: DatabaseId,
    /// The budget the limit applies to.
    pub budget_id: BudgetId,
    /// The currency of `amount`.
    pub currency_id: CurrencyId,
    /// The first day of the period.
    pub start: Date,
    /// The last day of the period.
    pub end: Date,
    /// The amount that may be spent over the period.
    pub amount: f64,
}

/// The fields needed to set a budget limit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudgetLimit {
    /// The budget the limit applies to.
    pub budget_id: BudgetId,
    /// The currency of `amount`.
    pub currency_id: CurrencyId,
    /// The first day of the period.
    pub start: Date,
    /// The last day of the period.
    pub end: Date,
    /// The amount that may be spent over the period.
    pub amount: f64,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_group_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            UNIQUE(user_group_id, name),
            FOREIGN KEY(user_group_id) REFERENCES user_group(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn create_budget_limit_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_limit (
            id INTEGER PRIMARY KEY,
            budget_id INTEGER NOT NULL,
            currency_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON DELETE CASCADE,
            FOREIGN KEY(currency_id) REFERENCES currency(id)
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_limit_period
        ON budget_limit(budget_id, start_date, end_date)",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_group_id: row.get(1)?,
        name: row.get(2)?,
        active: row.get(3)?,
    })
}

/// Create a budget in `user_group_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the group already has a budget called `name`.
pub fn create_budget(
    name: &str,
    active: bool,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_group_id, name, active) VALUES (?1, ?2, ?3)",
        (user_group_id, name, active),
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        user_group_id,
        name: name.to_owned(),
        active,
    })
}

/// Set the amount budgeted for a period.
///
/// # Errors
/// Returns:
/// - [Error::InvalidDateRange] if the period ends before it starts.
/// - [Error::InvalidAmount] if the amount is not a positive number.
pub fn create_budget_limit(
    limit: NewBudgetLimit,
    connection: &Connection,
) -> Result<BudgetLimit, Error> {
    if limit.end < limit.start {
        return Err(Error::InvalidDateRange {
            start: limit.start,
            end: limit.end,
        });
    }

    if !limit.amount.is_finite() || limit.amount <= 0.0 {
        return Err(Error::InvalidAmount(limit.amount));
    }

    connection.execute(
        "INSERT INTO budget_limit (budget_id, currency_id, start_date, end_date, amount)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            limit.budget_id,
            limit.currency_id,
            limit.start,
            limit.end,
            limit.amount,
        ),
    )?;

    Ok(BudgetLimit {
        id: connection.last_insert_rowid(),
        budget_id: limit.budget_id,
        currency_id: limit.currency_id,
        start: limit.start,
        end: limit.end,
        amount: limit.amount,
    })
}

fn id_placeholders(count: usize) -> String {
    std::iter::repeat_n("?", count)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Get the budgets in `ids` that belong to `user_group_id`, sorted by name.
///
/// IDs of missing budgets or budgets in other groups are skipped.
pub fn get_budgets_by_ids(
    ids: &[BudgetId],
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "SELECT id, user_group_id, name, active FROM budget
        WHERE user_group_id = ?1 AND id IN ({})
        ORDER BY name ASC, id ASC",
        id_placeholders(ids.len())
    );

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(ids.len() + 1);
    params.push(&user_group_id);
    for id in ids {
        params.push(id);
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_row_to_budget)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Get the group's active budgets, sorted by name.
pub fn get_active_budgets(
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_group_id, name, active FROM budget
            WHERE user_group_id = ?1 AND active = 1
            ORDER BY name ASC, id ASC",
        )?
        .query_map((user_group_id,), map_row_to_budget)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Get the limits of `budget_ids` whose period overlaps `start` to `end`, inclusive.
pub fn get_budget_limits_in_range(
    budget_ids: &[BudgetId],
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<BudgetLimit>, Error> {
    if budget_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "SELECT id, budget_id, currency_id, start_date, end_date, amount FROM budget_limit
        WHERE start_date <= ?1 AND end_date >= ?2 AND budget_id IN ({})
        ORDER BY start_date ASC, id ASC",
        id_placeholders(budget_ids.len())
    );

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(budget_ids.len() + 2);
    params.push(&end);
    params.push(&start);
    for id in budget_ids {
        params.push(id);
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            Ok(BudgetLimit {
                id: row.get(0)?,
                budget_id: row.get(1)?,
                currency_id: row.get(2)?,
                start: row.get(3)?,
                end: row.get(4)?,
                amount: row.get(5)?,
            })
        })?
        .map(|maybe_limit| maybe_limit.map_err(Error::from))
        .collect()
}
