//! Selecting journals by account, date, type and budget in a single query.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    budget::BudgetId,
    currency::CurrencyId,
    journal::{JournalId, TransactionType},
    user_group::UserGroupId,
};

/// A journal as returned by [JournalCollector], with the amount signed from
/// the point of view of the source account and optional names of the related
/// accounts and budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedJournal {
    pub journal_id: JournalId,
    pub transaction_type: TransactionType,
    pub date: Date,
    pub description: String,
    /// Negative for withdrawals and transfers, positive for deposits.
    pub amount: f64,
    pub currency_id: CurrencyId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub budget_id: Option<BudgetId>,
    /// Set by [JournalCollector::with_account_information].
    pub source_account_name: Option<String>,
    /// Set by [JournalCollector::with_account_information].
    pub destination_account_name: Option<String>,
    /// Set by [JournalCollector::with_budget_information].
    pub budget_name: Option<String>,
}

/// Builds a query over the journals of one user group.
///
/// Filters that are never set do not restrict the results. A filter set to
/// an empty list matches nothing.
#[derive(Debug, Clone)]
pub struct JournalCollector {
    user_group_id: UserGroupId,
    account_ids: Option<Vec<AccountId>>,
    range: Option<(Date, Date)>,
    types: Option<Vec<TransactionType>>,
    budget_ids: Option<Vec<BudgetId>>,
    with_account_information: bool,
    with_budget_information: bool,
}

impl JournalCollector {
    pub fn new(user_group_id: UserGroupId) -> Self {
        Self {
            user_group_id,
            account_ids: None,
            range: None,
            types: None,
            budget_ids: None,
            with_account_information: false,
            with_budget_information: false,
        }
    }

    /// Only journals whose source or destination is one of `account_ids`.
    pub fn set_accounts(mut self, account_ids: &[AccountId]) -> Self {
        self.account_ids = Some(account_ids.to_vec());
        self
    }

    /// Only journals dated from `start` to `end`, inclusive.
    pub fn set_range(mut self, start: Date, end: Date) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn set_types(mut self, types: &[TransactionType]) -> Self {
        self.types = Some(types.to_vec());
        self
    }

    /// Only journals counted against one of `budget_ids`.
    pub fn set_budgets(mut self, budget_ids: &[BudgetId]) -> Self {
        self.budget_ids = Some(budget_ids.to_vec());
        self
    }

    /// Include the names of the source and destination accounts.
    pub fn with_account_information(mut self) -> Self {
        self.with_account_information = true;
        self
    }

    /// Include the name of the budget.
    pub fn with_budget_information(mut self) -> Self {
        self.with_budget_information = true;
        self
    }

    fn matches_nothing(&self) -> bool {
        self.account_ids.as_ref().is_some_and(Vec::is_empty)
            || self.types.as_ref().is_some_and(Vec::is_empty)
            || self.budget_ids.as_ref().is_some_and(Vec::is_empty)
    }

    /// Run the query, returning the matching journals ordered by date and then ID.
    pub fn get_extracted_journals(
        &self,
        connection: &Connection,
    ) -> Result<Vec<ExtractedJournal>, Error> {
        if self.matches_nothing() {
            tracing::debug!("Journal collector has an empty filter, skipping query.");
            return Ok(Vec::new());
        }

        let mut columns = vec![
            "journal.id",
            "journal.transaction_type",
            "journal.date",
            "journal.description",
            "journal.amount",
            "journal.currency_id",
            "journal.source_account_id",
            "journal.destination_account_id",
            "journal.budget_id",
        ];
        let mut joins = Vec::new();
        let mut conditions = vec!["journal.user_group_id = ?".to_owned()];
        let mut params: Vec<&dyn ToSql> = vec![&self.user_group_id];

        if self.with_account_information {
            columns.push("source.name");
            columns.push("destination.name");
            joins.push("JOIN account AS source ON source.id = journal.source_account_id");
            joins.push(
                "JOIN account AS destination ON destination.id = journal.destination_account_id",
            );
        }

        if self.with_budget_information {
            columns.push("budget.name");
            joins.push("LEFT JOIN budget ON budget.id = journal.budget_id");
        }

        if let Some(account_ids) = &self.account_ids {
            let placeholders = placeholders(account_ids.len());
            conditions.push(format!(
                "(journal.source_account_id IN ({placeholders}) \
                OR journal.destination_account_id IN ({placeholders}))"
            ));
            for id in account_ids {
                params.push(id);
            }
            for id in account_ids {
                params.push(id);
            }
        }

        if let Some((start, end)) = &self.range {
            conditions.push("journal.date BETWEEN ? AND ?".to_owned());
            params.push(start);
            params.push(end);
        }

        if let Some(types) = &self.types {
            conditions.push(format!(
                "journal.transaction_type IN ({})",
                placeholders(types.len())
            ));
            for transaction_type in types {
                params.push(transaction_type);
            }
        }

        if let Some(budget_ids) = &self.budget_ids {
            conditions.push(format!(
                "journal.budget_id IN ({})",
                placeholders(budget_ids.len())
            ));
            for id in budget_ids {
                params.push(id);
            }
        }

        let query = format!(
            "SELECT {} FROM journal {} WHERE {} ORDER BY journal.date ASC, journal.id ASC",
            columns.join(", "),
            joins.join(" "),
            conditions.join(" AND ")
        );

        connection
            .prepare(&query)?
            .query_map(params_from_iter(params), |row| self.map_row(row))?
            .map(|maybe_journal| maybe_journal.map_err(Error::from))
            .collect()
    }

    fn map_row(&self, row: &Row) -> Result<ExtractedJournal, rusqlite::Error> {
        let transaction_type: TransactionType = row.get(1)?;
        let amount: f64 = row.get(4)?;
        let signed_amount = match transaction_type {
            TransactionType::Withdrawal | TransactionType::Transfer => -amount,
            TransactionType::Deposit => amount,
        };

        let (source_account_name, destination_account_name) = if self.with_account_information {
            (Some(row.get(9)?), Some(row.get(10)?))
        } else {
            (None, None)
        };

        let budget_name = if self.with_budget_information {
            let index = if self.with_account_information { 11 } else { 9 };
            row.get(index)?
        } else {
            None
        };

        Ok(ExtractedJournal {
            journal_id: row.get(0)?,
            transaction_type,
            date: row.get(2)?,
            description: row.get(3)?,
            amount: signed_amount,
            currency_id: row.get(5)?,
            source_account_id: row.get(6)?,
            destination_account_id: row.get(7)?,
            budget_id: row.get(8)?,
            source_account_name,
            destination_account_name,
            budget_name,
        })
    }
}

fn placeholders(count: usize) -> String {
    std::iter::repeat_n("?", count)
        .collect::<Vec<_>>()
        .join(", ")
}
