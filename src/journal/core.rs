use std::fmt::Display;

use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::{
    Error, account::AccountId, budget::BudgetId, currency::CurrencyId, database_id::DatabaseId,
    user_group::UserGroupId,
};

pub type JournalId = DatabaseId;

/// The direction money moves in a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money spent from an asset account at an expense account.
    Withdrawal,
    /// Money received into an asset account from a revenue account.
    Deposit,
    /// Money moved between two asset accounts.
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Deposit => "deposit",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "deposit" => Ok(TransactionType::Deposit),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type {other}").into(),
            )),
        }
    }
}

/// A recorded transaction moving `amount` from one account to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Journal {
    /// The ID of the journal in the database.
    pub id: JournalId,
    /// The group that owns the journal.
    pub user_group_id: UserGroupId,
    /// Whether the journal is a withdrawal, deposit or transfer.
    pub transaction_type: TransactionType,
    /// The day the transaction happened.
    pub date: Date,
    /// A free text description, e.g. "Weekly shop".
    pub description: String,
    /// The account the money left.
    pub source_account_id: AccountId,
    /// The account the money arrived in.
    pub destination_account_id: AccountId,
    /// The amount moved, always greater than zero.
    pub amount: f64,
    /// The currency of `amount`.
    pub currency_id: CurrencyId,
    /// The budget the journal counts against, if any.
    pub budget_id: Option<BudgetId>,
}

/// The fields needed to record a journal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournal {
    /// The group that owns the journal.
    pub user_group_id: UserGroupId,
    /// Whether the journal is a withdrawal, deposit or transfer.
    pub transaction_type: TransactionType,
    /// The day the transaction happened.
    pub date: Date,
    /// A free text description.
    pub description: String,
    /// The account the money left.
    pub source_account_id: AccountId,
    /// The account the money arrived in.
    pub destination_account_id: AccountId,
    /// The amount moved, must be greater than zero.
    pub amount: f64,
    /// The currency of `amount`.
    pub currency_id: CurrencyId,
    /// The budget the journal counts against, if any.
    pub budget_id: Option<BudgetId>,
}

pub fn create_journal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS journal (
            id INTEGER PRIMARY KEY,
            user_group_id INTEGER NOT NULL,
            transaction_type TEXT NOT NULL
                CHECK (transaction_type IN ('withdrawal', 'deposit', 'transfer')),
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            source_account_id INTEGER NOT NULL,
            destination_account_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            currency_id INTEGER NOT NULL,
            budget_id INTEGER,
            FOREIGN KEY(user_group_id) REFERENCES user_group(id) ON DELETE CASCADE,
            FOREIGN KEY(source_account_id) REFERENCES account(id) ON DELETE CASCADE,
            FOREIGN KEY(destination_account_id) REFERENCES account(id) ON DELETE CASCADE,
            FOREIGN KEY(currency_id) REFERENCES currency(id),
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON DELETE SET NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_journal_group_date ON journal(user_group_id, date)",
        (),
    )?;

    Ok(())
}

/// Record a journal.
///
/// # Errors
/// Returns:
/// - [Error::InvalidAmount] if the amount is not greater than zero.
/// - [Error::SameSourceAndDestination] if the source and destination accounts are the same.
pub fn create_journal(journal: NewJournal, connection: &Connection) -> Result<Journal, Error> {
    if !journal.amount.is_finite() || journal.amount <= 0.0 {
        return Err(Error::InvalidAmount(journal.amount));
    }

    if journal.source_account_id == journal.destination_account_id {
        return Err(Error::SameSourceAndDestination);
    }

    connection.execute(
        "INSERT INTO journal (
            user_group_id, transaction_type, date, description, source_account_id,
            destination_account_id, amount, currency_id, budget_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            journal.user_group_id,
            journal.transaction_type,
            journal.date,
            &journal.description,
            journal.source_account_id,
            journal.destination_account_id,
            journal.amount,
            journal.currency_id,
            journal.budget_id,
        ),
    )?;

    Ok(Journal {
        id: connection.last_insert_rowid(),
        user_group_id: journal.user_group_id,
        transaction_type: journal.transaction_type,
        date: journal.date,
        description: journal.description,
        source_account_id: journal.source_account_id,
        destination_account_id: journal.destination_account_id,
        amount: journal.amount,
        currency_id: journal.currency_id,
        budget_id: journal.budget_id,
    })
}

#[cfg(test)]
pub mod test_utils {
    use rusqlite::Connection;

    use crate::{
        account::{Account, AccountType, NewAccount, create_account},
        budget::{Budget, create_budget},
        currency::{Currency, get_currency_by_code},
        db::initialize,
        user_group::{UserGroup, create_user_group},
    };

    pub struct Fixture {
        pub connection: Connection,
        pub group: UserGroup,
        pub euro: Currency,
        pub checking: Account,
        pub savings: Account,
        pub supermarket: Account,
        pub employer: Account,
        pub groceries: Budget,
        pub rent: Budget,
    }

    pub fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let euro = get_currency_by_code("EUR", &connection).unwrap();
        let group = create_user_group("Default", euro.id, &connection).unwrap();
        let account = |name: &str, account_type| {
            create_account(
                NewAccount {
                    user_group_id: group.id,
                    name: name.to_owned(),
                    account_type,
                    currency_id: euro.id,
                },
                &connection,
            )
            .unwrap()
        };
        let checking = account("Checking", AccountType::Asset);
        let savings = account("Savings", AccountType::Asset);
        let supermarket = account("Supermarket", AccountType::Expense);
        let employer = account("Employer", AccountType::Revenue);
        let groceries = create_budget("Groceries", true, group.id, &connection).unwrap();
        let rent = create_budget("Rent", true, group.id, &connection).unwrap();

        Fixture {
            connection,
            group,
            euro,
            checking,
            savings,
            supermarket,
            employer,
            groceries,
            rent,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{NewJournal, TransactionType, create_journal, test_utils::get_fixture};

    #[test]
    fn creates_journal() {
        let fixture = get_fixture();

        let journal = create_journal(
            NewJournal {
                user_group_id: fixture.group.id,
                transaction_type: TransactionType::Withdrawal,
                date: date!(2024 - 01 - 05),
                description: "Weekly shop".to_owned(),
                source_account_id: fixture.checking.id,
                destination_account_id: fixture.supermarket.id,
                amount: 45.5,
                currency_id: fixture.euro.id,
                budget_id: Some(fixture.groceries.id),
            },
            &fixture.connection,
        )
        .unwrap();

        let stored_type: TransactionType = fixture
            .connection
            .query_row(
                "SELECT transaction_type FROM journal WHERE id = ?1",
                (journal.id,),
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored_type, TransactionType::Withdrawal);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let fixture = get_fixture();

        let result = create_journal(
            NewJournal {
                user_group_id: fixture.group.id,
                transaction_type: TransactionType::Withdrawal,
                date: date!(2024 - 01 - 05),
                description: "Refund?".to_owned(),
                source_account_id: fixture.checking.id,
                destination_account_id: fixture.supermarket.id,
                amount: 0.0,
                currency_id: fixture.euro.id,
                budget_id: None,
            },
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn rejects_same_source_and_destination() {
        let fixture = get_fixture();

        let result = create_journal(
            NewJournal {
                user_group_id: fixture.group.id,
                transaction_type: TransactionType::Transfer,
                date: date!(2024 - 01 - 05),
                description: "Round trip".to_owned(),
                source_account_id: fixture.checking.id,
                destination_account_id: fixture.checking.id,
                amount: 10.0,
                currency_id: fixture.euro.id,
                budget_id: None,
            },
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::SameSourceAndDestination));
    }
}
