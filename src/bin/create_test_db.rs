use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use exchequer::{
    AccountType, NewAccount, NewBudgetLimit, NewExchangeRate, NewJournal, PasswordHash,
    TransactionType, ValidatedPassword, create_account, create_budget, create_budget_limit,
    create_exchange_rate, create_journal, create_user, create_user_group, get_currency_by_code,
    initialize_db,
};

/// A utility for creating a test database for the exchequer server.
///
/// The user's password is "test".
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let euro = get_currency_by_code("EUR", &conn)?;
    let dollar = get_currency_by_code("USD", &conn)?;
    let group = create_user_group("Household", euro.id, &conn)?;

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    create_user(password_hash, group.id, &conn)?;

    println!("Creating accounts and budgets...");

    let account = |name: &str, account_type, currency_id| {
        create_account(
            NewAccount {
                user_group_id: group.id,
                name: name.to_owned(),
                account_type,
                currency_id,
            },
            &conn,
        )
    };
    let checking = account("Checking", AccountType::Asset, euro.id)?;
    let credit_card = account("Travel card", AccountType::Asset, dollar.id)?;
    account("Savings", AccountType::Asset, euro.id)?;
    let supermarket = account("Supermarket", AccountType::Expense, euro.id)?;
    let landlord = account("Landlord", AccountType::Expense, euro.id)?;
    let restaurant = account("Restaurant", AccountType::Expense, dollar.id)?;

    let groceries = create_budget("Groceries", true, group.id, &conn)?;
    let rent = create_budget("Rent", true, group.id, &conn)?;
    let eating_out = create_budget("Eating out", true, group.id, &conn)?;
    create_budget("Old car", false, group.id, &conn)?;

    println!("Creating journals for the last three months...");

    let today = OffsetDateTime::now_utc().date();

    for months_ago in 0..3 {
        let start = first_of_month(today, months_ago);
        let end = last_of_month(start);

        for (budget_id, amount) in [(groceries.id, 400.0), (rent.id, 1200.0), (eating_out.id, 150.0)] {
            create_budget_limit(
                NewBudgetLimit {
                    budget_id,
                    currency_id: euro.id,
                    start,
                    end,
                    amount,
                },
                &conn,
            )?;
        }

        create_exchange_rate(
            NewExchangeRate {
                user_group_id: group.id,
                from_currency_id: dollar.id,
                to_currency_id: euro.id,
                date: start,
                rate: 0.9 + months_ago as f64 * 0.01,
            },
            &conn,
        )?;

        let withdrawals = [
            (1, "Rent", checking.id, landlord.id, 1200.0, euro.id, rent.id),
            (3, "Weekly shop", checking.id, supermarket.id, 85.4, euro.id, groceries.id),
            (10, "Weekly shop", checking.id, supermarket.id, 92.15, euro.id, groceries.id),
            (12, "Dinner", credit_card.id, restaurant.id, 64.0, dollar.id, eating_out.id),
            (17, "Weekly shop", checking.id, supermarket.id, 78.9, euro.id, groceries.id),
            (24, "Weekly shop", checking.id, supermarket.id, 101.3, euro.id, groceries.id),
            (26, "Lunch", credit_card.id, restaurant.id, 23.5, dollar.id, eating_out.id),
        ];

        for (day, description, source, destination, amount, currency_id, budget_id) in withdrawals {
            let date = start + Duration::days(day - 1);

            if date > end || date > today {
                continue;
            }

            create_journal(
                NewJournal {
                    user_group_id: group.id,
                    transaction_type: TransactionType::Withdrawal,
                    date,
                    description: description.to_owned(),
                    source_account_id: source,
                    destination_account_id: destination,
                    amount,
                    currency_id,
                    budget_id: Some(budget_id),
                },
                &conn,
            )?;
        }
    }

    println!("Success!");

    Ok(())
}

/// The first day of the month `months_ago` months before the month of `date`.
fn first_of_month(date: Date, months_ago: u8) -> Date {
    let mut month = date.month();
    let mut year = date.year();

    for _ in 0..months_ago {
        month = month.previous();
        if month == time::Month::December {
            year -= 1;
        }
    }

    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}

fn last_of_month(first: Date) -> Date {
    let mut last = first;

    while let Some(next) = last.next_day() {
        if next.month() != first.month() {
            break;
        }
        last = next;
    }

    last
}
