//! The figures shown in a budget report, computed from expenses and budget
//! limits that have already been converted into the report currency.

use std::collections::HashMap;

use time::Date;

use crate::{
    account::{Account, AccountId},
    budget::{Budget, BudgetId},
    journal::ExtractedJournal,
    report::period::PeriodBucket,
};

/// How many of the largest expenses a report lists.
pub const TOP_EXPENSE_COUNT: usize = 10;

/// An expense with its amount spent in the report currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedExpense {
    pub journal: ExtractedJournal,
    /// The amount spent, as a positive number in the report currency.
    pub spent: f64,
}

/// A budget limit amount in the report currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedLimit {
    pub budget_id: BudgetId,
    pub amount: f64,
}

/// One row of the budgets table.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLine {
    pub budget: Budget,
    pub budgeted: f64,
    pub spent: f64,
    /// `budgeted - spent`, negative when overspent.
    pub left: f64,
    /// The share of the budgeted amount spent, or `None` if nothing was budgeted.
    pub percent_spent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetTotals {
    pub budgeted: f64,
    pub spent: f64,
    pub left: f64,
    pub percent_spent: Option<f64>,
}

/// Spending per budget for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLine {
    pub account: Account,
    /// Spent per budget, in the same order as the report's budgets.
    pub spent_per_budget: Vec<f64>,
    pub total: f64,
}

/// Spending per budget for one period bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodLine {
    pub bucket: PeriodBucket,
    /// Spent per budget, in the same order as the report's budgets.
    pub spent_per_budget: Vec<f64>,
    pub total: f64,
}

/// Everything a budget report shows, in the report currency.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReportSummary {
    pub budget_lines: Vec<BudgetLine>,
    pub totals: BudgetTotals,
    pub account_lines: Vec<AccountLine>,
    pub period_lines: Vec<PeriodLine>,
    pub top_expenses: Vec<ConvertedExpense>,
}

fn percent_of(spent: f64, budgeted: f64) -> Option<f64> {
    (budgeted > 0.0).then(|| spent * 100.0 / budgeted)
}

fn spent_per_budget<'a>(
    budgets: &[Budget],
    expenses: impl Iterator<Item = &'a ConvertedExpense>,
) -> Vec<f64> {
    let mut spent_by_id: HashMap<BudgetId, f64> = HashMap::new();

    for expense in expenses {
        if let Some(budget_id) = expense.journal.budget_id {
            *spent_by_id.entry(budget_id).or_default() += expense.spent;
        }
    }

    budgets
        .iter()
        .map(|budget| spent_by_id.get(&budget.id).copied().unwrap_or_default())
        .collect()
}

fn touches_account(expense: &ConvertedExpense, account_id: AccountId) -> bool {
    expense.journal.source_account_id == account_id
        || expense.journal.destination_account_id == account_id
}

fn in_bucket(date: Date, bucket: &PeriodBucket) -> bool {
    bucket.start <= date && date <= bucket.end
}

/// Compute the report figures for `budgets` and `accounts`.
///
/// The budget and account lines keep the order of `budgets` and `accounts`.
pub fn summarize(
    accounts: &[Account],
    budgets: &[Budget],
    buckets: Vec<PeriodBucket>,
    expenses: &[ConvertedExpense],
    limits: &[ConvertedLimit],
) -> BudgetReportSummary {
    let spent = spent_per_budget(budgets, expenses.iter());

    let mut budgeted_by_id: HashMap<BudgetId, f64> = HashMap::new();
    for limit in limits {
        *budgeted_by_id.entry(limit.budget_id).or_default() += limit.amount;
    }

    let budget_lines: Vec<BudgetLine> = budgets
        .iter()
        .zip(spent)
        .map(|(budget, spent)| {
            let budgeted = budgeted_by_id.get(&budget.id).copied().unwrap_or_default();

            BudgetLine {
                budget: budget.clone(),
                budgeted,
                spent,
                left: budgeted - spent,
                percent_spent: percent_of(spent, budgeted),
            }
        })
        .collect();

    let total_budgeted: f64 = budget_lines.iter().map(|line| line.budgeted).sum();
    let total_spent: f64 = budget_lines.iter().map(|line| line.spent).sum();
    let totals = BudgetTotals {
        budgeted: total_budgeted,
        spent: total_spent,
        left: total_budgeted - total_spent,
        percent_spent: percent_of(total_spent, total_budgeted),
    };

    let account_lines = accounts
        .iter()
        .map(|account| {
            let spent_per_budget = spent_per_budget(
                budgets,
                expenses
                    .iter()
                    .filter(|expense| touches_account(expense, account.id)),
            );

            AccountLine {
                account: account.clone(),
                total: spent_per_budget.iter().sum(),
                spent_per_budget,
            }
        })
        .collect();

    let period_lines = buckets
        .into_iter()
        .map(|bucket| {
            let spent_per_budget = spent_per_budget(
                budgets,
                expenses
                    .iter()
                    .filter(|expense| in_bucket(expense.journal.date, &bucket)),
            );

            PeriodLine {
                total: spent_per_budget.iter().sum(),
                spent_per_budget,
                bucket,
            }
        })
        .collect();

    let mut top_expenses = expenses.to_vec();
    top_expenses.sort_by(|a, b| {
        b.spent
            .total_cmp(&a.spent)
            .then_with(|| a.journal.date.cmp(&b.journal.date))
    });
    top_expenses.truncate(TOP_EXPENSE_COUNT);

    BudgetReportSummary {
        budget_lines,
        totals,
        account_lines,
        period_lines,
        top_expenses,
    }
}
