//! The budget report: budgeted against spent for a set of accounts and budgets.

use maud::Markup;
use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::Account,
    budget::{Budget, BudgetId, get_budget_limits_in_range},
    currency::Currency,
    exchange_rate::ExchangeRateConverter,
    journal::{ExtractedJournal, JournalCollector, TransactionType},
    report::{
        ReportGenerator,
        charts::{budget_bar_chart, spending_pie_chart},
        period::ReportPeriod,
        summary::{ConvertedExpense, ConvertedLimit, summarize},
        view::{BudgetReportView, budget_report_view},
    },
    user_group::{UserGroupId, ValidatedUserGroup},
};

/// Generates the budget report of one user group, with every amount shown in
/// the group's primary currency.
#[derive(Debug, Clone)]
pub struct BudgetReportGenerator {
    user_group_id: UserGroupId,
    currency: Currency,
    accounts: Vec<Account>,
    budgets: Vec<Budget>,
    start: Option<Date>,
    end: Option<Date>,
    expenses: Option<Vec<ExtractedJournal>>,
}

impl BudgetReportGenerator {
    pub fn new(user_group: &ValidatedUserGroup) -> Self {
        Self {
            user_group_id: user_group.id(),
            currency: user_group.primary_currency.clone(),
            accounts: Vec::new(),
            budgets: Vec::new(),
            start: None,
            end: None,
            expenses: None,
        }
    }

    fn range(&self) -> Result<(Date, Date), Error> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(Error::InvalidDateRange { start, end }),
            (Some(start), Some(end)) => Ok((start, end)),
            (None, _) => Err(Error::ReportGenerationError(
                "the report has no start date".to_owned(),
            )),
            (_, None) => Err(Error::ReportGenerationError(
                "the report has no end date".to_owned(),
            )),
        }
    }

    fn budget_ids(&self) -> Vec<BudgetId> {
        self.budgets.iter().map(|budget| budget.id).collect()
    }

    /// The withdrawals from the selected accounts against the selected budgets
    /// in the report range.
    ///
    /// The journals are queried once and reused until a setter is called.
    pub fn get_expenses(&mut self, connection: &Connection) -> Result<&[ExtractedJournal], Error> {
        if self.expenses.is_some() {
            tracing::debug!("Return previous set of expenses.");
        } else {
            let (start, end) = self.range()?;
            let account_ids: Vec<_> = self.accounts.iter().map(|account| account.id).collect();

            let expenses = JournalCollector::new(self.user_group_id)
                .set_accounts(&account_ids)
                .set_range(start, end)
                .set_types(&[TransactionType::Withdrawal])
                .set_budgets(&self.budget_ids())
                .with_account_information()
                .with_budget_information()
                .get_extracted_journals(connection)?;

            tracing::debug!(
                "Collected {} expenses from {start} to {end}.",
                expenses.len()
            );
            self.expenses = Some(expenses);
        }

        Ok(self.expenses.as_deref().unwrap_or_default())
    }

    fn render(&mut self, connection: &Connection) -> Result<Markup, Error> {
        let (start, end) = self.range()?;
        let expenses = self.get_expenses(connection)?.to_vec();
        let mut converter = ExchangeRateConverter::new(connection, self.user_group_id);

        let expenses = expenses
            .into_iter()
            .map(|journal| {
                let converted = converter.convert(
                    journal.amount,
                    journal.currency_id,
                    self.currency.id,
                    journal.date,
                )?;

                Ok(ConvertedExpense {
                    spent: -converted,
                    journal,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let limits = get_budget_limits_in_range(&self.budget_ids(), start, end, connection)?
            .into_iter()
            .map(|limit| {
                Ok(ConvertedLimit {
                    budget_id: limit.budget_id,
                    amount: converter.convert(
                        limit.amount,
                        limit.currency_id,
                        self.currency.id,
                        limit.start,
                    )?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let period = ReportPeriod::for_range(start, end);
        let summary = summarize(
            &self.accounts,
            &self.budgets,
            period.buckets(start, end),
            &expenses,
            &limits,
        );
        let charts = [
            spending_pie_chart(&summary, &self.currency),
            budget_bar_chart(&summary, &self.currency),
        ];

        Ok(budget_report_view(&BudgetReportView {
            user_group_id: self.user_group_id,
            currency: &self.currency,
            accounts: &self.accounts,
            budgets: &self.budgets,
            start,
            end,
            period,
            summary: &summary,
            charts: &charts,
        }))
    }
}

impl ReportGenerator for BudgetReportGenerator {
    fn set_accounts(&mut self, accounts: Vec<Account>) {
        self.accounts = accounts;
        self.expenses = None;
    }

    fn set_budgets(&mut self, budgets: Vec<Budget>) {
        self.budgets = budgets;
        self.expenses = None;
    }

    fn set_start_date(&mut self, date: Date) {
        self.start = Some(date);
        self.expenses = None;
    }

    fn set_end_date(&mut self, date: Date) {
        self.end = Some(date);
        self.expenses = None;
    }

    fn generate(&mut self, connection: &Connection) -> Result<Markup, Error> {
        self.render(connection).map_err(|error| {
            tracing::error!("Cannot render report: {error}");
            Error::ReportGenerationError(format!("Could not render report view: {error}"))
        })
    }
}
