//! Encoding a report selection in the URL of the report page.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{account::AccountId, budget::BudgetId, endpoints, user_group::UserGroupId};

/// Dates in report URLs look like `20240131`.
const REPORT_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]");

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn format_report_date(date: Date) -> String {
    date.format(REPORT_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// The URL of the budget report for the given selection.
pub fn budget_report_url(
    account_ids: &[AccountId],
    budget_ids: &[BudgetId],
    start: Date,
    end: Date,
    user_group_id: UserGroupId,
) -> String {
    let path = endpoints::BUDGET_REPORT_VIEW
        .replace("{account_ids}", &join_ids(account_ids))
        .replace("{budget_ids}", &join_ids(budget_ids))
        .replace("{start_date}", &format_report_date(start))
        .replace("{end_date}", &format_report_date(end));

    format!("{path}?user_group_id={user_group_id}")
}

/// Parse a comma separated list of IDs, e.g. `1,2,3`.
///
/// Returns `None` if any entry is not an integer.
pub fn parse_id_list(text: &str) -> Option<Vec<i64>> {
    text.split(',')
        .filter(|part| !part.is_empty())
        .map(|part| part.trim().parse().ok())
        .collect()
}

/// Parse a date formatted like `20240131`.
pub fn parse_report_date(text: &str) -> Option<Date> {
    Date::parse(text, REPORT_DATE_FORMAT).ok()
}
