//! Handles the report options form and redirects to the selected report.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form collects repeated keys, e.g. `accounts=1&accounts=2`, into a Vec.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::AccountId,
    budget::BudgetId,
    report::url::budget_report_url,
    user_group::ValidatedUserGroup,
};

/// The form data of the report options page.
#[derive(Debug, Deserialize)]
pub struct ReportOptionsForm {
    /// The IDs of the checked accounts.
    #[serde(default)]
    pub accounts: Vec<AccountId>,
    /// The IDs of the checked budgets.
    #[serde(default)]
    pub budgets: Vec<BudgetId>,
    pub start_date: Date,
    pub end_date: Date,
}

fn dedup_ids(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Validate the report options and redirect the client to the report page.
pub async fn post_report_options(
    user_group: Result<ValidatedUserGroup, Error>,
    Form(form): Form<ReportOptionsForm>,
) -> Response {
    let user_group = match user_group {
        Ok(user_group) => user_group,
        Err(error) => return error.into_alert_response(),
    };

    if form.accounts.is_empty() {
        return Error::EmptyAccountSelection.into_alert_response();
    }

    if form.budgets.is_empty() {
        return Error::EmptyBudgetSelection.into_alert_response();
    }

    if form.end_date < form.start_date {
        return Error::InvalidDateRange {
            start: form.start_date,
            end: form.end_date,
        }
        .into_alert_response();
    }

    let url = budget_report_url(
        &dedup_ids(form.accounts),
        &dedup_ids(form.budgets),
        form.start_date,
        form.end_date,
        user_group.id(),
    );
    tracing::debug!("Redirecting to report {url}");

    (HxRedirect(url), StatusCode::OK).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        Error,
        currency::Currency,
        test_utils::{assert_hx_redirect, parse_html_fragment},
        user_group::{UserGroup, ValidatedUserGroup},
    };

    use super::{ReportOptionsForm, post_report_options};

    fn user_group() -> ValidatedUserGroup {
        ValidatedUserGroup {
            group: UserGroup {
                id: 4,
                title: "Household".to_owned(),
                primary_currency_id: 1,
            },
            primary_currency: Currency {
                id: 1,
                code: "EUR".to_owned(),
                name: "Euro".to_owned(),
                symbol: "€".to_owned(),
                decimal_places: 2,
            },
        }
    }

    fn form(accounts: Vec<i64>, budgets: Vec<i64>) -> ReportOptionsForm {
        ReportOptionsForm {
            accounts,
            budgets,
            start_date: date!(2024 - 01 - 01),
            end_date: date!(2024 - 03 - 31),
        }
    }

    #[test]
    fn parses_repeated_form_keys() {
        let form: ReportOptionsForm = serde_html_form::from_str(
            "accounts=1&accounts=2&budgets=3&start_date=2024-01-01&end_date=2024-01-31",
        )
        .unwrap();

        assert_eq!(form.accounts, vec![1, 2]);
        assert_eq!(form.budgets, vec![3]);
        assert_eq!(form.start_date, date!(2024 - 01 - 01));
        assert_eq!(form.end_date, date!(2024 - 01 - 31));
    }

    #[test]
    fn unchecked_boxes_are_empty_lists() {
        let form: ReportOptionsForm =
            serde_html_form::from_str("start_date=2024-01-01&end_date=2024-01-31").unwrap();

        assert!(form.accounts.is_empty());
        assert!(form.budgets.is_empty());
    }

    #[tokio::test]
    async fn redirects_to_report() {
        let response = post_report_options(Ok(user_group()), Form(form(vec![3, 1, 3], vec![7]))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_hx_redirect(
            &response,
            "/reports/budget/1,3/7/20240101/20240331?user_group_id=4",
        );
    }

    #[tokio::test]
    async fn rejects_empty_account_selection() {
        let response = post_report_options(Ok(user_group()), Form(form(vec![], vec![7]))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("No accounts selected"));
    }

    #[tokio::test]
    async fn rejects_empty_budget_selection() {
        let response = post_report_options(Ok(user_group()), Form(form(vec![1], vec![]))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("No budgets selected"));
    }

    #[tokio::test]
    async fn rejects_end_before_start() {
        let mut form = form(vec![1], vec![7]);
        form.end_date = date!(2023 - 12 - 31);

        let response = post_report_options(Ok(user_group()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn forbidden_group_is_an_alert() {
        let response = post_report_options(
            Err(Error::UserGroupForbidden(9)),
            Form(form(vec![1], vec![7])),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
