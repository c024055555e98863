//! The page that shows a rendered budget report.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use crate::{
    Error,
    account::get_accounts_by_ids,
    budget::get_budgets_by_ids,
    report::{
        BudgetReportGenerator, ReportGenerator, ReportState,
        url::{parse_id_list, parse_report_date},
    },
    user_group::ValidatedUserGroup,
};

/// Render the budget report for the accounts, budgets and dates in the URL.
///
/// Responds with 404 if the URL cannot be parsed or names accounts or budgets
/// that do not belong to the user group.
pub async fn get_budget_report_page(
    State(state): State<ReportState>,
    user_group: ValidatedUserGroup,
    Path((account_ids, budget_ids, start_date, end_date)): Path<(String, String, String, String)>,
) -> Result<Response, Error> {
    let (Some(account_ids), Some(budget_ids), Some(start), Some(end)) = (
        parse_id_list(&account_ids),
        parse_id_list(&budget_ids),
        parse_report_date(&start_date),
        parse_report_date(&end_date),
    ) else {
        tracing::debug!(
            "Could not parse report URL {account_ids}/{budget_ids}/{start_date}/{end_date}"
        );
        return Err(Error::NotFound);
    };

    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_accounts_by_ids(&account_ids, user_group.id(), &connection)?;
    let budgets = get_budgets_by_ids(&budget_ids, user_group.id(), &connection)?;

    if accounts.is_empty() || budgets.is_empty() {
        tracing::debug!("No accounts or budgets of user group {} match the report URL", user_group.id());
        return Err(Error::NotFound);
    }

    let mut generator = BudgetReportGenerator::new(&user_group);
    generator.set_accounts(accounts);
    generator.set_budgets(budgets);
    generator.set_start_date(start);
    generator.set_end_date(end);

    let report = generator.generate(&connection)?;

    Ok(Html(report.into_string()).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use time::macros::date;

    use crate::{
        database_id::DatabaseId,
        journal::{NewJournal, TransactionType, create_journal, test_utils::get_fixture},
        report::ReportState,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        user_group::ValidatedUserGroup,
    };

    use super::get_budget_report_page;

    struct TestContext {
        state: ReportState,
        user_group: ValidatedUserGroup,
        checking_id: DatabaseId,
        groceries_id: DatabaseId,
    }

    fn get_test_context() -> TestContext {
        let fixture = get_fixture();
        create_journal(
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

        TestContext {
            user_group: ValidatedUserGroup {
                group: fixture.group.clone(),
                primary_currency: fixture.euro.clone(),
            },
            checking_id: fixture.checking.id,
            groceries_id: fixture.groceries.id,
            state: ReportState {
                db_connection: Arc::new(Mutex::new(fixture.connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
        }
    }

    async fn get_page(context: TestContext, path: [&str; 4]) -> Response {
        let [account_ids, budget_ids, start_date, end_date] = path.map(str::to_owned);

        get_budget_report_page(
            State(context.state),
            context.user_group,
            Path((account_ids, budget_ids, start_date, end_date)),
        )
        .await
        .into_response()
    }

    #[tokio::test]
    async fn renders_report() {
        let context = get_test_context();
        let account_ids = context.checking_id.to_string();
        let budget_ids = context.groceries_id.to_string();

        let response = get_page(context, [&account_ids, &budget_ids, "20240101", "20240131"]).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Weekly shop"));
        assert!(html.html().contains("€45.50"));
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let context = get_test_context();
        let budget_ids = context.groceries_id.to_string();

        let response = get_page(context, ["one,two", &budget_ids, "20240101", "20240131"]).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_dates_are_not_found() {
        let context = get_test_context();
        let account_ids = context.checking_id.to_string();
        let budget_ids = context.groceries_id.to_string();

        let response = get_page(context, [&account_ids, &budget_ids, "20240231", "20240301"]).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn end_before_start_is_bad_request() {
        let context = get_test_context();
        let account_ids = context.checking_id.to_string();
        let budget_ids = context.groceries_id.to_string();

        let response = get_page(context, [&account_ids, &budget_ids, "20240201", "20240101"]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_accounts_are_not_found() {
        let context = get_test_context();
        let budget_ids = context.groceries_id.to_string();

        let response = get_page(context, ["999", &budget_ids, "20240101", "20240131"]).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
