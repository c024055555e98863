//! The page where the user picks the accounts, budgets and dates of a report.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    account::{Account, get_asset_accounts},
    budget::{Budget, get_active_budgets},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    report::ReportState,
    timezone::get_local_date,
    user_group::{UserGroupId, ValidatedUserGroup},
};

struct ReportOptions<'a> {
    user_group_id: UserGroupId,
    accounts: &'a [Account],
    budgets: &'a [Budget],
    start_date: Date,
    end_date: Date,
}

fn checkbox_list<'a>(name: &str, items: impl Iterator<Item = (i64, &'a str)>) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 gap-2"
        {
            @for (id, label) in items {
                label class="flex items-center space-x-2"
                {
                    input
                        type="checkbox"
                        name=(name)
                        value=(id)
                        checked
                        class=(FORM_CHECKBOX_STYLE);

                    span { (label) }
                }
            }
        }
    }
}

fn report_options_view(options: &ReportOptions) -> Markup {
    let post_url = format!(
        "{}?user_group_id={}",
        endpoints::BUDGET_REPORT_API,
        options.user_group_id
    );
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(post_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Budget Report" }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Accounts" }

                    @if options.accounts.is_empty() {
                        p class="text-sm text-gray-600 dark:text-gray-400" { "There are no asset accounts yet." }
                    } @else {
                        (checkbox_list(
                            "accounts",
                            options.accounts.iter().map(|account| (account.id, account.name.as_str())),
                        ))
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Budgets" }

                    @if options.budgets.is_empty() {
                        p class="text-sm text-gray-600 dark:text-gray-400" { "There are no active budgets yet." }
                    } @else {
                        (checkbox_list(
                            "budgets",
                            options.budgets.iter().map(|budget| (budget.id, budget.name.as_str())),
                        ))
                    }
                }

                div
                {
                    label
                        for="start_date"
                        class=(FORM_LABEL_STYLE)
                    {
                        "Start date"
                    }

                    input
                        name="start_date"
                        id="start_date"
                        type="date"
                        required
                        value=(options.start_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label
                        for="end_date"
                        class=(FORM_LABEL_STYLE)
                    {
                        "End date"
                    }

                    input
                        name="end_date"
                        id="end_date"
                        type="date"
                        required
                        value=(options.end_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Show Report"
                }
            }
        }
    };

    base("Reports", &[], &content)
}

/// Renders the report options form for the user group in the request.
///
/// All asset accounts and active budgets are selected by default and the
/// dates default to the current month up to today.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    user_group: ValidatedUserGroup,
) -> Result<Response, Error> {
    let today = get_local_date(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let (accounts, budgets) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_asset_accounts(user_group.id(), &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve accounts for the reports page: {error}")
        })?;
        let budgets = get_active_budgets(user_group.id(), &connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve budgets for the reports page: {error}")
        })?;

        (accounts, budgets)
    };

    let options = ReportOptions {
        user_group_id: user_group.id(),
        accounts: &accounts,
        budgets: &budgets,
        start_date: today.replace_day(1).unwrap_or(today),
        end_date: today,
    };

    Ok(Html(report_options_view(&options).into_string()).into_response())
}
