//! The HTML page of a budget report.

use maud::{Markup, html};
use time::{Date, macros::format_description};

use crate::{
    account::Account,
    budget::Budget,
    currency::{Currency, format_amount},
    endpoints,
    html::{
        AMOUNT_CELL_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, SECTION_HEADING_STYLE,
        TABLE_CELL_RED_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base,
    },
    navigation::NavBar,
    report::{
        charts::{ECHARTS_SCRIPT, ReportChart, charts_script, charts_view},
        period::ReportPeriod,
        summary::BudgetReportSummary,
    },
    user_group::UserGroupId,
};

/// Everything the report page shows.
pub(super) struct BudgetReportView<'a> {
    pub user_group_id: UserGroupId,
    pub currency: &'a Currency,
    pub accounts: &'a [Account],
    pub budgets: &'a [Budget],
    pub start: Date,
    pub end: Date,
    pub period: ReportPeriod,
    pub summary: &'a BudgetReportSummary,
    pub charts: &'a [ReportChart],
}

/// Format `date` for display, e.g. "5 Jan 2024".
fn format_date(date: Date) -> String {
    date.format(format_description!("[day padding:none] [month repr:short] [year]"))
        .unwrap_or_else(|_| date.to_string())
}

fn format_percent(percent: Option<f64>) -> String {
    percent.map_or_else(|| "-".to_owned(), |percent| format!("{percent:.0}%"))
}

fn joined_ids(ids: impl Iterator<Item = i64>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

fn left_style(left: f64) -> String {
    if left < 0.0 {
        format!("{AMOUNT_CELL_STYLE} {TABLE_CELL_RED_STYLE}")
    } else {
        AMOUNT_CELL_STYLE.to_owned()
    }
}

fn period_heading(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Month => "Spending per period",
        ReportPeriod::Year => "Spending per month",
        ReportPeriod::MultiYear => "Spending per year",
    }
}

fn budgets_table(view: &BudgetReportView) -> Markup {
    let summary = view.summary;
    let currency = view.currency;

    html! {
        div class="overflow-x-auto rounded-lg shadow" {
            table id="budgets-table" class=(TABLE_STYLE) {
                thead class=(TABLE_HEADER_STYLE) {
                    tr {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Budgeted" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Spent" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Left" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Spent (%)" }
                    }
                }
                tbody {
                    @for line in &summary.budget_lines {
                        tr class=(TABLE_ROW_STYLE) {
                            td class=(TABLE_CELL_STYLE) { (line.budget.name) }
                            td class=(AMOUNT_CELL_STYLE) { (format_amount(line.budgeted, currency)) }
                            td class=(AMOUNT_CELL_STYLE) { (format_amount(line.spent, currency)) }
                            td class=(left_style(line.left)) { (format_amount(line.left, currency)) }
                            td class=(AMOUNT_CELL_STYLE) { (format_percent(line.percent_spent)) }
                        }
                    }
                }
                tfoot {
                    tr class="font-semibold text-gray-900 dark:text-white" {
                        th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(AMOUNT_CELL_STYLE) { (format_amount(summary.totals.budgeted, currency)) }
                        td class=(AMOUNT_CELL_STYLE) { (format_amount(summary.totals.spent, currency)) }
                        td class=(left_style(summary.totals.left)) { (format_amount(summary.totals.left, currency)) }
                        td class=(AMOUNT_CELL_STYLE) { (format_percent(summary.totals.percent_spent)) }
                    }
                }
            }
        }
    }
}

/// A table with a row per label and a column per budget.
fn spending_matrix<'a>(
    id: &str,
    first_column: &str,
    budgets: &[Budget],
    rows: impl Iterator<Item = (&'a str, &'a [f64], f64)>,
    currency: &Currency,
) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow" {
            table id=(id) class=(TABLE_STYLE) {
                thead class=(TABLE_HEADER_STYLE) {
                    tr {
                        th scope="col" class=(TABLE_CELL_STYLE) { (first_column) }
                        @for budget in budgets {
                            th scope="col" class=(AMOUNT_CELL_STYLE) { (budget.name) }
                        }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Total" }
                    }
                }
                tbody {
                    @for (label, spent_per_budget, total) in rows {
                        tr class=(TABLE_ROW_STYLE) {
                            td class=(TABLE_CELL_STYLE) { (label) }
                            @for spent in spent_per_budget {
                                td class=(AMOUNT_CELL_STYLE) { (format_amount(*spent, currency)) }
                            }
                            td class={(AMOUNT_CELL_STYLE) " font-semibold"} { (format_amount(total, currency)) }
                        }
                    }
                }
            }
        }
    }
}

fn top_expenses_table(view: &BudgetReportView) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow" {
            table id="top-expenses-table" class=(TABLE_STYLE) {
                thead class=(TABLE_HEADER_STYLE) {
                    tr {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Spent" }
                    }
                }
                tbody {
                    @for expense in &view.summary.top_expenses {
                        tr class=(TABLE_ROW_STYLE) {
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (format_date(expense.journal.date)) }
                            td class=(TABLE_CELL_STYLE) { (expense.journal.description) }
                            td class=(TABLE_CELL_STYLE) {
                                (expense.journal.source_account_name.as_deref().unwrap_or_default())
                            }
                            td class=(TABLE_CELL_STYLE) {
                                (expense.journal.budget_name.as_deref().unwrap_or_default())
                            }
                            td class=(AMOUNT_CELL_STYLE) { (format_amount(expense.spent, view.currency)) }
                        }
                    }
                }
            }
        }
    }
}

/// Render the full budget report page.
pub(super) fn budget_report_view(view: &BudgetReportView) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let options_url = format!(
        "{}?user_group_id={}",
        endpoints::REPORTS_VIEW,
        view.user_group_id
    );
    let account_names: Vec<&str> = view
        .accounts
        .iter()
        .map(|account| account.name.as_str())
        .collect();
    let budget_names: Vec<&str> = view.budgets.iter().map(|budget| budget.name.as_str()).collect();

    let account_rows = view.summary.account_lines.iter().map(|line| {
        (
            line.account.name.as_str(),
            line.spent_per_budget.as_slice(),
            line.total,
        )
    });
    let period_rows = view.summary.period_lines.iter().map(|line| {
        (
            line.bucket.label.as_str(),
            line.spent_per_budget.as_slice(),
            line.total,
        )
    });

    let content = html!(
        (nav_bar)

        div
            id="report"
            class=(PAGE_CONTAINER_STYLE)
            data-account-ids=(joined_ids(view.accounts.iter().map(|account| account.id)))
            data-budget-ids=(joined_ids(view.budgets.iter().map(|budget| budget.id)))
        {
            header class="w-full mb-8" {
                h1 class="text-2xl font-bold mb-2" {
                    "Budget report from " (format_date(view.start)) " to " (format_date(view.end))
                }
                p class="text-gray-600 dark:text-gray-400" {
                    "Accounts: " (account_names.join(", "))
                }
                p class="text-gray-600 dark:text-gray-400" {
                    "Budgets: " (budget_names.join(", "))
                }
                p class="text-gray-600 dark:text-gray-400" {
                    "All amounts are in " (view.currency.name) " (" (view.currency.code) ")."
                }
                a href=(options_url) class=(LINK_STYLE) { "Change report options" }
            }

            (charts_view(view.charts))

            section class="w-full mb-8" {
                h2 class=(SECTION_HEADING_STYLE) { "Budgets" }
                (budgets_table(view))
            }

            section class="w-full mb-8" {
                h2 class=(SECTION_HEADING_STYLE) { "Spending per account" }
                (spending_matrix("accounts-table", "Account", view.budgets, account_rows, view.currency))
            }

            @if !view.summary.period_lines.is_empty() {
                section class="w-full mb-8" {
                    h2 class=(SECTION_HEADING_STYLE) { (period_heading(view.period)) }
                    (spending_matrix("periods-table", "Period", view.budgets, period_rows, view.currency))
                }
            }

            section class="w-full mb-8" {
                h2 class=(SECTION_HEADING_STYLE) { "Top expenses" }
                @if view.summary.top_expenses.is_empty() {
                    p { "No expenses in this period." }
                } @else {
                    (top_expenses_table(view))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(view.charts),
    ];

    base("Budget Report", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        account::{Account, AccountType},
        budget::Budget,
        currency::Currency,
        report::{
            period::{PeriodBucket, ReportPeriod},
            summary::summarize,
        },
        test_utils::assert_valid_html,
    };

    use super::{BudgetReportView, budget_report_view, format_date};

    fn render(period: ReportPeriod, buckets: Vec<PeriodBucket>) -> Html {
        let currency = Currency {
            id: 1,
            code: "EUR".to_owned(),
            name: "Euro".to_owned(),
            symbol: "€".to_owned(),
            decimal_places: 2,
        };
        let accounts = [Account {
            id: 3,
            user_group_id: 1,
            name: "Checking".to_owned(),
            account_type: AccountType::Asset,
            currency_id: 1,
        }];
        let budgets = [
            Budget {
                id: 5,
                user_group_id: 1,
                name: "Groceries".to_owned(),
                active: true,
            },
            Budget {
                id: 7,
                user_group_id: 1,
                name: "Rent".to_owned(),
                active: true,
            },
        ];
        let summary = summarize(&accounts, &budgets, buckets, &[], &[]);

        let markup = budget_report_view(&BudgetReportView {
            user_group_id: 1,
            currency: &currency,
            accounts: &accounts,
            budgets: &budgets,
            start: date!(2024 - 01 - 01),
            end: date!(2024 - 03 - 31),
            period,
            summary: &summary,
            charts: &[],
        });

        Html::parse_document(&markup.into_string())
    }

    #[test]
    fn formats_dates() {
        assert_eq!(format_date(date!(2024 - 01 - 05)), "5 Jan 2024");
    }

    #[test]
    fn report_lists_selection() {
        let html = render(ReportPeriod::Month, vec![]);
        assert_valid_html(&html);

        let report = html
            .select(&Selector::parse("#report").unwrap())
            .next()
            .expect("no report container");
        assert_eq!(report.value().attr("data-account-ids"), Some("3"));
        assert_eq!(report.value().attr("data-budget-ids"), Some("5,7"));

        let heading: String = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("no heading")
            .text()
            .collect();
        assert_eq!(heading.trim(), "Budget report from 1 Jan 2024 to 31 Mar 2024");

        let budget_rows = html
            .select(&Selector::parse("#budgets-table tbody tr").unwrap())
            .count();
        assert_eq!(budget_rows, 2);
    }

    #[test]
    fn period_table_only_when_there_are_buckets() {
        let html = render(ReportPeriod::Month, vec![]);
        assert!(html.select(&Selector::parse("#periods-table").unwrap()).next().is_none());

        let buckets = ReportPeriod::Year.buckets(date!(2024 - 01 - 01), date!(2024 - 03 - 31));
        let html = render(ReportPeriod::Year, buckets);
        let rows = html
            .select(&Selector::parse("#periods-table tbody tr").unwrap())
            .count();
        assert_eq!(rows, 3);
    }
}
