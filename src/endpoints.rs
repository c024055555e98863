//! The API endpoints URIs.
//!
//! For endpoints that take a single parameter, e.g., '/api/v2/exchange-rates/{exchange_rate_id}',
//! use [format_endpoint].

/// The root route which redirects to the reports page.
pub const ROOT: &str = "/";
/// The page for choosing the accounts, budgets and dates of a report.
pub const REPORTS_VIEW: &str = "/reports";
/// The rendered budget report.
///
/// The ID lists are comma separated and the dates are formatted as `YYYYMMDD`.
pub const BUDGET_REPORT_VIEW: &str =
    "/reports/budget/{account_ids}/{budget_ids}/{start_date}/{end_date}";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route the report options form is submitted to.
pub const BUDGET_REPORT_API: &str = "/api/reports/budget";
/// The JSON API collection of exchange rates.
pub const EXCHANGE_RATES_API: &str = "/api/v2/exchange-rates";
/// The JSON API route for a single exchange rate.
pub const EXCHANGE_RATE_API: &str = "/api/v2/exchange-rates/{exchange_rate_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/v2/exchange-rates/{exchange_rate_id}',
/// '{exchange_rate_id}' is the parameter.
///
/// Only the first parameter is replaced. If no parameter is found in
/// `endpoint_path`, the original `endpoint_path` is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
