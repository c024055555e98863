//! Budget reports: the options form, the redirect to a report URL and the
//! rendered report page.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod budget_report;
mod charts;
mod generator;
mod options_endpoint;
mod options_page;
mod period;
mod report_page;
mod summary;
mod url;
mod view;

pub use budget_report::BudgetReportGenerator;
pub use generator::ReportGenerator;
pub use options_endpoint::post_report_options;
pub use options_page::get_reports_page;
pub use report_page::get_budget_report_page;

/// The state needed by the report pages.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading accounts, budgets and journals.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
