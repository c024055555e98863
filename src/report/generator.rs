use maud::Markup;
use rusqlite::Connection;
use time::Date;

use crate::{Error, account::Account, budget::Budget};

/// Renders a report over a set of accounts and budgets for a date range.
///
/// The setters are called before [ReportGenerator::generate]. Changing any
/// of them discards data collected for an earlier range or selection.
pub trait ReportGenerator {
    fn set_accounts(&mut self, accounts: Vec<Account>);

    fn set_budgets(&mut self, budgets: Vec<Budget>);

    fn set_start_date(&mut self, date: Date);

    fn set_end_date(&mut self, date: Date);

    /// Render the report page.
    ///
    /// # Errors
    /// Returns [Error::ReportGenerationError] if the data could not be
    /// collected or the page could not be rendered.
    fn generate(&mut self, connection: &Connection) -> Result<Markup, Error>;
}
