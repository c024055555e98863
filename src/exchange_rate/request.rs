//! Validation of the JSON bodies sent to the exchange rate endpoints.
//!
//! Fields are read as raw JSON values so that a value of the wrong type is
//! reported as a validation error on that field.

use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use time::{
    Date,
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
};

use crate::{
    Error,
    currency::{Currency, get_currency_by_code},
    json_api::ValidationErrors,
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const EARLIEST_DATE: Date = date!(1900 - 01 - 01);
const LATEST_DATE: Date = date!(2099 - 12 - 31);

/// The body of a request to change an exchange rate.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExchangeRateRequest {
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

/// An update that passed validation.
#[derive(Debug, PartialEq)]
pub struct ValidatedUpdate {
    pub rate: f64,
    /// The new date of the rate, or `None` to keep the current date.
    pub date: Option<Date>,
}

impl UpdateExchangeRateRequest {
    /// Check the request fields.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] with a message for every invalid field.
    pub fn validate(&self) -> Result<ValidatedUpdate, Error> {
        let mut errors = ValidationErrors::default();

        let rate = validate_rate(self.rate.as_ref(), &mut errors);
        let date = match self.date.as_ref() {
            None | Some(Value::Null) => None,
            Some(value) => validate_date(value, &mut errors),
        };

        match rate {
            Some(rate) if errors.is_empty() => Ok(ValidatedUpdate { rate, date }),
            _ => Err(Error::InvalidRequest(errors)),
        }
    }
}

/// The body of a request to record a new exchange rate.
#[derive(Debug, Default, Deserialize)]
pub struct StoreExchangeRateRequest {
    /// The code of the currency converted from, e.g. "EUR".
    #[serde(default)]
    pub from: Option<Value>,
    /// The code of the currency converted to.
    #[serde(default)]
    pub to: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub rate: Option<Value>,
}

/// A new exchange rate that passed validation.
#[derive(Debug, PartialEq)]
pub struct ValidatedStore {
    pub from: Currency,
    pub to: Currency,
    pub date: Date,
    pub rate: f64,
}

impl StoreExchangeRateRequest {
    /// Check the request fields and look up the currencies by their codes.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] with a message for every invalid field,
    /// or another [Error] if the currencies could not be queried.
    pub fn validate(&self, connection: &Connection) -> Result<ValidatedStore, Error> {
        let mut errors = ValidationErrors::default();

        let from = validate_currency("from", self.from.as_ref(), connection, &mut errors)?;
        let to = validate_currency("to", self.to.as_ref(), connection, &mut errors)?;
        let date = match self.date.as_ref() {
            None | Some(Value::Null) => {
                errors.add("date", "The date field is required.");
                None
            }
            Some(value) => validate_date(value, &mut errors),
        };
        let rate = validate_rate(self.rate.as_ref(), &mut errors);

        if from
            .as_ref()
            .zip(to.as_ref())
            .is_some_and(|(from, to)| from.id == to.id)
        {
            errors.add("to", "The to field and from must be different.");
        }

        match (from, to, date, rate) {
            (Some(from), Some(to), Some(date), Some(rate)) if errors.is_empty() => {
                Ok(ValidatedStore {
                    from,
                    to,
                    date,
                    rate,
                })
            }
            _ => Err(Error::InvalidRequest(errors)),
        }
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// A rate must be a number, or a string holding one, greater than zero.
fn validate_rate(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<f64> {
    if is_blank(value) {
        errors.add("rate", "The rate field is required.");
        return None;
    }

    let rate = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rate {
        Some(rate) if !rate.is_finite() => {
            errors.add("rate", "The rate field must be a number.");
            None
        }
        Some(rate) if rate <= 0.0 => {
            errors.add("rate", "The rate field must be greater than 0.");
            None
        }
        Some(rate) => Some(rate),
        None => {
            errors.add("rate", "The rate field must be a number.");
            None
        }
    }
}

/// A date must be written as YYYY-MM-DD and lie strictly between 1900-01-01 and 2099-12-31.
fn validate_date(value: &Value, errors: &mut ValidationErrors) -> Option<Date> {
    let Some(date) = value
        .as_str()
        .and_then(|text| Date::parse(text.trim(), DATE_FORMAT).ok())
    else {
        errors.add("date", "The date field must be a valid date.");
        return None;
    };

    if date <= EARLIEST_DATE {
        errors.add("date", "The date field must be a date after 1900-01-01.");
        return None;
    }

    if date >= LATEST_DATE {
        errors.add("date", "The date field must be a date before 2099-12-31.");
        return None;
    }

    Some(date)
}

fn validate_currency(
    field: &str,
    value: Option<&Value>,
    connection: &Connection,
    errors: &mut ValidationErrors,
) -> Result<Option<Currency>, Error> {
    if is_blank(value) {
        errors.add(field, &format!("The {field} field is required."));
        return Ok(None);
    }

    let Some(code) = value.and_then(Value::as_str) else {
        errors.add(field, &format!("The selected {field} is invalid."));
        return Ok(None);
    };

    match get_currency_by_code(&code.trim().to_uppercase(), connection) {
        Ok(currency) => Ok(Some(currency)),
        Err(Error::NotFound) => {
            errors.add(field, &format!("The selected {field} is invalid."));
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
