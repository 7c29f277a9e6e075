//! This module defines the domain data types.
//!
//! Every stored entity carries a generated string id and a creation
//! timestamp in epoch milliseconds, both assigned by the record store.
//! Each entity has a `New*` companion holding the caller-supplied fields.

pub use budget::{Budget, NewBudget};
pub use category::{BudgetingStyle, EarningCategory, ExpenditureCategory};
pub use earning::{Earning, NewEarning};
pub use expenditure::{Expenditure, NewExpenditure};
pub use finance::{Finance, NewFinance};
pub use money::Amount;
pub use summary::{
    MonthlyEarningSum, MonthlyExpenditureSum, MonthlySummary, NewMonthlyEarningSum,
    NewMonthlyExpenditureSum,
};
pub use tip::{NewTip, Tip};
pub use user::{NewUser, User, UserProfile};

mod budget;
mod category;
mod earning;
mod expenditure;
mod finance;
mod money;
mod summary;
mod tip;
mod user;

use time::{Date, macros::format_description};

use crate::Error;

/// Alias for the generated record identifier.
pub type RecordId = String;

/// Alias for a creation timestamp in epoch milliseconds.
pub type Timestamp = i64;

/// Derive the zero-padded `month` ("01"–"12") and `year` ("2022") of an ISO
/// date string, validating the date along the way.
///
/// Transactions always derive their month and year from the submitted date,
/// so the two can never drift apart.
///
/// # Errors
/// Returns [Error::InvalidDate] if `date` is not a valid `YYYY-MM-DD` date.
pub fn month_and_year(date: &str) -> Result<(String, String), Error> {
    let format = format_description!("[year]-[month]-[day]");
    let parsed =
        Date::parse(date, &format).map_err(|_| Error::InvalidDate(date.to_string()))?;

    Ok((
        format!("{:02}", parsed.month() as u8),
        format!("{:04}", parsed.year()),
    ))
}

/// Check that `month` is a two-digit "01"–"12" string.
///
/// # Errors
/// Returns [Error::InvalidMonth] otherwise.
pub fn validate_month(month: &str) -> Result<(), Error> {
    let in_range = month.len() == 2
        && month.chars().all(|c| c.is_ascii_digit())
        && (1..=12).contains(&month.parse::<u8>().unwrap_or(0));

    if in_range {
        Ok(())
    } else {
        Err(Error::InvalidMonth(month.to_string()))
    }
}

/// Check that `year` is a four-digit string.
///
/// # Errors
/// Returns [Error::InvalidYear] otherwise.
pub fn validate_year(year: &str) -> Result<(), Error> {
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidYear(year.to_string()))
    }
}
