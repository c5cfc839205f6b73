//! Translates the `year` and `month` query parameters into a date range.

use serde::Deserialize;
use time::{Date, Month};

use crate::Error;

/// The optional query parameters used to filter the expense list.
///
/// Both are kept as text so that bad values produce our own error messages
/// instead of a generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterQuery {
    /// The calendar year, e.g. "2024".
    pub year: Option<String>,
    /// The month of `year`, from "1" to "12".
    pub month: Option<String>,
}

/// A half-open range of dates, `[start, end)`.
///
/// `end` is `None` when the range runs to the last representable date, which
/// happens for the final year and month of the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The first date after the range.
    pub end: Option<Date>,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && self.end.is_none_or(|end| date < end)
    }
}

fn invalid_year() -> Error {
    Error::Validation("Invalid year parameter.".to_owned())
}

fn invalid_month() -> Error {
    Error::Validation("Invalid month parameter.".to_owned())
}

/// Build the date range selected by `year` and, optionally, `month`.
///
/// Returns `Ok(None)` when neither parameter is given. Empty strings count
/// as absent.
///
/// # Errors
/// Returns [Error::Validation] if:
/// - `year` is not an integer or its first day cannot be represented,
/// - `month` is not an integer between 1 and 12,
/// - or `month` is given without `year`.
pub fn build_date_range(
    year: Option<&str>,
    month: Option<&str>,
) -> Result<Option<DateRange>, Error> {
    let year = year.map(str::trim).filter(|year| !year.is_empty());
    let month = month.map(str::trim).filter(|month| !month.is_empty());

    let year = match (year, month) {
        (None, None) => return Ok(None),
        (None, Some(_)) => {
            return Err(Error::Validation(
                "The month parameter requires a year parameter.".to_owned(),
            ));
        }
        (Some(year), _) => year.parse::<i32>().map_err(|_| invalid_year())?,
    };

    let range = match month {
        None => DateRange {
            start: first_of_month(Some(year), Month::January).ok_or_else(invalid_year)?,
            end: first_of_month(year.checked_add(1), Month::January),
        },
        Some(month) => {
            let month = month
                .parse::<u8>()
                .ok()
                .and_then(|month| Month::try_from(month).ok())
                .ok_or_else(invalid_month)?;
            let end_year = if month == Month::December {
                year.checked_add(1)
            } else {
                Some(year)
            };

            DateRange {
                start: first_of_month(Some(year), month).ok_or_else(invalid_year)?,
                end: first_of_month(end_year, month.next()),
            }
        }
    };

    Ok(Some(range))
}

fn first_of_month(year: Option<i32>, month: Month) -> Option<Date> {
    Date::from_calendar_date(year?, month, 1).ok()
}
