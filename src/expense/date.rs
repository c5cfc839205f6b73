//! Parsing and serialization of the calendar date stored with each expense.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use time_tz::{OffsetDateTimeExt, Tz};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const LOCAL_DATE_TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
);

// Expense dates go over the wire as a date-time at midnight.
time::serde::format_description!(
    pub(crate) midnight_format,
    Date,
    "[year]-[month]-[day]T00:00:00"
);

/// Parse the `createdAt` value sent by a client into a calendar date.
///
/// Accepts a plain date (`2024-06-15`), an RFC 3339 date-time, which is
/// converted to `local_timezone` using the offset in force at that instant
/// before the date is taken, or a date-time without an offset, which is
/// already local time. The time of day is always dropped.
///
/// # Errors
/// Returns [Error::Validation] if `text` matches none of the formats above.
pub fn parse_expense_date(text: &str, local_timezone: &Tz) -> Result<Date, Error> {
    let text = text.trim();

    if let Ok(date) = Date::parse(text, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Ok(date_time.to_timezone(local_timezone).date());
    }

    if let Ok(date_time) = PrimitiveDateTime::parse(text, LOCAL_DATE_TIME_FORMAT) {
        return Ok(date_time.date());
    }

    tracing::debug!("Could not parse expense date {text:?}");

    Err(Error::Validation("Invalid createdAt date.".to_owned()))
}
