//! Helpers for working with the server's configured local timezone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, OffsetDateTimeExt, TimeZone, Tz, timezones};

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone name.
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    timezones::get_by_name(canonical_timezone)
}

/// Get the current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if `canonical_timezone` is not a known timezone name.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    get_timezone(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `timezone`.
pub fn local_today(timezone: &Tz) -> Date {
    OffsetDateTime::now_utc().to_timezone(timezone).date()
}
