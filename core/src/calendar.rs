//! Application-year calendar arithmetic.
//!
//! The enrollment cycle does not follow the calendar year: points earned for
//! an application year expire on November 30 of that year, and the next cycle
//! opens on December 1. Everything date-related in the ledger goes through
//! this module so the two boundary dates live in exactly one place.

use chrono::{NaiveDate, NaiveDateTime};

/// Month of the annual point-expiry boundary (November).
pub const EXPIRY_MONTH: u32 = 11;

/// Day of the annual point-expiry boundary (the 30th).
pub const EXPIRY_DAY: u32 = 30;

/// Month the new application cycle opens (December).
pub const RESET_MONTH: u32 = 12;

/// Day the new application cycle opens (the 1st).
pub const RESET_DAY: u32 = 1;

/// Expiry timestamp for points earned in the given application year.
///
/// Points are active through the last second of November 30 and expired from
/// December 1 onward (the sweep uses a strict `expires_at < now` comparison).
///
/// # Example
/// ```
/// use agency_ledger_core::calendar::point_expiry;
/// use chrono::{Datelike, Timelike};
///
/// let expiry = point_expiry(2026);
/// assert_eq!((expiry.month(), expiry.day()), (11, 30));
/// assert_eq!((expiry.hour(), expiry.minute(), expiry.second()), (23, 59, 59));
/// ```
pub fn point_expiry(application_year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(application_year, EXPIRY_MONTH, EXPIRY_DAY)
        .expect("Nov 30 exists in every year")
        .and_hms_opt(23, 59, 59)
        .expect("valid time of day")
}

/// The application year a given date falls in.
///
/// December belongs to the following application year: the cycle for year Y
/// runs from December 1 of Y-1 through November 30 of Y.
pub fn application_year(today: NaiveDate) -> i32 {
    use chrono::Datelike;
    if today.month() >= RESET_MONTH {
        today.year() + 1
    } else {
        today.year()
    }
}

/// The annual reset date within the calendar year of `today`.
pub fn reset_date(today: NaiveDate) -> NaiveDate {
    use chrono::Datelike;
    NaiveDate::from_ymd_opt(today.year(), RESET_MONTH, RESET_DAY)
        .expect("Dec 1 exists in every year")
}

/// Whether `today` is the annual cycle-reset date.
pub fn is_reset_day(today: NaiveDate) -> bool {
    today == reset_date(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_expiry_is_last_second_of_november() {
        let expiry = point_expiry(2025);
        assert_eq!(
            expiry,
            NaiveDate::from_ymd_opt(2025, 11, 30)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
    }

    #[test]
    fn test_application_year_rolls_over_in_december() {
        let november = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let december = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        assert_eq!(application_year(november), 2025);
        assert_eq!(application_year(december), 2026);
    }

    #[test]
    fn test_is_reset_day() {
        assert!(is_reset_day(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
        assert!(!is_reset_day(NaiveDate::from_ymd_opt(2025, 12, 2).unwrap()));
        assert!(!is_reset_day(NaiveDate::from_ymd_opt(2025, 11, 30).unwrap()));
    }
}
