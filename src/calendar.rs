//! Epoch-day arithmetic on the proleptic Gregorian calendar.
//!
//! All instants in this crate are milliseconds since the Unix epoch. The
//! functions here translate calendar fields into such instants; the actual
//! calendar rules are delegated to `chrono::NaiveDate`.

use chrono::{Datelike, NaiveDate};

/// The number of milliseconds in a day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The number of milliseconds in an hour.
pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Returns the number of days between the Unix epoch and the given date,
/// or `None` if the fields do not name a valid date.
///
/// The year is an extended year: 0 is 1 BC, -1 is 2 BC, and so on.
pub fn fields_to_day(year: i32, month: u32, day: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, day).map(epoch_day)
}

/// Returns the instant of `millis_in_day` milliseconds into the given date.
pub fn fields_to_millis(year: i32, month: u32, day: u32, millis_in_day: i64) -> Option<i64> {
    fields_to_day(year, month, day)
        .and_then(|day| day.checked_mul(MILLIS_PER_DAY)?.checked_add(millis_in_day))
}

pub(crate) fn epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - EPOCH_DAYS_FROM_CE
}

/// The calendar year containing the instant. Instants outside the range
/// chrono can represent are clamped to its first or last year.
pub(crate) fn year_of(millis: i64) -> i32 {
    let days_from_ce = millis.div_euclid(MILLIS_PER_DAY) + EPOCH_DAYS_FROM_CE;
    match i32::try_from(days_from_ce)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
    {
        Some(date) => date.year(),
        None if days_from_ce < 0 => NaiveDate::MIN.year(),
        None => NaiveDate::MAX.year(),
    }
}

/// Day of the week of an epoch day, counted from Monday = 0.
pub(crate) fn weekday_of(day: i64) -> u32 {
    // 1970-01-01 was a Thursday.
    (day + 3).rem_euclid(7) as u32
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<i64> {
    Some(match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn epoch() {
        assert_eq!(fields_to_day(1970, 1, 1), Some(0));
        assert_eq!(fields_to_day(1969, 12, 31), Some(-1));
        assert_eq!(fields_to_day(2000, 3, 1), Some(11_017));
        assert_eq!(
            fields_to_millis(1970, 1, 2, 3 * MILLIS_PER_HOUR),
            Some(MILLIS_PER_DAY + 3 * MILLIS_PER_HOUR)
        );
    }

    #[test]
    fn invalid_fields() {
        assert_eq!(fields_to_day(2001, 2, 29), None);
        assert_eq!(fields_to_day(2001, 13, 1), None);
        assert_eq!(fields_to_day(2001, 4, 0), None);
        assert_eq!(fields_to_millis(2020, 1, 1, i64::MAX), None);
        assert_eq!(fields_to_millis(1900, 1, 1, i64::MIN), None);
    }

    #[test]
    fn years() {
        assert_eq!(year_of(0), 1970);
        assert_eq!(year_of(-1), 1969);
        assert_eq!(year_of(fields_to_millis(2024, 12, 31, MILLIS_PER_DAY - 1).unwrap()), 2024);
        assert_eq!(year_of(i64::MIN), NaiveDate::MIN.year());
        assert_eq!(year_of(i64::MAX), NaiveDate::MAX.year());
    }

    #[test]
    fn weekdays() {
        // Thursday
        assert_eq!(weekday_of(0), 3);
        // 2017-02-11 was a Saturday
        assert_eq!(weekday_of(fields_to_day(2017, 2, 11).unwrap()), 5);
        // 1890-03-02 was a Sunday
        assert_eq!(weekday_of(fields_to_day(1890, 3, 2).unwrap()), 6);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2023, 11), Some(30));
        assert_eq!(days_in_month(2023, 0), None);
    }
}
