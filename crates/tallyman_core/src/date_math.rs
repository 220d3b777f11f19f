//! Calendar helpers for holding periods.
//!
//! Day differences use Rata Die day numbering, which avoids building a jiff
//! `Span` for every disposal in a long ledger.

use jiff::civil::Date;

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Number of days from `d1` to `d2`, positive when `d2 > d1`.
#[inline]
pub fn days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Number of anniversaries of `start` reached on or before `end`.
pub fn complete_years(start: Date, end: Date) -> u32 {
    if end <= start {
        return 0;
    }
    let mut years = (end.year() - start.year()) as i32;
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Policy years a chargeable holding was held, counting the year of the
/// disposal itself. Never less than one.
pub fn years_held_inclusive(start: Date, end: Date) -> u32 {
    complete_years(start, end) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_days_between_matches_jiff() {
        let pairs = [
            (date(2020, 1, 1), date(2030, 6, 15)),
            (date(2024, 2, 29), date(2025, 2, 28)),
            (date(2000, 3, 1), date(2100, 3, 1)),
            (date(2025, 12, 31), date(2026, 1, 1)),
        ];
        for (d1, d2) in pairs {
            let jiff_days = (d2 - d1).get_days();
            assert_eq!(days_between(d1, d2), jiff_days, "mismatch for {d1} → {d2}");
        }
    }

    #[test]
    fn test_days_between_negative() {
        assert_eq!(days_between(date(2025, 1, 2), date(2025, 1, 1)), -1);
    }

    #[test]
    fn test_complete_years() {
        assert_eq!(complete_years(date(2020, 6, 15), date(2020, 6, 15)), 0);
        assert_eq!(complete_years(date(2020, 6, 15), date(2021, 6, 14)), 0);
        assert_eq!(complete_years(date(2020, 6, 15), date(2021, 6, 15)), 1);
        assert_eq!(complete_years(date(2020, 6, 15), date(2025, 1, 1)), 4);
        assert_eq!(complete_years(date(2025, 1, 1), date(2020, 1, 1)), 0);
    }

    #[test]
    fn test_years_held_inclusive() {
        assert_eq!(years_held_inclusive(date(2024, 3, 1), date(2024, 3, 1)), 1);
        assert_eq!(years_held_inclusive(date(2020, 6, 15), date(2025, 1, 1)), 5);
        assert_eq!(years_held_inclusive(date(2020, 6, 15), date(2025, 6, 15)), 6);
    }
}
