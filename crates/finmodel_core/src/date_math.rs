//! Day counting and UK tax-year arithmetic.
//!
//! Growth is compounded over day counts on every step of the evaluation loop,
//! so day differences use Rata Die numbering instead of building a
//! `jiff::Span` for each pair of dates.
//!
//! A UK tax year runs from 6 April to 5 April of the following calendar year
//! and is identified here by the calendar year in which it starts.

use jiff::civil::{Date, date};

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

/// Number of days from `d1` to `d2`, negative when `d2` is earlier.
#[inline]
pub fn days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// The tax year containing `d`.
#[inline]
pub fn tax_year_of(d: Date) -> i16 {
    if (d.month(), d.day()) >= (4, 6) {
        d.year()
    } else {
        d.year() - 1
    }
}

/// First day (6 April) of tax year `year`.
#[inline]
pub fn tax_year_start(year: i16) -> Date {
    date(year, 4, 6)
}

/// Last day (5 April of the next calendar year) of tax year `year`.
#[inline]
pub fn tax_year_end(year: i16) -> Date {
    date(year + 1, 4, 5)
}

/// Whether `d` falls inside tax year `year`.
#[inline]
pub fn in_tax_year(d: Date, year: i16) -> bool {
    tax_year_of(d) == year
}

/// The first tax-year end on or after `d`.
pub fn next_tax_year_end(d: Date) -> Date {
    tax_year_end(tax_year_of(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_between_same_date() {
        let d = date(2025, 6, 15);
        assert_eq!(days_between(d, d), 0);
    }

    #[test]
    fn test_days_between_sign() {
        assert_eq!(days_between(date(2025, 1, 1), date(2025, 1, 2)), 1);
        assert_eq!(days_between(date(2025, 1, 2), date(2025, 1, 1)), -1);
    }

    #[test]
    fn test_days_between_matches_jiff() {
        let pairs = [
            (date(2018, 4, 6), date(2019, 4, 5)),
            (date(2024, 2, 29), date(2025, 2, 28)),
            (date(2000, 3, 1), date(2100, 3, 1)),
            (date(2017, 12, 31), date(2018, 1, 1)),
        ];
        for (d1, d2) in pairs {
            let jiff_days = (d2 - d1).get_days();
            assert_eq!(days_between(d1, d2), jiff_days, "mismatch for {d1} -> {d2}");
        }
    }

    #[test]
    fn test_tax_year_boundaries() {
        assert_eq!(tax_year_of(date(2018, 4, 5)), 2017);
        assert_eq!(tax_year_of(date(2018, 4, 6)), 2018);
        assert_eq!(tax_year_of(date(2018, 3, 10)), 2017);
        assert_eq!(tax_year_of(date(2018, 12, 31)), 2018);
        assert_eq!(tax_year_of(date(2019, 1, 1)), 2018);
    }

    #[test]
    fn test_tax_year_start_and_end() {
        assert_eq!(tax_year_start(2018), date(2018, 4, 6));
        assert_eq!(tax_year_end(2018), date(2019, 4, 5));
        assert!(in_tax_year(date(2019, 4, 5), 2018));
        assert!(!in_tax_year(date(2019, 4, 6), 2018));
    }

    #[test]
    fn test_next_tax_year_end() {
        assert_eq!(next_tax_year_end(date(2018, 1, 1)), date(2018, 4, 5));
        assert_eq!(next_tax_year_end(date(2018, 4, 5)), date(2018, 4, 5));
        assert_eq!(next_tax_year_end(date(2018, 4, 6)), date(2019, 4, 5));
    }
}
