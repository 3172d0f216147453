//! Business day arithmetic on top of a holiday [`Calendar`].
//!
//! A business day is a calendar day that is neither a Saturday, nor a
//! Sunday, nor a public holiday. All walks move one calendar day at a
//! time, so month and year boundaries and multi-day holiday clusters
//! (e.g. the two Carnival days) fall out of the iteration naturally.

use crate::calendar::Calendar;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::sync::Arc;

/// Business day predicates and walks. Pure and deterministic given the
/// calendar; cheap to clone and share.
#[derive(Clone)]
pub struct BusinessDays {
    calendar: Arc<Calendar>,
}

impl BusinessDays {
    pub fn new(calendar: Arc<Calendar>) -> BusinessDays {
        BusinessDays { calendar }
    }

    /// False for Saturday, Sunday, or any holiday of the calendar
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.calendar.is_holiday(date)
    }

    /// The `n`-th business day strictly before `date`.
    ///
    /// The returned date is itself a business day. `n == 0` returns
    /// `date` unchanged.
    pub fn business_days_before(&self, date: NaiveDate, n: u32) -> NaiveDate {
        self.walk(date, n, -1)
    }

    /// The `n`-th business day strictly after `date`, analogous to
    /// [`business_days_before`](Self::business_days_before)
    pub fn business_days_after(&self, date: NaiveDate, n: u32) -> NaiveDate {
        self.walk(date, n, 1)
    }

    /// Number of business days in the closed range `[start, end]`
    pub fn count_business_days_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if self.is_business_day(current) {
                count += 1;
            }
            current += Duration::days(1);
        }
        count
    }

    fn walk(&self, date: NaiveDate, n: u32, step: i64) -> NaiveDate {
        let mut current = date;
        let mut remaining = n;
        while remaining > 0 {
            current += Duration::days(step);
            if self.is_business_day(current) {
                remaining -= 1;
            }
        }
        current
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc() -> BusinessDays {
        BusinessDays::new(Arc::new(Calendar::brazil()))
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn weekends_are_never_business_days() {
        let calc = calc();
        let mut current = date(2025, 1, 1);
        let end = date(2025, 12, 31);
        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                assert!(!calc.is_business_day(current), "{} is a weekend", current);
            }
            current += Duration::days(1);
        }
    }

    #[test]
    fn holidays_are_not_business_days() {
        let calc = calc();
        assert!(!calc.is_business_day(date(2025, 5, 1)));
        assert!(!calc.is_business_day(date(2025, 3, 3)));
        assert!(calc.is_business_day(date(2025, 3, 5)));
    }

    #[test]
    fn seven_business_days_before_a_plain_monday() {
        // 2025-01-20 is a Monday; walking back 7 business days skips the
        // weekends of Jan 11-12 and Jan 18-19
        let calc = calc();
        assert_eq!(
            calc.business_days_before(date(2025, 1, 20), 7),
            date(2025, 1, 9)
        );
    }

    #[test]
    fn walk_backward_skips_carnival_cluster() {
        // Carnival 2025 falls on Mar 3 and Mar 4
        let calc = calc();
        assert_eq!(
            calc.business_days_before(date(2025, 3, 10), 7),
            date(2025, 2, 25)
        );
    }

    #[test]
    fn walk_backward_crosses_year_boundary() {
        let calc = calc();
        assert_eq!(
            calc.business_days_before(date(2025, 1, 2), 7),
            date(2024, 12, 20)
        );
    }

    #[test]
    fn walk_forward_skips_weekend_and_carnival() {
        let calc = calc();
        assert_eq!(
            calc.business_days_after(date(2025, 2, 28), 1),
            date(2025, 3, 5)
        );
    }

    #[test]
    fn zero_walk_is_identity() {
        let calc = calc();
        assert_eq!(calc.business_days_before(date(2025, 1, 20), 0), date(2025, 1, 20));
        assert_eq!(calc.business_days_after(date(2025, 1, 20), 0), date(2025, 1, 20));
    }

    #[test]
    fn backward_walk_count_round_trip() {
        let calc = calc();
        for n in 1..10 {
            let end = date(2025, 3, 10);
            let start = calc.business_days_before(end, n);
            assert!(calc.is_business_day(start));
            assert_eq!(
                calc.count_business_days_between(start, end) as u32,
                n + 1,
                "n = {}",
                n
            );
        }
    }
}
