//! Billing period cutoff
//!
//! The utility only accepts readings for the current period up to the 25th
//! of the month; later submissions are booked against the next period.

use chrono::{Datelike, NaiveDate};

/// Last day of the month that still counts for the current period
pub const CUTOFF_DAY: u32 = 25;

const CUTOFF_WARNING: &str = "Readings submitted after the 25th are not accepted for the \
                              current billing period (only for the next).";

/// Warning text if `date` is past the cutoff
pub fn cutoff_warning(date: NaiveDate) -> Option<&'static str> {
    (date.day() > CUTOFF_DAY).then_some(CUTOFF_WARNING)
}

/// Warning to show for a run on `date`, unless the user turned it off
pub fn cutoff_notice(date: NaiveDate, suppressed: bool) -> Option<&'static str> {
    if suppressed {
        return None;
    }
    cutoff_warning(date)
}

/// Today's local date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_before_cutoff() {
        assert_eq!(cutoff_warning(date(1)), None);
        assert_eq!(cutoff_warning(date(24)), None);
    }

    #[test]
    fn test_on_cutoff_day() {
        assert_eq!(cutoff_warning(date(25)), None);
    }

    #[test]
    fn test_after_cutoff() {
        assert!(cutoff_warning(date(26)).is_some());
        assert!(cutoff_warning(date(31))
            .unwrap()
            .contains("next"));
    }

    #[test]
    fn test_notice_after_cutoff() {
        assert_eq!(cutoff_notice(date(26), false), cutoff_warning(date(26)));
        assert!(cutoff_notice(date(26), false).is_some());
    }

    #[test]
    fn test_notice_suppressed() {
        assert_eq!(cutoff_notice(date(26), true), None);
        assert_eq!(cutoff_notice(date(31), true), None);
        assert_eq!(cutoff_notice(date(10), false), None);
    }

    #[test]
    fn test_short_month() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(cutoff_warning(feb).is_some());
    }
}
