//! Date bucketing shared by every time-series report.

use chrono::{DateTime, Datelike, Utc};

use crate::models::Timeframe;

/// Bucket key of `ts` for `timeframe`, in UTC.
///
/// - day: `YYYY-MM-DD`
/// - week: `YYYY-W<n>` with `n = ceil((day_of_month + day_of_week) / 7)` and
///   Sunday as day 0. This is a week-of-month label, not an ISO week, so keys
///   repeat every month. Existing dashboards depend on it.
/// - month: `YYYY-MM`
pub fn format_date(ts: DateTime<Utc>, timeframe: Timeframe) -> String {
    match timeframe {
        Timeframe::Day => ts.format("%Y-%m-%d").to_string(),
        Timeframe::Week => {
            let week = (ts.day() + ts.weekday().num_days_from_sunday()).div_ceil(7);
            format!("{}-W{}", ts.year(), week)
        }
        Timeframe::Month => ts.format("%Y-%m").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mid_january_sunday() {
        // 2023-01-15 is a Sunday.
        let ts = Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap();

        assert_eq!(format_date(ts, Timeframe::Day), "2023-01-15");
        assert_eq!(format_date(ts, Timeframe::Week), "2023-W3");
        assert_eq!(format_date(ts, Timeframe::Month), "2023-01");
    }

    #[test]
    fn test_week_label_uses_day_of_week_offset() {
        // Saturday 2023-01-07: ceil((7 + 6) / 7) = 2
        let saturday = Utc.with_ymd_and_hms(2023, 1, 7, 0, 0, 0).unwrap();
        // Sunday 2023-01-01: ceil((1 + 0) / 7) = 1
        let sunday = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(format_date(saturday, Timeframe::Week), "2023-W2");
        assert_eq!(format_date(sunday, Timeframe::Week), "2023-W1");
    }

    #[test]
    fn test_week_labels_repeat_across_months() {
        let jan = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let oct = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();

        assert_eq!(
            format_date(jan, Timeframe::Week),
            format_date(oct, Timeframe::Week)
        );
    }

    #[test]
    fn test_uses_utc_calendar_day() {
        let late = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();

        assert_eq!(format_date(late, Timeframe::Day), "2023-12-31");
        assert_eq!(format_date(late, Timeframe::Month), "2023-12");
    }
}
