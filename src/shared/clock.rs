use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, TimeZone, Utc};

/// Source of "now" for services that make time-relative decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Midnight of the calendar day containing `now`, as seen from `offset`
pub fn start_of_day(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    let utc_midnight = local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc_midnight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day_utc() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            start_of_day(now, offset),
            Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_east_of_utc_rolls_forward() {
        // 20:00 UTC is already the next day in UTC+7
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(
            start_of_day(now, wib),
            Utc.with_ymd_and_hms(2026, 3, 14, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_west_of_utc() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 2, 0, 0).unwrap();
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            start_of_day(now, est),
            Utc.with_ymd_and_hms(2026, 3, 13, 5, 0, 0).unwrap()
        );
    }
}
