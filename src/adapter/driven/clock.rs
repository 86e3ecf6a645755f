use crate::domain::port::Clock;
use chrono::{DateTime, NaiveDate, Utc};

/// システム時計
/// 実際の現在時刻を返す
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時計
/// 日付に依存するビジネスルールのテストに使用する
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// 指定した日時で固定された時計を作成
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_returns_fixed_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
        let clock = FixedClock::new(now);

        assert_eq!(clock.now(), now);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_system_clock_today_matches_now() {
        let clock = SystemClock::new();
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
