//! Time source for timestamps and calendar-day bucketing.
//!
//! Solve dates and streaks work in UTC calendar days; list timestamps use the
//! full instant. Both come from the same injected [`Clock`].

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Reads the system clock on every call.
    #[default]
    System,
    /// Always reports the same instant until advanced.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// A fixed clock at noon UTC on `date`, so small advances stay on the same day.
    #[must_use]
    pub fn on_date(date: NaiveDate) -> Self {
        Self::Fixed(date.and_time(NaiveTime::MIN + Duration::hours(12)).and_utc())
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// The current UTC calendar day.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Move a fixed clock forward (or back, with a negative delta). No-op for `System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }
}

/// Seconds since the epoch of the deterministic test instant (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// The deterministic test instant.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::default() + Duration::seconds(FIXED_TEST_TIMESTAMP)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_now_matches_the_documented_instant() {
        assert_eq!(fixed_now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn today_rolls_over_at_utc_midnight() {
        let mut clock = fixed_clock();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());

        clock.advance(Duration::hours(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 15).unwrap());
    }

    #[test]
    fn on_date_is_midday() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut clock = Clock::on_date(date);
        clock.advance(Duration::hours(-11));
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::system();
        clock.advance(Duration::days(3));
        assert_eq!(clock, Clock::System);
    }
}
