use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Time source for export stamps and the days-left counter.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Calendar day (UTC) according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Whole days left until midnight UTC of `deadline`, rounded up and
    /// never negative.
    #[must_use]
    pub fn days_until(&self, deadline: NaiveDate) -> u32 {
        let target = deadline.and_time(chrono::NaiveTime::MIN).and_utc();
        let remaining = target - self.now();
        if remaining <= TimeDelta::zero() {
            return 0;
        }
        let day_ms = TimeDelta::days(1).num_milliseconds();
        let days = (remaining.num_milliseconds() + day_ms - 1) / day_ms;
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

/// Deterministic timestamp for tests (2025-03-01T12:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_740_830_400;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
