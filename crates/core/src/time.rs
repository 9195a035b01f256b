use chrono::{DateTime, Duration, Utc};

/// Time source shared by services so quiz timing stays deterministic in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock backed by the system time.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// Returns a clock pinned to the given instant.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. System clocks are left alone.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Whole seconds between `start` and `end`, floored and clamped at zero.
#[must_use]
pub fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let secs = (end - start).num_seconds().max(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}
