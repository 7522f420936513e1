use chrono::{DateTime, Duration, Utc};

/// Clock abstraction so services and tests can control timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that reads the system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock pinned to the given instant.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Current time according to this clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Advances a fixed clock by `delta`; no effect on `Clock::Default`.
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

/// Deterministic timestamp for tests (2024-05-01T00:00:00Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_714_521_600;

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

/// Returns a `Clock` pinned to the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), clock.now());
        assert!(clock.is_fixed());
    }

    #[test]
    fn advance_moves_fixed_clock_only() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(30));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(30));

        let mut system = Clock::default_clock();
        system.advance(Duration::seconds(30));
        assert!(!system.is_fixed());
    }
}
