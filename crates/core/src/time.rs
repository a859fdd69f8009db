use chrono::{Duration, Local, NaiveDate};

/// A simple clock abstraction for deterministic calendar days in services and tests.
///
/// Scheduling works on whole local days, so the clock hands out `NaiveDate`s.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(NaiveDate),
}

impl Clock {
    /// Returns a clock that follows the local calendar.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given day.
    #[must_use]
    pub fn fixed(on: NaiveDate) -> Self {
        Self::Fixed(on)
    }

    /// Returns today's date according to the clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Default => Local::now().date_naive(),
            Clock::Fixed(day) => *day,
        }
    }

    /// If this is a fixed clock, move it forward by `days`.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance_days(&mut self, days: i64) {
        if let Clock::Fixed(day) = self {
            *day += Duration::days(days);
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Returns a deterministic day (2023-11-14) for tests and doc examples.
#[must_use]
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 14).unwrap_or_default()
}

/// Returns a `Clock` fixed at the deterministic test day.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_today())
}
