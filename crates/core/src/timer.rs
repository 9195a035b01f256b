use thiserror::Error;

/// Seconds each question gets unless configured otherwise.
pub const DEFAULT_QUESTION_SECS: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("countdown duration must be > 0 seconds")]
    ZeroDuration,
}

/// What a single one-second tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; carries the seconds left.
    Running(u32),
    /// Reached zero on this tick. Emitted once per reset.
    Expired,
    /// Paused, or already expired and holding at zero.
    Idle,
}

/// Per-question countdown.
///
/// The owner drives it with one `tick()` per elapsed second. It is bound to a
/// session position and starts over whenever that position changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration_secs: u32,
    remaining_secs: u32,
    paused: bool,
    expired: bool,
    bound_position: Option<usize>,
}

impl Countdown {
    /// # Errors
    ///
    /// Returns `TimerError::ZeroDuration` if `duration_secs` is zero.
    pub fn new(duration_secs: u32) -> Result<Self, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }
        Ok(Self {
            duration_secs,
            remaining_secs: duration_secs,
            paused: false,
            expired: false,
            bound_position: None,
        })
    }

    pub fn tick(&mut self) -> Tick {
        if self.paused || self.expired {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            return Tick::Expired;
        }
        Tick::Running(self.remaining_secs)
    }

    /// Restore the full duration and re-arm expiry. Pause state is kept.
    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.expired = false;
    }

    /// Bind to a session position, resetting if it differs from the current binding.
    ///
    /// Returns `true` when a reset happened.
    pub fn bind(&mut self, position: usize) -> bool {
        if self.bound_position == Some(position) {
            return false;
        }
        self.bound_position = Some(position);
        self.reset();
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[must_use]
    pub fn bound_position(&self) -> Option<usize> {
        self.bound_position
    }

    /// Remaining share of the duration in `[0, 1]`.
    #[must_use]
    pub fn fraction_remaining(&self) -> f64 {
        f64::from(self.remaining_secs) / f64::from(self.duration_secs)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_QUESTION_SECS,
            remaining_secs: DEFAULT_QUESTION_SECS,
            paused: false,
            expired: false,
            bound_position: None,
        }
    }
}
