//! crates/wedding_site_core/src/countdown.rs
//!
//! The countdown engine: a remaining-time breakdown against a fixed target instant.
//! Scheduling the once-per-second tick is the host's job; this module only computes.

use chrono::{DateTime, Utc};
use crate::domain::TimeRemaining;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

impl TimeRemaining {
    /// Decomposes `target - now` into days, hours, minutes and seconds.
    ///
    /// Clamped: once `now >= target` every field is zero.
    pub fn between(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let distance = (target - now).num_milliseconds();
        if distance <= 0 {
            return TimeRemaining::ZERO;
        }
        let ms = distance as u64;

        TimeRemaining {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

/// Holds the target instant and the most recently computed breakdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<Utc>,
    remaining: TimeRemaining,
}

impl Countdown {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self {
            target,
            remaining: TimeRemaining::ZERO,
        }
    }

    /// Recomputes the breakdown for `now` and returns it.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimeRemaining {
        self.remaining = TimeRemaining::between(self.target, now);
        self.remaining
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub fn remaining(&self) -> TimeRemaining {
        self.remaining
    }

    pub fn has_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.target
    }
}
