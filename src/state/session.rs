//! Countdown session and the validated duration it is built from

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::InputError;

/// A countdown duration in whole minutes, always within 1..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Minutes(u32);

impl Minutes {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 999;

    pub fn new(value: u32) -> Result<Self, InputError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::OutOfRange)
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl TryFrom<i64> for Minutes {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| InputError::OutOfRange)
            .and_then(Self::new)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One countdown-to-disable cycle, owned by the timer service task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownSession {
    pub duration_minutes: Minutes,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Monotonic deadline the tick loop measures against
    #[serde(skip)]
    pub deadline: Instant,
}

impl CountdownSession {
    /// Begin a session now
    pub fn begin(duration_minutes: Minutes) -> Self {
        Self::begin_at(duration_minutes, Instant::now())
    }

    /// Begin a session whose monotonic clock starts at `start`
    pub fn begin_at(duration_minutes: Minutes, start: Instant) -> Self {
        let duration = duration_minutes.as_duration();
        let started_at = Utc::now();
        let ends_at = started_at
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());

        Self {
            duration_minutes,
            started_at,
            ends_at,
            deadline: start + duration,
        }
    }

    /// Milliseconds left at `now`, or `None` once the deadline has passed
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self.deadline.checked_duration_since(now) {
            Some(left) if !left.is_zero() => Some(left),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_accepts_only_the_supported_range() {
        assert_eq!(Minutes::new(0), Err(InputError::OutOfRange));
        assert_eq!(Minutes::new(1).map(Minutes::get), Ok(1));
        assert_eq!(Minutes::new(999).map(Minutes::get), Ok(999));
        assert_eq!(Minutes::new(1000), Err(InputError::OutOfRange));
        assert_eq!(Minutes::try_from(-5_i64), Err(InputError::OutOfRange));
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_reaches_none_exactly_at_the_deadline() {
        let session = CountdownSession::begin(Minutes::new(1).unwrap());
        let start = Instant::now();

        assert_eq!(session.remaining_at(start), Some(Duration::from_secs(60)));
        assert_eq!(
            session.remaining_at(start + Duration::from_millis(59_999)),
            Some(Duration::from_millis(1))
        );
        assert_eq!(session.remaining_at(start + Duration::from_secs(60)), None);
        assert_eq!(session.remaining_at(start + Duration::from_secs(61)), None);
    }

    #[test]
    fn wall_clock_end_matches_duration() {
        let session = CountdownSession::begin(Minutes::new(15).unwrap());
        assert_eq!(session.ends_at - session.started_at, chrono::Duration::minutes(15));
    }
}
