//! Timing information for computations.
//!
//! [`Timing`] captures when an algorithm started and finished, both for the
//! elapsed-time diagnostic and for the record kept on each connection.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Start and end timestamps of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// When the computation started.
    pub started_at: Timestamp,
    /// When the computation ended.
    pub ended_at: Timestamp,
}

impl Timing {
    /// Create a new timing with the given start and end timestamps.
    pub fn new(started_at: Timestamp, ended_at: Timestamp) -> Self {
        Self {
            started_at,
            ended_at,
        }
    }

    /// Create a timing that started at `started_at` and ends now.
    pub fn since(started_at: Timestamp) -> Self {
        Self::new(started_at, Timestamp::now())
    }

    /// Get the duration of the computation.
    pub fn duration(&self) -> SignedDuration {
        self.ended_at.duration_since(self.started_at)
    }

    /// Get the duration of the computation in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.duration().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_between_timestamps() {
        let start = Timestamp::now();
        let end = start + SignedDuration::from_millis(1500);

        let timing = Timing::new(start, end);

        assert_eq!(timing.duration().as_millis(), 1500);
        assert!((timing.elapsed_secs() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_since_is_never_negative() {
        let timing = Timing::since(Timestamp::now());

        assert!(!timing.duration().is_negative());
    }
}
