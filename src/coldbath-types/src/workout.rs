use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A raw workout as delivered by a workout source.
///
/// `start` is `None` when the provider record had no usable start timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub start: Option<DateTime<FixedOffset>>,
    pub duration_seconds: f64,
    pub activity: Option<String>,
}

impl WorkoutSession {
    pub fn new(start: DateTime<FixedOffset>, duration_seconds: f64) -> Self {
        Self {
            start: Some(start),
            duration_seconds,
            activity: None,
        }
    }

    /// Calendar date in the offset the timestamp carries.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.start.map(|start| start.date_naive())
    }
}
