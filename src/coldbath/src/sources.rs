use std::future::Future;

use chrono::{Days, NaiveDate};
use coldbath_types::{SleepObservation, WorkoutSession};

use crate::SourceError;

pub mod garmin;
pub use garmin::GarminClient;

pub mod oura;
pub use oura::OuraClient;

/// Inclusive range of calendar days to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days before `today`, plus `today`. `None` when the start
    /// falls outside the representable calendar.
    pub fn last_days(days: u32, today: NaiveDate) -> Option<Self> {
        Some(Self {
            start: today.checked_sub_days(Days::new(u64::from(days)))?,
            end: today,
        })
    }
}

pub trait SleepSource {
    fn fetch_sleep(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<SleepObservation>, SourceError>> + Send;
}

pub trait WorkoutSource {
    fn fetch_workouts(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<WorkoutSession>, SourceError>> + Send;
}
