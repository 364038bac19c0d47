use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A cold bath taken on `date`. Several may share a date, only presence matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColdBathObservation {
    pub date: NaiveDate,
}

impl ColdBathObservation {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl From<NaiveDate> for ColdBathObservation {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}
