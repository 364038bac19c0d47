use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One night of sleep as reported by the tracker, keyed by the reporting day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SleepObservation {
    pub date: NaiveDate,
    pub total_sleep_seconds: f64,
    pub deep_sleep_seconds: Option<f64>,
    pub resting_heart_rate: Option<f64>,
}

impl SleepObservation {
    pub fn new(date: NaiveDate, total_sleep_seconds: f64) -> Self {
        Self {
            date,
            total_sleep_seconds,
            deep_sleep_seconds: None,
            resting_heart_rate: None,
        }
    }

    pub fn with_deep_sleep(mut self, seconds: f64) -> Self {
        self.deep_sleep_seconds = Some(seconds);
        self
    }

    pub fn with_resting_heart_rate(mut self, bpm: f64) -> Self {
        self.resting_heart_rate = Some(bpm);
        self
    }

    pub fn metric(&self, metric: SleepMetric) -> Option<f64> {
        match metric {
            SleepMetric::TotalSleep => Some(self.total_sleep_seconds),
            SleepMetric::DeepSleep => self.deep_sleep_seconds,
            SleepMetric::RestingHeartRate => self.resting_heart_rate,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepMetric {
    #[default]
    #[serde(rename = "total")]
    TotalSleep,
    #[serde(rename = "deep")]
    DeepSleep,
    #[serde(rename = "rhr")]
    RestingHeartRate,
}

impl SleepMetric {
    pub fn label(self) -> &'static str {
        match self {
            SleepMetric::TotalSleep => "sleep duration",
            SleepMetric::DeepSleep => "deep sleep duration",
            SleepMetric::RestingHeartRate => "resting heart rate",
        }
    }

    /// Metrics measured in seconds are rendered as hours:minutes.
    pub fn is_duration(self) -> bool {
        !matches!(self, SleepMetric::RestingHeartRate)
    }
}

impl Display for SleepMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SleepMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" | "sleep" | "total_sleep" => Ok(Self::TotalSleep),
            "deep" | "deep_sleep" => Ok(Self::DeepSleep),
            "rhr" | "resting_heart_rate" => Ok(Self::RestingHeartRate),
            _ => Err(format!("unknown sleep metric `{s}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn total_sleep_always_present() {
        let obs = SleepObservation::new(day(), 28_800.0);
        assert_eq!(obs.metric(SleepMetric::TotalSleep), Some(28_800.0));
        assert_eq!(obs.metric(SleepMetric::DeepSleep), None);
        assert_eq!(obs.metric(SleepMetric::RestingHeartRate), None);
    }

    #[test]
    fn optional_metrics() {
        let obs = SleepObservation::new(day(), 28_800.0)
            .with_deep_sleep(5_400.0)
            .with_resting_heart_rate(52.0);
        assert_eq!(obs.metric(SleepMetric::DeepSleep), Some(5_400.0));
        assert_eq!(obs.metric(SleepMetric::RestingHeartRate), Some(52.0));
    }

    #[test]
    fn metric_from_str() {
        assert_eq!("deep".parse::<SleepMetric>(), Ok(SleepMetric::DeepSleep));
        assert_eq!("rhr".parse::<SleepMetric>(), Ok(SleepMetric::RestingHeartRate));
        assert!("steps".parse::<SleepMetric>().is_err());
    }

    #[test]
    fn serde_shape() {
        let obs = SleepObservation::new(day(), 100.0);
        let json = serde_json::to_value(obs).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["total_sleep_seconds"], 100.0);
        assert!(json["deep_sleep_seconds"].is_null());
    }
}
