use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
};

use chrono::{NaiveDate, TimeDelta};
use coldbath_types::{ColdBathObservation, SleepMetric, SleepObservation};

use crate::helpers::{
    format_hm::FormatHM,
    stats::{deviation_sums, mean},
};

fn bath_dates(baths: &[ColdBathObservation]) -> HashSet<NaiveDate> {
    baths.iter().map(|bath| bath.date).collect()
}

/// Pairs every sleep record with a bath indicator for its date.
///
/// Records keep their input order and are not grouped by date, so a date
/// reported twice yields two pairs.
pub fn align(sleep: &[SleepObservation], baths: &[ColdBathObservation]) -> Vec<(f64, f64)> {
    align_metric(sleep, baths, SleepMetric::TotalSleep)
}

/// Like [`align`] for an arbitrary metric. Records lacking the metric are left out.
pub fn align_metric(
    sleep: &[SleepObservation],
    baths: &[ColdBathObservation],
    metric: SleepMetric,
) -> Vec<(f64, f64)> {
    let bath_dates = bath_dates(baths);

    sleep
        .iter()
        .filter_map(|record| {
            let x = record.metric(metric)?;
            let y = if bath_dates.contains(&record.date) {
                1.0
            } else {
                0.0
            };
            Some((x, y))
        })
        .collect()
}

/// Pearson correlation coefficient over paired samples.
///
/// Returns `0.0` for empty input or when either series has no variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    let (var_x, var_y, cov) = deviation_sums(pairs);
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    cov / (var_x * var_y).sqrt()
}

/// Correlation between total sleep and whether a cold bath was taken that day.
pub fn correlate(sleep: &[SleepObservation], baths: &[ColdBathObservation]) -> f64 {
    correlate_metric(sleep, baths, SleepMetric::TotalSleep)
}

pub fn correlate_metric(
    sleep: &[SleepObservation],
    baths: &[ColdBathObservation],
    metric: SleepMetric,
) -> f64 {
    pearson(&align_metric(sleep, baths, metric))
}

/// Dates that appear more than once in `sleep`, sorted.
pub fn duplicate_dates(sleep: &[SleepObservation]) -> Vec<NaiveDate> {
    let mut counts = BTreeMap::<NaiveDate, usize>::new();
    for record in sleep {
        *counts.entry(record.date).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(date, _)| date)
        .collect()
}

/// Mean of a sleep metric on bath days compared with the remaining days.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BathDayComparison {
    pub metric: SleepMetric,
    pub bath_days: usize,
    pub other_days: usize,
    pub bath_mean: Option<f64>,
    pub other_mean: Option<f64>,
    pub correlation: f64,
}

impl BathDayComparison {
    pub fn new(
        sleep: &[SleepObservation],
        baths: &[ColdBathObservation],
        metric: SleepMetric,
    ) -> Self {
        let pairs = align_metric(sleep, baths, metric);
        let group = |bath_day: bool| {
            pairs
                .iter()
                .filter(|(_, y)| (*y > 0.0) == bath_day)
                .map(|(x, _)| *x)
                .collect::<Vec<f64>>()
        };
        let on = group(true);
        let off = group(false);

        let group_mean = |values: &[f64]| (!values.is_empty()).then(|| mean(values));

        Self {
            metric,
            bath_days: on.len(),
            other_days: off.len(),
            bath_mean: group_mean(&on),
            other_mean: group_mean(&off),
            correlation: pearson(&pairs),
        }
    }

    /// Bath-day mean minus other-day mean.
    pub fn difference(&self) -> Option<f64> {
        Some(self.bath_mean? - self.other_mean?)
    }

    pub fn format_value(&self, value: Option<f64>) -> String {
        match value {
            None => "-".to_owned(),
            Some(v) if self.metric.is_duration() => {
                TimeDelta::seconds(v.round() as i64).format_hm()
            }
            Some(v) => format!("{:.1}", v),
        }
    }
}

impl Display for BathDayComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Correlation between cold baths and {}: {:.2}",
            self.metric, self.correlation
        )?;
        writeln!(
            f,
            "Bath days: {} (mean {})",
            self.bath_days,
            self.format_value(self.bath_mean)
        )?;
        write!(
            f,
            "Other days: {} (mean {})",
            self.other_days,
            self.format_value(self.other_mean)
        )
    }
}
