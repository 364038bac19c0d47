#[macro_use]
extern crate log;

pub(crate) mod classifier;
pub use classifier::{
    BathClassifier, BathWindow, MAX_BATH_DURATION, MIN_BATH_DURATION, MORNING_END_HOUR,
    MORNING_START_HOUR, WindowError, classify_cold_baths, parse_start_timestamp,
};

pub(crate) mod correlation;
pub use correlation::{
    BathDayComparison, align, align_metric, correlate, correlate_metric, duplicate_dates, pearson,
};

pub mod helpers;
