use chrono::{DateTime, Duration, FixedOffset, Timelike as _};
use coldbath_types::{ColdBathObservation, WorkoutSession};
use thiserror::Error;

pub const MORNING_START_HOUR: u32 = 6;
pub const MORNING_END_HOUR: u32 = 10;
pub const MIN_BATH_DURATION: Duration = Duration::seconds(120);
pub const MAX_BATH_DURATION: Duration = Duration::seconds(300);

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("morning window {start}:00-{end}:00 is empty or out of range")]
    InvalidHours { start: u32, end: u32 },
    #[error("duration window {min}s-{max}s is empty or negative")]
    InvalidDuration { min: i64, max: i64 },
}

/// Time-of-day and duration bounds a workout must fall into to count as a cold bath.
///
/// Hours are half-open `[start_hour, end_hour)`, durations are closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BathWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub min_duration: Duration,
    pub max_duration: Duration,
}

impl Default for BathWindow {
    fn default() -> Self {
        Self {
            start_hour: MORNING_START_HOUR,
            end_hour: MORNING_END_HOUR,
            min_duration: MIN_BATH_DURATION,
            max_duration: MAX_BATH_DURATION,
        }
    }
}

impl BathWindow {
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(WindowError::InvalidHours {
                start: self.start_hour,
                end: self.end_hour,
            });
        }

        if self.min_duration < Duration::zero() || self.min_duration > self.max_duration {
            return Err(WindowError::InvalidDuration {
                min: self.min_duration.num_seconds(),
                max: self.max_duration.num_seconds(),
            });
        }

        Ok(())
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        (self.start_hour..self.end_hour).contains(&hour)
    }

    pub fn contains_duration(&self, seconds: f64) -> bool {
        let min = self.min_duration.num_milliseconds() as f64 / 1000.0;
        let max = self.max_duration.num_milliseconds() as f64 / 1000.0;
        (min..=max).contains(&seconds)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BathClassifier {
    window: BathWindow,
}

impl BathClassifier {
    pub fn new(window: BathWindow) -> Result<Self, WindowError> {
        window.validate()?;
        Ok(Self { window })
    }

    pub fn window(&self) -> BathWindow {
        self.window
    }

    /// One observation per qualifying session, in input order.
    pub fn classify(&self, sessions: &[WorkoutSession]) -> Vec<ColdBathObservation> {
        sessions
            .iter()
            .filter_map(|session| self.classify_session(session))
            .collect()
    }

    pub fn classify_session(&self, session: &WorkoutSession) -> Option<ColdBathObservation> {
        let Some(start) = session.start else {
            trace!("skipping workout without start timestamp");
            return None;
        };

        if !self.window.contains_hour(start.hour()) {
            return None;
        }

        if !self.window.contains_duration(session.duration_seconds) {
            return None;
        }

        Some(ColdBathObservation::new(start.date_naive()))
    }
}

pub fn classify_cold_baths(sessions: &[WorkoutSession]) -> Vec<ColdBathObservation> {
    BathClassifier::default().classify(sessions)
}

/// Parses a provider start timestamp, keeping the offset it carries.
///
/// A trailing `Z` is rewritten to `+00:00` first. Offsets without a colon
/// (`+0200`) are accepted too.
pub fn parse_start_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_owned(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}
