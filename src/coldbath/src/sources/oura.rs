use std::time::Duration;

use chrono::NaiveDate;
use coldbath_algos::parse_start_timestamp;
use coldbath_types::{SleepObservation, WorkoutSession};
use serde::{Deserialize, de::DeserializeOwned};

use super::{DateRange, SleepSource, WorkoutSource};
use crate::{OuraConfig, SourceError};

pub const OURA_API_BASE: &str = "https://api.ouraring.com";
const SLEEP_PATH: &str = "/v2/usercollection/sleep";
const WORKOUT_PATH: &str = "/v2/usercollection/workout";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    next_token: Option<String>,
}

/// A sleep document from the Oura API. Older payloads use `summary_date` instead of `day`.
#[derive(Debug, Deserialize)]
pub struct OuraSleepRecord {
    day: Option<String>,
    summary_date: Option<String>,
    total_sleep_duration: Option<f64>,
    deep_sleep_duration: Option<f64>,
    resting_heart_rate: Option<f64>,
    lowest_heart_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OuraWorkoutRecord {
    activity: Option<String>,
    start_datetime: Option<String>,
    start_time: Option<String>,
    end_datetime: Option<String>,
    duration: Option<f64>,
}

/// Normalizes one sleep document, or `None` when it has no usable date.
pub fn parse_sleep_record(record: &OuraSleepRecord) -> Option<SleepObservation> {
    let raw_date = record.day.as_deref().or(record.summary_date.as_deref())?;
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").ok()?;

    Some(SleepObservation {
        date,
        total_sleep_seconds: record.total_sleep_duration.unwrap_or_default(),
        deep_sleep_seconds: record.deep_sleep_duration,
        resting_heart_rate: record.resting_heart_rate.or(record.lowest_heart_rate),
    })
}

/// Normalizes one workout document. An unparseable start leaves `start` empty.
pub fn parse_workout_record(record: &OuraWorkoutRecord) -> WorkoutSession {
    let start = record
        .start_datetime
        .as_deref()
        .or(record.start_time.as_deref())
        .and_then(parse_start_timestamp);

    let end = record.end_datetime.as_deref().and_then(parse_start_timestamp);
    let duration_seconds = match (record.duration, start, end) {
        (Some(duration), _, _) => duration,
        (None, Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    };

    WorkoutSession {
        start,
        duration_seconds,
        activity: record.activity.clone(),
    }
}

/// Token for the next page, or `None` when paging is done. A server repeating
/// the token it was just given would otherwise loop forever.
fn following_token(current: Option<&str>, next: Option<String>) -> Option<String> {
    let next = next.filter(|token| !token.is_empty())?;
    if current == Some(next.as_str()) {
        warn!("server repeated next_token {next:?}, stopping pagination");
        return None;
    }
    Some(next)
}

pub struct OuraClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl OuraClient {
    /// Fails with [`SourceError::MissingCredential`] before any request is made.
    pub fn new(config: &OuraConfig) -> Result<Self, SourceError> {
        let token = config.token()?.to_owned();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.oura_base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        range: DateRange,
    ) -> Result<Vec<T>, SourceError> {
        let endpoint = format!("{}{path}", self.base_url);
        let start_date = range.start.to_string();
        let end_date = range.end.to_string();

        let mut items = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let mut query = vec![
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
            ];
            if let Some(token) = next_token.as_deref() {
                query.push(("next_token", token));
            }

            let resp = self
                .client
                .get(&endpoint)
                .query(&query)
                .bearer_auth(&self.token)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    endpoint,
                    status,
                    body,
                });
            }

            let page: Page<T> = resp.json().await?;
            debug!("{path}: received {} items", page.data.len());
            items.extend(page.data);

            next_token = match following_token(next_token.as_deref(), page.next_token) {
                Some(token) => Some(token),
                None => break,
            };
        }

        Ok(items)
    }
}

impl SleepSource for OuraClient {
    async fn fetch_sleep(&self, range: DateRange) -> Result<Vec<SleepObservation>, SourceError> {
        let records = self
            .fetch_collection::<OuraSleepRecord>(SLEEP_PATH, range)
            .await?;

        let total = records.len();
        let sleep = records
            .iter()
            .filter_map(|record| {
                let parsed = parse_sleep_record(record);
                if parsed.is_none() {
                    warn!("skipping sleep record without a date: {:?}", record);
                }
                parsed
            })
            .collect::<Vec<_>>();

        info!(
            "fetched {} sleep records ({} skipped) for {}..{}",
            sleep.len(),
            total - sleep.len(),
            range.start,
            range.end
        );
        Ok(sleep)
    }
}

impl WorkoutSource for OuraClient {
    async fn fetch_workouts(&self, range: DateRange) -> Result<Vec<WorkoutSession>, SourceError> {
        let records = self
            .fetch_collection::<OuraWorkoutRecord>(WORKOUT_PATH, range)
            .await?;

        let sessions = records.iter().map(parse_workout_record).collect::<Vec<_>>();
        info!(
            "fetched {} workouts for {}..{}",
            sessions.len(),
            range.start,
            range.end
        );
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sleep_record(value: serde_json::Value) -> OuraSleepRecord {
        serde_json::from_value(value).unwrap()
    }

    fn workout_record(value: serde_json::Value) -> OuraWorkoutRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sleep_with_day() {
        let record = sleep_record(json!({
            "day": "2024-01-02",
            "total_sleep_duration": 27000,
            "deep_sleep_duration": 5400,
            "lowest_heart_rate": 49,
            "type": "long_sleep"
        }));

        let obs = parse_sleep_record(&record).unwrap();
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(obs.total_sleep_seconds, 27_000.0);
        assert_eq!(obs.deep_sleep_seconds, Some(5_400.0));
        assert_eq!(obs.resting_heart_rate, Some(49.0));
    }

    #[test]
    fn sleep_with_summary_date() {
        let record = sleep_record(json!({
            "summary_date": "2023-12-31",
            "total_sleep_duration": 25000,
            "resting_heart_rate": 55
        }));

        let obs = parse_sleep_record(&record).unwrap();
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(obs.deep_sleep_seconds, None);
        assert_eq!(obs.resting_heart_rate, Some(55.0));
    }

    #[test]
    fn sleep_without_duration_defaults_to_zero() {
        let record = sleep_record(json!({ "day": "2024-01-02" }));
        assert_eq!(parse_sleep_record(&record).unwrap().total_sleep_seconds, 0.0);
    }

    #[test]
    fn sleep_without_date_is_skipped() {
        assert!(parse_sleep_record(&sleep_record(json!({ "total_sleep_duration": 1 }))).is_none());
        assert!(parse_sleep_record(&sleep_record(json!({ "day": "yesterday" }))).is_none());
    }

    #[test]
    fn workout_with_duration_field() {
        let record = workout_record(json!({
            "activity": "other",
            "start_datetime": "2024-01-15T07:00:00Z",
            "duration": 150
        }));

        let session = parse_workout_record(&record);
        assert_eq!(session.duration_seconds, 150.0);
        assert_eq!(session.activity.as_deref(), Some("other"));
        assert_eq!(session.start.unwrap().offset().local_minus_utc(), 0);
    }

    #[test]
    fn workout_duration_from_end() {
        let record = workout_record(json!({
            "start_datetime": "2024-01-15T07:00:00+01:00",
            "end_datetime": "2024-01-15T07:03:30+01:00"
        }));
        assert_eq!(parse_workout_record(&record).duration_seconds, 210.0);
    }

    #[test]
    fn workout_start_time_fallback() {
        let record = workout_record(json!({ "start_time": "2024-01-15T08:00:00+02:00" }));
        let session = parse_workout_record(&record);
        assert!(session.start.is_some());
        assert_eq!(session.duration_seconds, 0.0);
    }

    #[test]
    fn workout_bad_timestamp_has_no_start() {
        let record = workout_record(json!({ "start_datetime": "soon", "duration": 180 }));
        assert!(parse_workout_record(&record).start.is_none());
    }

    #[test]
    fn parsed_workouts_classify() {
        let records = [
            json!({ "start_datetime": "2024-01-15T07:00:00Z", "duration": 150 }),
            json!({ "start_datetime": "2024-01-16T18:00:00Z", "duration": 150 }),
            json!({ "duration": 150 }),
        ];
        let sessions = records
            .into_iter()
            .map(|r| parse_workout_record(&workout_record(r)))
            .collect::<Vec<_>>();

        let baths = coldbath_algos::classify_cold_baths(&sessions);
        assert_eq!(baths.len(), 1);
        assert_eq!(baths[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn page_without_data() {
        let page: Page<OuraSleepRecord> =
            serde_json::from_value(json!({ "next_token": null })).unwrap();
        assert!(page.data.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn pagination_follows_new_tokens() {
        assert_eq!(following_token(None, Some("a".to_owned())).as_deref(), Some("a"));
        assert_eq!(following_token(Some("a"), Some("b".to_owned())).as_deref(), Some("b"));
    }

    #[test]
    fn pagination_stops_without_token() {
        assert_eq!(following_token(Some("a"), None), None);
        assert_eq!(following_token(Some("a"), Some(String::new())), None);
    }

    #[test]
    fn pagination_stops_on_repeated_token() {
        assert_eq!(following_token(Some("a"), Some("a".to_owned())), None);
    }

    #[test]
    fn client_requires_token() {
        let result = OuraClient::new(&OuraConfig::default());
        assert!(matches!(result, Err(SourceError::MissingCredential("OURA_TOKEN"))));
    }

    #[test]
    fn client_trims_base_url() {
        let config = OuraConfig::new("token").with_base_url("http://localhost:9/");
        let client = OuraClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
