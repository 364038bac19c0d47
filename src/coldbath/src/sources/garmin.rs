use coldbath_types::WorkoutSession;

use super::{DateRange, WorkoutSource};
use crate::{GarminConfig, SourceError};

/// Placeholder for the Garmin Connect API.
///
/// Building it checks that credentials are configured; fetching always fails
/// because the OAuth flow is not implemented.
pub struct GarminClient {
    client_id: String,
}

impl GarminClient {
    pub fn new(config: &GarminConfig) -> Result<Self, SourceError> {
        let (client_id, _secret) = config.credentials()?;
        Ok(Self {
            client_id: client_id.to_owned(),
        })
    }
}

impl WorkoutSource for GarminClient {
    async fn fetch_workouts(&self, range: DateRange) -> Result<Vec<WorkoutSession>, SourceError> {
        warn!(
            "garmin client {} cannot fetch {}..{}",
            self.client_id, range.start, range.end
        );
        Err(SourceError::Unsupported(
            "fetching Garmin activities requires an OAuth flow, which is not implemented",
        ))
    }
}
