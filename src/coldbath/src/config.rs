use clap::Args;

use crate::{SourceError, sources::oura::OURA_API_BASE};

/// Credentials for the Oura API. Missing values are reported when a client is built.
#[derive(Args, Clone, Debug)]
pub struct OuraConfig {
    /// Oura personal access token
    #[arg(env = "OURA_TOKEN", long, hide_env_values = true)]
    pub oura_token: Option<String>,
    #[arg(env = "OURA_BASE_URL", long, default_value = OURA_API_BASE)]
    pub oura_base_url: String,
}

impl OuraConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            oura_token: Some(token.into()),
            oura_base_url: OURA_API_BASE.to_owned(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.oura_base_url = base_url.into();
        self
    }

    pub fn token(&self) -> Result<&str, SourceError> {
        required(self.oura_token.as_deref(), "OURA_TOKEN")
    }
}

impl Default for OuraConfig {
    fn default() -> Self {
        Self {
            oura_token: None,
            oura_base_url: OURA_API_BASE.to_owned(),
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct GarminConfig {
    #[arg(env = "GARMIN_CLIENT_ID", long)]
    pub garmin_client_id: Option<String>,
    #[arg(env = "GARMIN_CLIENT_SECRET", long, hide_env_values = true)]
    pub garmin_client_secret: Option<String>,
}

impl GarminConfig {
    pub fn credentials(&self) -> Result<(&str, &str), SourceError> {
        Ok((
            required(self.garmin_client_id.as_deref(), "GARMIN_CLIENT_ID")?,
            required(self.garmin_client_secret.as_deref(), "GARMIN_CLIENT_SECRET")?,
        ))
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SourceError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SourceError::MissingCredential(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token() {
        let config = OuraConfig::default();
        assert!(matches!(
            config.token(),
            Err(SourceError::MissingCredential("OURA_TOKEN"))
        ));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = OuraConfig::new("   ");
        assert!(config.token().is_err());
    }

    #[test]
    fn token_present() {
        let config = OuraConfig::new("abc");
        assert_eq!(config.token().unwrap(), "abc");
        assert_eq!(config.oura_base_url, OURA_API_BASE);
    }

    #[test]
    fn garmin_needs_both_values() {
        let config = GarminConfig {
            garmin_client_id: Some("id".to_owned()),
            garmin_client_secret: None,
        };
        assert!(matches!(
            config.credentials(),
            Err(SourceError::MissingCredential("GARMIN_CLIENT_SECRET"))
        ));
    }
}
