use crate::constants::*;
use crate::errors::DeliveryError;
use std::time::Duration;

/// Settings for one tracker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    /// Código postal del delivery; sin él no hay nada que seguir.
    pub pincode: Option<String>,
    pub access_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            api_url: DEFAULT_API_URL.to_string(),
            pincode: None,
            access_token: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, DeliveryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DeliveryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = TrackerConfig::default();

        Ok(TrackerConfig {
            api_url: get(API_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            pincode: get(PINCODE_VAR),
            access_token: get(ACCESS_TOKEN_VAR),
            poll_interval: match get(POLL_INTERVAL_VAR) {
                Some(raw) => parse_secs(POLL_INTERVAL_VAR, &raw)?,
                None => defaults.poll_interval,
            },
            request_timeout: match get(REQUEST_TIMEOUT_VAR) {
                Some(raw) => parse_secs(REQUEST_TIMEOUT_VAR, &raw)?,
                None => defaults.request_timeout,
            },
        })
    }

    pub fn with_pincode(mut self, pincode: impl Into<String>) -> Self {
        self.pincode = Some(pincode.into());
        self
    }

    /// The pincode to track, or the fail-fast configuration error.
    pub fn require_pincode(&self) -> Result<&str, DeliveryError> {
        self.pincode
            .as_deref()
            .map(str::trim)
            .filter(|pincode| !pincode.is_empty())
            .ok_or(DeliveryError::MissingPincode)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, DeliveryError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(DeliveryError::Config(format!("{} must be greater than zero", key))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(DeliveryError::Config(format!(
            "{} must be a whole number of seconds, got '{}'",
            key, raw
        ))),
    }
}
