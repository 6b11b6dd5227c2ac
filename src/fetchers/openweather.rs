use crate::config::AppConfig;
use crate::error::{ProcessingError, Result};
use crate::fetchers::ReadingSource;
use crate::models::{Location, WeatherReading};
use crate::utils::constants::{METRIC_UNITS, USER_AGENT, WEATHER_ENDPOINT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Conditions {
    temp: f64,
    humidity: f64,
}

/// Response bodies the service may return. `main` is preferred over `current`
/// when both are present.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeatherPayload {
    Main {
        main: Conditions,
        #[serde(default)]
        dt: Option<serde_json::Value>,
    },
    Current {
        current: Conditions,
    },
    Unrecognized(serde::de::IgnoredAny),
}

/// Current-conditions client for the OpenWeatherMap `weather` endpoint.
pub struct OpenWeatherClient {
    client: Client,
    endpoint: String,
    api_key: String,
    country_code: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), WEATHER_ENDPOINT),
            api_key: api_key.to_string(),
            country_code: crate::utils::constants::DEFAULT_COUNTRY_CODE.to_string(),
        })
    }

    /// Build a client from settings; fails when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(&config.base_url, api_key, config.request_timeout())?
            .with_country_code(&config.country_code))
    }

    pub fn with_country_code(mut self, country_code: &str) -> Self {
        self.country_code = country_code.to_string();
        self
    }

    fn decode(location: Location, body: &str) -> Result<WeatherReading> {
        let payload: WeatherPayload = serde_json::from_str(body)?;

        match payload {
            WeatherPayload::Main { main, dt } => {
                let reading = WeatherReading::new(location, main.temp, main.humidity);
                Ok(match dt.as_ref().and_then(observation_time) {
                    Some(observed_at) => reading.with_observed_at(observed_at),
                    None => reading,
                })
            }
            WeatherPayload::Current { current } => Ok(WeatherReading::new(
                location,
                current.temp,
                current.humidity,
            )),
            WeatherPayload::Unrecognized(_) => Err(ProcessingError::DataAbsent {
                location: location.to_string(),
            }),
        }
    }
}

// A malformed `dt` drops the timestamp, never the reading.
fn observation_time(dt: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match dt.as_i64() {
        Some(secs) => secs,
        None => dt.as_f64().filter(|secs| secs.is_finite())?.trunc() as i64,
    };
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[async_trait]
impl ReadingSource for OpenWeatherClient {
    async fn fetch_reading(&self, location: Location) -> Result<WeatherReading> {
        let query = format!("{},{}", location.name(), self.country_code);
        debug!("Requesting current conditions for {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", METRIC_UNITS),
            ])
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(ProcessingError::Unauthorized {
                    location: location.to_string(),
                })
            }
            StatusCode::NOT_FOUND => {
                return Err(ProcessingError::NotFound {
                    location: location.to_string(),
                })
            }
            s if !s.is_success() => {
                return Err(ProcessingError::ServiceStatus {
                    location: location.to_string(),
                    status: s.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.text().await?;
        Self::decode(location, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_main_shape() -> Result<()> {
        let body = r#"{"main":{"temp":31.2,"humidity":74,"pressure":1008},"dt":1714550400,"name":"Chennai"}"#;

        let reading = OpenWeatherClient::decode(Location::Chennai, body)?;

        assert_eq!(reading.location, Location::Chennai);
        assert_eq!(reading.temperature_c, 31.2);
        assert_eq!(reading.humidity_pct, 74.0);
        assert_eq!(
            reading.observed_at.map(|t| t.timestamp()),
            Some(1_714_550_400)
        );
        Ok(())
    }

    #[test]
    fn test_decode_current_shape() -> Result<()> {
        let body = r#"{"current":{"temp":28.0,"humidity":65}}"#;

        let reading = OpenWeatherClient::decode(Location::Mumbai, body)?;

        assert_eq!(reading.temperature_c, 28.0);
        assert_eq!(reading.humidity_pct, 65.0);
        assert!(reading.observed_at.is_none());
        Ok(())
    }

    #[test]
    fn test_main_preferred_over_current() -> Result<()> {
        let body = r#"{"main":{"temp":30.0,"humidity":70},"current":{"temp":10.0,"humidity":10}}"#;

        let reading = OpenWeatherClient::decode(Location::Goa, body)?;

        assert_eq!(reading.temperature_c, 30.0);
        Ok(())
    }

    #[test]
    fn test_malformed_dt_keeps_main_reading() -> Result<()> {
        let fractional = r#"{"main":{"temp":30.0,"humidity":70},"dt":1714550400.5}"#;
        let reading = OpenWeatherClient::decode(Location::Goa, fractional)?;
        assert_eq!(reading.temperature_c, 30.0);
        assert_eq!(
            reading.observed_at.map(|t| t.timestamp()),
            Some(1_714_550_400)
        );

        let textual = r#"{"main":{"temp":30.0,"humidity":70},"dt":"1714550400","current":{"temp":10.0,"humidity":10}}"#;
        let reading = OpenWeatherClient::decode(Location::Goa, textual)?;
        assert_eq!(reading.temperature_c, 30.0);
        assert_eq!(reading.humidity_pct, 70.0);
        assert!(reading.observed_at.is_none());
        Ok(())
    }

    #[test]
    fn test_decode_without_conditions() {
        let body = r#"{"cod":"200","message":"ok"}"#;

        let result = OpenWeatherClient::decode(Location::Kolkata, body);

        assert!(matches!(result, Err(ProcessingError::DataAbsent { .. })));
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = OpenWeatherClient::decode(Location::Kolkata, "<html>");
        assert!(matches!(result, Err(ProcessingError::Json(_))));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AppConfig::default();
        assert!(matches!(
            OpenWeatherClient::from_config(&config),
            Err(ProcessingError::Config(_))
        ));
    }
}
