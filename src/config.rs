use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, DEFAULT_COUNTRY_CODE, DEFAULT_CRITICAL_THRESHOLD_C,
    DEFAULT_DANGER_THRESHOLD_C, DEFAULT_DISPLAY_TIMEZONE, DEFAULT_MAXIMUM_THRESHOLD_C,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MISSING_MARKER, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_PREFIX,
};
use crate::utils::InputPolicy;

/// Runtime settings, layered as defaults < config file < `WBT_*` environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather service key. Never compiled in.
    pub api_key: Option<String>,
    pub base_url: String,
    pub country_code: String,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    /// Upper bound on live requests per snapshot run.
    pub request_budget: Option<usize>,

    pub danger_threshold_c: f64,
    pub critical_threshold_c: f64,
    pub maximum_threshold_c: f64,

    pub missing_marker: String,
    pub input_policy: InputPolicy,
    pub display_timezone: String,
}

impl AppConfig {
    /// Load settings. An explicit `path` must exist; otherwise `wetbulb.toml`
    /// is read from the working directory when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("country_code", DEFAULT_COUNTRY_CODE)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("max_concurrency", DEFAULT_MAX_CONCURRENCY as i64)?
            .set_default("danger_threshold_c", DEFAULT_DANGER_THRESHOLD_C)?
            .set_default("critical_threshold_c", DEFAULT_CRITICAL_THRESHOLD_C)?
            .set_default("maximum_threshold_c", DEFAULT_MAXIMUM_THRESHOLD_C)?
            .set_default("missing_marker", DEFAULT_MISSING_MARKER)?
            .set_default("input_policy", InputPolicy::default().to_string())?
            .set_default("display_timezone", DEFAULT_DISPLAY_TIMEZONE)?
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(ProcessingError::Config(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ProcessingError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.critical_threshold_c > self.maximum_threshold_c {
            return Err(ProcessingError::Config(format!(
                "critical threshold {} exceeds maximum threshold {}",
                self.critical_threshold_c, self.maximum_threshold_c
            )));
        }

        if self.missing_marker.trim().is_empty() {
            return Err(ProcessingError::Config(
                "missing_marker cannot be empty".to_string(),
            ));
        }

        self.timezone()?;
        Ok(())
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ProcessingError::Config(format!(
                "No API key configured. Set {}_API_KEY or api_key in {}",
                ENV_PREFIX, DEFAULT_CONFIG_FILE
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display_timezone.parse::<Tz>().map_err(|_| {
            ProcessingError::Config(format!("Unknown timezone '{}'", self.display_timezone))
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_budget: None,
            danger_threshold_c: DEFAULT_DANGER_THRESHOLD_C,
            critical_threshold_c: DEFAULT_CRITICAL_THRESHOLD_C,
            maximum_threshold_c: DEFAULT_MAXIMUM_THRESHOLD_C,
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
            input_policy: InputPolicy::default(),
            display_timezone: DEFAULT_DISPLAY_TIMEZONE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.require_api_key().is_err());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.critical_threshold_c = 36.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.display_timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_thresholds_are_independent() {
        let mut config = AppConfig::default();
        config.danger_threshold_c = 28.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.critical_threshold_c, DEFAULT_CRITICAL_THRESHOLD_C);
        assert_eq!(config.maximum_threshold_c, DEFAULT_MAXIMUM_THRESHOLD_C);
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "api_key = \"abc123\"")?;
        writeln!(file, "max_concurrency = 2")?;
        writeln!(file, "danger_threshold_c = 29.5")?;
        writeln!(file, "input_policy = \"clamp\"")?;

        let config = AppConfig::load(Some(file.path()))?;
        assert_eq!(config.require_api_key()?, "abc123");
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.danger_threshold_c, 29.5);
        assert_eq!(config.input_policy, InputPolicy::Clamp);
        assert_eq!(config.country_code, DEFAULT_COUNTRY_CODE);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/wetbulb.toml")));
        assert!(result.is_err());
    }
}
