use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimate wet-bulb temperature (°C) from air temperature (°C) and relative
/// humidity (%) with Stull's (2011) empirical formula.
///
/// The function is total for `humidity_pct >= 0` and performs no validation;
/// see [`InputPolicy`] for the checks applied by the pipelines.
///
/// # Examples
/// ```
/// use wetbulb_monitor::utils::wet_bulb_temperature;
///
/// let wbt = wet_bulb_temperature(25.0, 50.0);
/// assert!((wbt - 18.0).abs() < 0.05);
/// ```
pub fn wet_bulb_temperature(temperature_c: f64, humidity_pct: f64) -> f64 {
    let t = temperature_c;
    let rh = humidity_pct;

    t * (0.151977 * (rh + 8.313659).sqrt()).atan() + (t + rh).atan() - (rh - 1.676331).atan()
        + 0.00391838 * rh.powf(1.5) * (0.023101 * rh).atan()
        - 4.686035
}

/// What to do with readings outside the estimator's physical domain before
/// the formula is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Refuse humidity outside [0, 100] and non-finite inputs.
    #[default]
    Reject,
    /// Clamp humidity into [0, 100]; non-finite inputs are still refused.
    Clamp,
    /// Compute on whatever arrives.
    Passthrough,
}

impl InputPolicy {
    /// Apply the policy, returning the (temperature, humidity) pair to estimate from.
    pub fn apply(&self, temperature_c: f64, humidity_pct: f64) -> Result<(f64, f64)> {
        if matches!(self, InputPolicy::Passthrough) {
            return Ok((temperature_c, humidity_pct));
        }

        if !temperature_c.is_finite() || !humidity_pct.is_finite() {
            return Err(ProcessingError::InputOutOfRange(format!(
                "non-finite reading: temperature={}, humidity={}",
                temperature_c, humidity_pct
            )));
        }

        match self {
            InputPolicy::Reject if !(0.0..=100.0).contains(&humidity_pct) => {
                Err(ProcessingError::InputOutOfRange(format!(
                    "humidity {} is outside [0, 100]",
                    humidity_pct
                )))
            }
            InputPolicy::Clamp => Ok((temperature_c, humidity_pct.clamp(0.0, 100.0))),
            _ => Ok((temperature_c, humidity_pct)),
        }
    }

    /// Apply the policy and estimate in one step.
    pub fn estimate(&self, temperature_c: f64, humidity_pct: f64) -> Result<f64> {
        let (t, rh) = self.apply(temperature_c, humidity_pct)?;
        Ok(wet_bulb_temperature(t, rh))
    }
}

impl fmt::Display for InputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputPolicy::Reject => "reject",
            InputPolicy::Clamp => "clamp",
            InputPolicy::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

impl FromStr for InputPolicy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(InputPolicy::Reject),
            "clamp" => Ok(InputPolicy::Clamp),
            "passthrough" => Ok(InputPolicy::Passthrough),
            other => Err(ProcessingError::Config(format!(
                "Unknown input policy '{}'. Expected reject, clamp or passthrough",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value() {
        let wbt = wet_bulb_temperature(25.0, 50.0);
        assert!((17.9..=18.0).contains(&wbt), "got {}", wbt);
    }

    #[test]
    fn test_known_values() {
        assert!((wet_bulb_temperature(32.0, 85.0) - 29.82).abs() < 0.01);
        assert!((wet_bulb_temperature(30.0, 80.0) - 27.13).abs() < 0.01);
        assert!((wet_bulb_temperature(33.0, 90.0) - 31.57).abs() < 0.01);
    }

    #[test]
    fn test_deterministic() {
        for t in (-20..=50).step_by(7) {
            for rh in (0..=100).step_by(9) {
                let a = wet_bulb_temperature(t as f64, rh as f64);
                let b = wet_bulb_temperature(t as f64, rh as f64);
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn test_monotonic_in_humidity() {
        // Stull's fit is only monotonic inside its published domain.
        for t in 5..=50 {
            let mut previous = wet_bulb_temperature(t as f64, 5.0);
            for tenths in 51..=1000 {
                let current = wet_bulb_temperature(t as f64, tenths as f64 / 10.0);
                assert!(
                    current >= previous,
                    "WBT decreased at T={} RH={}",
                    t,
                    tenths as f64 / 10.0
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_wbt_never_exceeds_dry_bulb_when_humid() {
        for t in [20.0, 30.0, 40.0] {
            assert!(wet_bulb_temperature(t, 60.0) < t);
        }
    }

    #[test]
    fn test_reject_policy() {
        let policy = InputPolicy::Reject;
        assert!(policy.apply(30.0, 80.0).is_ok());
        assert!(policy.apply(30.0, -1.0).is_err());
        assert!(policy.apply(30.0, 100.5).is_err());
        assert!(policy.apply(f64::NAN, 50.0).is_err());
    }

    #[test]
    fn test_clamp_policy() {
        let policy = InputPolicy::Clamp;
        assert_eq!(policy.apply(30.0, 120.0).unwrap(), (30.0, 100.0));
        assert_eq!(policy.apply(30.0, -4.0).unwrap(), (30.0, 0.0));
        assert!(policy.apply(f64::INFINITY, 50.0).is_err());
    }

    #[test]
    fn test_passthrough_policy() {
        let policy = InputPolicy::Passthrough;
        assert_eq!(policy.apply(30.0, -4.0).unwrap(), (30.0, -4.0));
        let estimated = policy.estimate(25.0, 50.0).unwrap();
        assert_eq!(estimated, wet_bulb_temperature(25.0, 50.0));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Clamp".parse::<InputPolicy>().unwrap(), InputPolicy::Clamp);
        assert_eq!(" reject ".parse::<InputPolicy>().unwrap(), InputPolicy::Reject);
        assert!("ignore".parse::<InputPolicy>().is_err());
    }
}
