use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::timestamps::valid_column;

/// Label shown for stations with no registry entry.
pub const UNMAPPED_STATION_LABEL: &str = "unmapped";

/// One reconciled (station, timestamp) observation carrying its wet-bulb temperature.
///
/// Field names follow the derived dataset's column layout:
/// `station, valid, tmpc, humidity, WBT_C, station_name, year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbtRecord {
    pub station: String,

    #[serde(with = "valid_column")]
    pub valid: NaiveDateTime,

    pub tmpc: f64,

    pub humidity: f64,

    #[serde(rename = "WBT_C")]
    pub wbt_c: f64,

    /// `None` when the station code has no registry mapping.
    pub station_name: Option<String>,

    pub year: i32,
}

impl WbtRecord {
    pub fn new(
        station: String,
        valid: NaiveDateTime,
        tmpc: f64,
        humidity: f64,
        wbt_c: f64,
        station_name: Option<String>,
    ) -> Self {
        Self {
            year: valid.year(),
            station,
            valid,
            tmpc,
            humidity,
            wbt_c,
            station_name,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.station_name.is_some()
    }

    pub fn station_label(&self) -> &str {
        self.station_name.as_deref().unwrap_or(UNMAPPED_STATION_LABEL)
    }

    pub fn exceeds(&self, threshold_c: f64) -> bool {
        self.wbt_c > threshold_c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;

    #[test]
    fn test_year_is_derived_from_timestamp() {
        let valid = parse_timestamp("2019-12-31 23:00").unwrap();
        let record = WbtRecord::new("VOCI".to_string(), valid, 30.0, 80.0, 27.1, None);
        assert_eq!(record.year, 2019);
        assert!(!record.is_mapped());
        assert_eq!(record.station_label(), UNMAPPED_STATION_LABEL);
    }

    #[test]
    fn test_exceeds_is_strict() {
        let valid = parse_timestamp("2020-05-01 00:00").unwrap();
        let record = WbtRecord::new(
            "VOMM".to_string(),
            valid,
            33.0,
            90.0,
            30.0,
            Some("Madras".to_string()),
        );
        assert!(!record.exceeds(30.0));
        assert!(record.exceeds(29.9));
        assert_eq!(record.station_label(), "Madras");
    }
}
