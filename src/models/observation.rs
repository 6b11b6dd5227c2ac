use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which raw historical table an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationKind {
    Temperature,
    Humidity,
}

impl ObservationKind {
    /// Name of the value column in the source file.
    pub fn value_column(&self) -> &'static str {
        match self {
            ObservationKind::Temperature => "tmpc",
            ObservationKind::Humidity => "relh",
        }
    }
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationKind::Temperature => f.write_str("temperature"),
            ObservationKind::Humidity => f.write_str("humidity"),
        }
    }
}

/// One row of a raw station table. `None` marks a missing or unreadable cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub station: Option<String>,
    pub valid: Option<NaiveDateTime>,
    pub value: Option<f64>,
}

impl RawObservation {
    pub fn new(station: Option<String>, valid: Option<NaiveDateTime>, value: Option<f64>) -> Self {
        Self {
            station,
            valid,
            value,
        }
    }

    /// Station, timestamp and value when all three are present.
    pub fn complete(&self) -> Option<(&str, NaiveDateTime, f64)> {
        match (&self.station, self.valid, self.value) {
            (Some(station), Some(valid), Some(value)) => Some((station.as_str(), valid, value)),
            _ => None,
        }
    }
}

/// A raw station table as read from disk.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    pub kind: ObservationKind,
    pub rows: Vec<RawObservation>,
    /// Cells that held text other than the missing marker and could not be parsed.
    pub malformed_cells: usize,
}

impl ObservationTable {
    pub fn new(kind: ObservationKind, rows: Vec<RawObservation>) -> Self {
        Self {
            kind,
            rows,
            malformed_cells: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;

    #[test]
    fn test_complete_requires_every_field() {
        let valid = parse_timestamp("2020-05-01 00:00");

        let full = RawObservation::new(Some("VOCI".to_string()), valid, Some(30.0));
        assert_eq!(full.complete(), Some(("VOCI", valid.unwrap(), 30.0)));

        assert!(RawObservation::new(None, valid, Some(30.0)).complete().is_none());
        assert!(RawObservation::new(Some("VOCI".to_string()), None, Some(30.0))
            .complete()
            .is_none());
        assert!(RawObservation::new(Some("VOCI".to_string()), valid, None)
            .complete()
            .is_none());
    }

    #[test]
    fn test_value_columns() {
        assert_eq!(ObservationKind::Temperature.value_column(), "tmpc");
        assert_eq!(ObservationKind::Humidity.value_column(), "relh");
    }
}
