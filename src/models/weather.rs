use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Location;

/// Current conditions reported by the live service for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: Location,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherReading {
    pub fn new(location: Location, temperature_c: f64, humidity_pct: f64) -> Self {
        Self {
            location,
            temperature_c,
            humidity_pct,
            observed_at: None,
        }
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }
}

/// Freshly computed current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub location: Location,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wbt_c: f64,
    pub is_dangerous: bool,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Position of a wet-bulb temperature against the critical/maximum pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdBand {
    Below,
    Critical,
    Maximum,
}

impl ThresholdBand {
    pub fn classify(wbt_c: f64, critical_c: f64, maximum_c: f64) -> Self {
        if wbt_c >= maximum_c {
            ThresholdBand::Maximum
        } else if wbt_c >= critical_c {
            ThresholdBand::Critical
        } else {
            ThresholdBand::Below
        }
    }
}

impl fmt::Display for ThresholdBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdBand::Below => f.write_str("below critical"),
            ThresholdBand::Critical => f.write_str("critical"),
            ThresholdBand::Maximum => f.write_str("maximum"),
        }
    }
}

/// A snapshot placed within its comparative set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotBand<'a> {
    pub snapshot: &'a Snapshot,
    pub band: ThresholdBand,
    /// 0.0 at the set's lowest WBT, 1.0 at its highest.
    pub relative_position: f64,
}

/// The result of one aggregation run, in input location order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSet {
    pub snapshots: Vec<Snapshot>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SnapshotSet {
    pub fn new(snapshots: Vec<Snapshot>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            snapshots,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn any_dangerous(&self) -> bool {
        self.snapshots.iter().any(|s| s.is_dangerous)
    }

    pub fn dangerous(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter().filter(|s| s.is_dangerous)
    }

    pub fn get(&self, location: Location) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.location == location)
    }

    /// (min, max) WBT across the set.
    pub fn wbt_range(&self) -> Option<(f64, f64)> {
        self.snapshots.iter().map(|s| s.wbt_c).fold(None, |acc, wbt| match acc {
            None => Some((wbt, wbt)),
            Some((lo, hi)) => Some((lo.min(wbt), hi.max(wbt))),
        })
    }

    /// Classify every snapshot against the paired thresholds.
    pub fn bands(&self, critical_c: f64, maximum_c: f64) -> Vec<SnapshotBand<'_>> {
        let (lo, hi) = match self.wbt_range() {
            Some(range) => range,
            None => return Vec::new(),
        };
        let span = hi - lo;

        self.snapshots
            .iter()
            .map(|snapshot| SnapshotBand {
                snapshot,
                band: ThresholdBand::classify(snapshot.wbt_c, critical_c, maximum_c),
                relative_position: if span > 0.0 {
                    (snapshot.wbt_c - lo) / span
                } else {
                    0.5
                },
            })
            .collect()
    }
}
