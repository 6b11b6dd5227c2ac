use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// Coastal locations served by the live weather service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Mumbai,
    Chennai,
    Kolkata,
    Goa,
    Kochi,
    Visakhapatnam,
    Mangalore,
    Pondicherry,
    Kanyakumari,
    Surat,
    Karaikal,
    Nagapattinam,
    Alappuzha,
}

impl Location {
    /// Every location, in display order.
    pub const ALL: [Location; 13] = [
        Location::Mumbai,
        Location::Chennai,
        Location::Kolkata,
        Location::Goa,
        Location::Kochi,
        Location::Visakhapatnam,
        Location::Mangalore,
        Location::Pondicherry,
        Location::Kanyakumari,
        Location::Surat,
        Location::Karaikal,
        Location::Nagapattinam,
        Location::Alappuzha,
    ];

    /// Name as sent to the weather service.
    pub fn name(&self) -> &'static str {
        match self {
            Location::Mumbai => "Mumbai",
            Location::Chennai => "Chennai",
            Location::Kolkata => "Kolkata",
            Location::Goa => "Goa",
            Location::Kochi => "Kochi",
            Location::Visakhapatnam => "Visakhapatnam",
            Location::Mangalore => "Mangalore",
            Location::Pondicherry => "Pondicherry",
            Location::Kanyakumari => "Kanyakumari",
            Location::Surat => "Surat",
            Location::Karaikal => "Karaikal",
            Location::Nagapattinam => "Nagapattinam",
            Location::Alappuzha => "Alappuzha",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Location::ALL
            .iter()
            .copied()
            .find(|location| location.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProcessingError::UnknownLocation(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
