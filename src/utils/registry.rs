use crate::error::{ProcessingError, Result};
use crate::models::{Coordinate, Location};

/// Coordinates of every live-service location.
const COORDINATES: &[(Location, Coordinate)] = &[
    (Location::Mumbai, Coordinate::new(19.0760, 72.8777)),
    (Location::Chennai, Coordinate::new(13.0827, 80.2707)),
    (Location::Kolkata, Coordinate::new(22.5726, 88.3639)),
    (Location::Goa, Coordinate::new(15.2993, 74.1240)),
    (Location::Kochi, Coordinate::new(9.9312, 76.2673)),
    (Location::Visakhapatnam, Coordinate::new(17.6868, 83.2185)),
    (Location::Mangalore, Coordinate::new(12.9141, 74.8560)),
    (Location::Pondicherry, Coordinate::new(11.9139, 79.8145)),
    (Location::Kanyakumari, Coordinate::new(8.0883, 77.5385)),
    (Location::Surat, Coordinate::new(21.1702, 72.8311)),
    (Location::Karaikal, Coordinate::new(10.9254, 79.8380)),
    (Location::Nagapattinam, Coordinate::new(10.7660, 79.8447)),
    (Location::Alappuzha, Coordinate::new(9.4981, 76.3388)),
];

/// Historical station codes and the names their series are published under.
/// Kept apart from `COORDINATES`: a station may have no live counterpart.
const STATIONS: &[(&str, &str)] = &[
    ("VECC", "Calcutta"),
    ("VABB", "Mumbai"),
    ("VASU", "Surat"),
    ("VOCI", "Cochin"),
    ("VOGO", "Goa"),
    ("VOMM", "Madras"),
    ("VOVZ", "Vishakhapatnam"),
    ("VOTV", "Trivandrum"),
];

/// Centre of the overview map.
pub const MAP_CENTRE: Coordinate = Coordinate::new(20.5937, 78.9629);

/// Read-only lookups over the location and station tables.
#[derive(Debug, Clone, Copy)]
pub struct LocationRegistry {
    coordinates: &'static [(Location, Coordinate)],
    stations: &'static [(&'static str, &'static str)],
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self {
            coordinates: COORDINATES,
            stations: STATIONS,
        }
    }

    /// Build a registry over custom tables.
    pub fn with_tables(
        coordinates: &'static [(Location, Coordinate)],
        stations: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            coordinates,
            stations,
        }
    }

    /// Locations with a known coordinate, in table order.
    pub fn locations(&self) -> Vec<Location> {
        self.coordinates.iter().map(|(location, _)| *location).collect()
    }

    pub fn coordinate(&self, location: Location) -> Result<Coordinate> {
        self.coordinates
            .iter()
            .find(|(candidate, _)| *candidate == location)
            .map(|(_, coordinate)| *coordinate)
            .ok_or_else(|| ProcessingError::UnknownLocation(location.to_string()))
    }

    /// Look a coordinate up by free-text location name.
    pub fn coordinate_by_name(&self, name: &str) -> Result<Coordinate> {
        let location: Location = name.parse()?;
        self.coordinate(location)
    }

    /// Name for a station code, or `None` when the station is not mapped.
    pub fn station_name(&self, station_code: &str) -> Option<&'static str> {
        let code = station_code.trim();
        self.stations
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
            .map(|(_, name)| *name)
    }

    pub fn station_codes(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.stations.iter().copied()
    }
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_every_location_has_a_coordinate() {
        let registry = LocationRegistry::new();
        assert_eq!(registry.locations(), Location::ALL.to_vec());

        for location in Location::ALL {
            let coordinate = registry.coordinate(location).unwrap();
            assert!(coordinate.validate().is_ok(), "{} out of range", location);
        }
    }

    #[test]
    fn test_coordinate_by_name() {
        let registry = LocationRegistry::new();
        let chennai = registry.coordinate_by_name("Chennai").unwrap();
        assert!((chennai.latitude - 13.0827).abs() < 1e-9);

        assert!(matches!(
            registry.coordinate_by_name("Lisbon"),
            Err(ProcessingError::UnknownLocation(_))
        ));
    }

    #[test]
    fn test_station_lookup() {
        let registry = LocationRegistry::new();
        assert_eq!(registry.station_name("VOCI"), Some("Cochin"));
        assert_eq!(registry.station_name(" vomm "), Some("Madras"));
        assert_eq!(registry.station_name("KBOS"), None);
        assert_eq!(registry.station_codes().count(), 8);
    }

    #[test]
    fn test_tables_are_decoupled() {
        static LIVE_ONLY: &[(Location, Coordinate)] =
            &[(Location::Karaikal, Coordinate::new(10.9254, 79.8380))];
        static HISTORICAL_ONLY: &[(&str, &str)] = &[("VOTV", "Trivandrum")];

        let registry = LocationRegistry::with_tables(LIVE_ONLY, HISTORICAL_ONLY);
        assert!(registry.coordinate(Location::Karaikal).is_ok());
        assert!(registry.coordinate(Location::Mumbai).is_err());
        assert_eq!(registry.station_name("VOTV"), Some("Trivandrum"));
        assert_eq!(registry.station_name("VABB"), None);
    }
}
