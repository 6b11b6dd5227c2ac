pub mod location;
pub mod observation;
pub mod wbt_record;
pub mod weather;

pub use location::{Coordinate, Location};
pub use observation::{ObservationKind, ObservationTable, RawObservation};
pub use wbt_record::{WbtRecord, UNMAPPED_STATION_LABEL};
pub use weather::{Snapshot, SnapshotBand, SnapshotSet, ThresholdBand, WeatherReading};
