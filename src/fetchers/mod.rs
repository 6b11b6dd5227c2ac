pub mod openweather;

pub use openweather::OpenWeatherClient;

use crate::error::Result;
use crate::models::{Location, WeatherReading};
use async_trait::async_trait;

/// Anything that can report current temperature and humidity for a location.
///
/// Errors for which [`crate::error::ProcessingError::is_absence`] holds mean
/// "no data for this location"; the aggregator omits the location and moves on.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_reading(&self, location: Location) -> Result<WeatherReading>;
}
