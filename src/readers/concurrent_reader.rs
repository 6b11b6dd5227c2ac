use crate::error::Result;
use crate::models::{ObservationKind, ObservationTable};
use crate::readers::ObservationReader;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;

pub struct ConcurrentReader {
    missing_marker: String,
}

impl ConcurrentReader {
    pub fn new(missing_marker: &str) -> Self {
        Self {
            missing_marker: missing_marker.to_string(),
        }
    }

    /// Read the temperature and humidity tables concurrently
    pub async fn read_station_tables(
        &self,
        temperature_path: &Path,
        humidity_path: &Path,
    ) -> Result<StationTables> {
        let temperature_handle =
            self.spawn_read(temperature_path.to_path_buf(), ObservationKind::Temperature);
        let humidity_handle =
            self.spawn_read(humidity_path.to_path_buf(), ObservationKind::Humidity);

        // Wait for both reads to complete
        let (temperature, humidity) = tokio::try_join!(temperature_handle, humidity_handle)?;

        Ok(StationTables {
            temperature: temperature?,
            humidity: humidity?,
        })
    }

    fn spawn_read(
        &self,
        path: PathBuf,
        kind: ObservationKind,
    ) -> JoinHandle<Result<ObservationTable>> {
        let missing_marker = self.missing_marker.clone();
        tokio::task::spawn_blocking(move || {
            ObservationReader::with_missing_marker(&missing_marker).read_table(&path, kind)
        })
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new(crate::utils::constants::DEFAULT_MISSING_MARKER)
    }
}

/// Container for both raw historical tables
#[derive(Debug)]
pub struct StationTables {
    pub temperature: ObservationTable,
    pub humidity: ObservationTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_both_tables() -> Result<()> {
        let mut temperature = NamedTempFile::new()?;
        writeln!(temperature, "station,valid,tmpc")?;
        writeln!(temperature, "VOCI,2020-05-01 00:00,30.0")?;

        let mut humidity = NamedTempFile::new()?;
        writeln!(humidity, "station,valid,relh")?;
        writeln!(humidity, "VOCI,2020-05-01 00:00,80.0")?;
        writeln!(humidity, "VOCI,2020-05-01 01:00,82.0")?;

        let reader = ConcurrentReader::default();
        let tables = reader
            .read_station_tables(temperature.path(), humidity.path())
            .await?;

        assert_eq!(tables.temperature.kind, ObservationKind::Temperature);
        assert_eq!(tables.temperature.len(), 1);
        assert_eq!(tables.humidity.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let reader = ConcurrentReader::default();
        let result = reader
            .read_station_tables(Path::new("/nonexistent/temp.csv"), Path::new("/nonexistent/humid.csv"))
            .await;

        assert!(result.is_err());
    }
}
