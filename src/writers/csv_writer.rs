use crate::error::Result;
use crate::models::WbtRecord;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Column order of the derived dataset.
pub const DATASET_COLUMNS: [&str; 7] = [
    "station",
    "valid",
    "tmpc",
    "humidity",
    "WBT_C",
    "station_name",
    "year",
];

/// Writes the derived dataset as CSV.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Replace `path` with the given records.
    ///
    /// Rows go to a temporary file in the destination directory which is then
    /// renamed over the target, so readers never observe a partial artifact.
    pub fn write_records(&self, records: &[WbtRecord], path: &Path) -> Result<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)?;

        let mut staging = NamedTempFile::new_in(directory)?;
        self.write_to(records, staging.as_file_mut())?;
        staging.as_file().sync_all()?;
        staging.persist(path).map_err(|e| e.error)?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Write header and rows to any sink
    pub fn write_to<W: Write>(&self, records: &[WbtRecord], sink: W) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);

        writer.write_record(DATASET_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;
    use tempfile::TempDir;

    fn record(station: &str, valid: &str, name: Option<&str>) -> WbtRecord {
        WbtRecord::new(
            station.to_string(),
            parse_timestamp(valid).unwrap(),
            30.0,
            80.0,
            27.13,
            name.map(str::to_string),
        )
    }

    #[test]
    fn test_column_layout() -> Result<()> {
        let mut buffer = Vec::new();
        CsvWriter::new().write_to(
            &[
                record("VOCI", "2020-05-01 00:00", Some("Cochin")),
                record("KBOS", "2020-05-01 01:00", None),
            ],
            &mut buffer,
        )?;

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "station,valid,tmpc,humidity,WBT_C,station_name,year");
        assert_eq!(lines[1], "VOCI,2020-05-01 00:00,30.0,80.0,27.13,Cochin,2020");
        assert_eq!(lines[2], "KBOS,2020-05-01 01:00,30.0,80.0,27.13,,2020");
        Ok(())
    }

    #[test]
    fn test_empty_dataset_keeps_header() -> Result<()> {
        let mut buffer = Vec::new();
        CsvWriter::new().write_to(&[], &mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "station,valid,tmpc,humidity,WBT_C,station_name,year\n"
        );
        Ok(())
    }

    #[test]
    fn test_rewrite_replaces_previous_artifact() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("combined_with_wbt.csv");
        let writer = CsvWriter::new();

        writer.write_records(
            &[
                record("VOCI", "2020-05-01 00:00", Some("Cochin")),
                record("VOMM", "2020-05-01 00:00", Some("Madras")),
            ],
            &path,
        )?;
        writer.write_records(&[record("VOGO", "2021-01-01 00:00", Some("Goa"))], &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("VOGO"));
        assert!(!text.contains("VOCI"));
        Ok(())
    }
}
