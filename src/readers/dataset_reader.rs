use crate::error::Result;
use crate::models::WbtRecord;
use crate::writers::{is_parquet_path, ParquetWriter};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads a derived dataset written by [`crate::writers::write_dataset`].
pub struct DatasetReader;

impl DatasetReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a CSV or `.parquet` dataset
    pub fn read_records(&self, path: &Path) -> Result<Vec<WbtRecord>> {
        let records = if is_parquet_path(path) {
            ParquetWriter::new().read_records(path)?
        } else {
            self.read_from(File::open(path)?)?
        };
        debug!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<WbtRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(source);

        reader
            .deserialize::<WbtRecord>()
            .map(|row| row.map_err(Into::into))
            .collect()
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}
