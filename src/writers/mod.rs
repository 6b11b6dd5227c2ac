pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::{CsvWriter, DATASET_COLUMNS};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use crate::error::Result;
use crate::models::WbtRecord;
use crate::utils::constants::DEFAULT_CHUNK_SIZE;
use std::path::Path;

/// True when the path names a Parquet dataset rather than CSV.
pub fn is_parquet_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Write the derived dataset in the format implied by the path's extension.
pub fn write_dataset(records: &[WbtRecord], path: &Path, compression: &str) -> Result<()> {
    if is_parquet_path(path) {
        ParquetWriter::new()
            .with_compression(compression)?
            .write_records(records, path, DEFAULT_CHUNK_SIZE)
    } else {
        CsvWriter::new().write_records(records, path)
    }
}
