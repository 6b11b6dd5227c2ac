use crate::error::{ProcessingError, Result};
use crate::models::WbtRecord;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Replace `path` with the records, written in `batch_size` chunks
    pub fn write_records(
        &self,
        records: &[WbtRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory)?;

        let staging = NamedTempFile::new_in(directory)?;
        let schema = Self::schema();
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(staging.reopen()?, schema.clone(), Some(props))?;
        for chunk in records.chunks(batch_size.max(1)) {
            let batch = Self::records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        staging.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Arrow schema mirroring the CSV dataset columns
    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("station", DataType::Utf8, false),
            Field::new(
                "valid",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
            Field::new("tmpc", DataType::Float64, false),
            Field::new("humidity", DataType::Float64, false),
            Field::new("WBT_C", DataType::Float64, false),
            Field::new("station_name", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
        ]))
    }

    fn records_to_batch(records: &[WbtRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let stations: Vec<&str> = records.iter().map(|r| r.station.as_str()).collect();
        let valid: Vec<i64> = records
            .iter()
            .map(|r| r.valid.and_utc().timestamp_millis())
            .collect();
        let tmpc: Vec<f64> = records.iter().map(|r| r.tmpc).collect();
        let humidity: Vec<f64> = records.iter().map(|r| r.humidity).collect();
        let wbt: Vec<f64> = records.iter().map(|r| r.wbt_c).collect();
        let names: Vec<Option<&str>> = records.iter().map(|r| r.station_name.as_deref()).collect();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(stations)),
                Arc::new(TimestampMillisecondArray::from(valid)),
                Arc::new(Float64Array::from(tmpc)),
                Arc::new(Float64Array::from(humidity)),
                Arc::new(Float64Array::from(wbt)),
                Arc::new(StringArray::from(names)),
                Arc::new(Int32Array::from(years)),
            ],
        )?;

        Ok(batch)
    }

    /// Read records back from a Parquet dataset
    pub fn read_records(&self, path: &Path) -> Result<Vec<WbtRecord>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(8192)
            .build()?;

        let mut records = Vec::new();

        for batch in reader {
            let batch = batch?;

            let stations = column::<StringArray>(&batch, 0, "station")?;
            let valid = column::<TimestampMillisecondArray>(&batch, 1, "valid")?;
            let tmpc = column::<Float64Array>(&batch, 2, "tmpc")?;
            let humidity = column::<Float64Array>(&batch, 3, "humidity")?;
            let wbt = column::<Float64Array>(&batch, 4, "WBT_C")?;
            let names = column::<StringArray>(&batch, 5, "station_name")?;

            for i in 0..batch.num_rows() {
                let timestamp = DateTime::from_timestamp_millis(valid.value(i))
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat("Invalid timestamp in Parquet file".to_string())
                    })?
                    .naive_utc();

                let station_name = if names.is_null(i) {
                    None
                } else {
                    Some(names.value(i).to_string())
                };

                records.push(WbtRecord::new(
                    stations.value(i).to_string(),
                    timestamp,
                    tmpc.value(i),
                    humidity.value(i),
                    wbt.value(i),
                    station_name,
                ));
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, index: usize, name: &str) -> Result<&'a T> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}
