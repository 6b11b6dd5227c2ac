use crate::error::{ProcessingError, Result};
use crate::models::{ObservationKind, ObservationTable, RawObservation};
use crate::utils::constants::{DEFAULT_MISSING_MARKER, STATION_COLUMN, VALID_COLUMN};
use crate::utils::parse_timestamp;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads one raw historical table (`station`, `valid`, and `tmpc` or `relh`).
pub struct ObservationReader {
    missing_marker: String,
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    station: usize,
    valid: usize,
    value: usize,
}

/// Outcome of parsing a single cell.
enum Cell<T> {
    Present(T),
    Missing,
    Malformed,
}

impl<T> Cell<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Cell::Present(value) => Some(value),
            Cell::Missing | Cell::Malformed => None,
        }
    }

    fn is_malformed(&self) -> bool {
        matches!(self, Cell::Malformed)
    }
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            missing_marker: DEFAULT_MISSING_MARKER.to_string(),
        }
    }

    pub fn with_missing_marker(missing_marker: &str) -> Self {
        Self {
            missing_marker: missing_marker.trim().to_string(),
        }
    }

    /// Read a table from a CSV file
    pub fn read_table(&self, path: &Path, kind: ObservationKind) -> Result<ObservationTable> {
        let file = File::open(path)?;
        let table = self.read_from(file, kind)?;
        debug!(
            "Read {} {} rows from {} ({} malformed cells)",
            table.len(),
            kind,
            path.display(),
            table.malformed_cells
        );
        Ok(table)
    }

    /// Read a table from any CSV source
    pub fn read_from<R: Read>(&self, source: R, kind: ObservationKind) -> Result<ObservationTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(source);

        let columns = Self::resolve_columns(reader.headers()?, kind)?;

        let mut rows = Vec::new();
        let mut malformed_cells = 0;

        for record in reader.records() {
            let record = record?;

            let station = self.text_cell(record.get(columns.station));
            let valid = self.timestamp_cell(record.get(columns.valid));
            let value = self.numeric_cell(record.get(columns.value));

            malformed_cells += usize::from(valid.is_malformed()) + usize::from(value.is_malformed());

            rows.push(RawObservation::new(
                station,
                valid.into_option(),
                value.into_option(),
            ));
        }

        let mut table = ObservationTable::new(kind, rows);
        table.malformed_cells = malformed_cells;
        Ok(table)
    }

    fn resolve_columns(headers: &StringRecord, kind: ObservationKind) -> Result<ColumnIndex> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "{} table is missing required column '{}'",
                        kind, name
                    ))
                })
        };

        Ok(ColumnIndex {
            station: find(STATION_COLUMN)?,
            valid: find(VALID_COLUMN)?,
            value: find(kind.value_column())?,
        })
    }

    fn is_missing(&self, raw: &str) -> bool {
        raw.is_empty() || raw == self.missing_marker
    }

    fn text_cell(&self, raw: Option<&str>) -> Option<String> {
        match raw {
            Some(raw) if !self.is_missing(raw) => Some(raw.to_string()),
            _ => None,
        }
    }

    fn timestamp_cell(&self, raw: Option<&str>) -> Cell<chrono::NaiveDateTime> {
        match raw {
            Some(raw) if !self.is_missing(raw) => match parse_timestamp(raw) {
                Some(valid) => Cell::Present(valid),
                None => Cell::Malformed,
            },
            _ => Cell::Missing,
        }
    }

    fn numeric_cell(&self, raw: Option<&str>) -> Cell<f64> {
        match raw {
            Some(raw) if !self.is_missing(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Cell::Present(value),
                _ => Cell::Malformed,
            },
            _ => Cell::Missing,
        }
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}
