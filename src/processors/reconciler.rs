use crate::error::{ProcessingError, Result};
use crate::models::{ObservationTable, WbtRecord};
use crate::processors::ReconcileReport;
use crate::readers::ConcurrentReader;
use crate::utils::progress::ProgressReporter;
use crate::utils::{InputPolicy, LocationRegistry};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A cleaned row: every field required downstream is present.
#[derive(Debug, Clone, Copy)]
struct CleanRow<'a> {
    station: &'a str,
    valid: NaiveDateTime,
    value: f64,
}

/// A (station, timestamp) pair present in both tables.
#[derive(Debug, Clone, Copy)]
struct JoinedRow<'a> {
    station: &'a str,
    valid: NaiveDateTime,
    tmpc: f64,
    relh: f64,
}

/// Output of a reconciliation run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub records: Vec<WbtRecord>,
    pub report: ReconcileReport,
}

/// Joins the temperature and humidity tables into wet-bulb records.
pub struct HistoricalReconciler {
    registry: LocationRegistry,
    input_policy: InputPolicy,
    missing_marker: String,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl HistoricalReconciler {
    pub fn new(registry: LocationRegistry) -> Self {
        Self {
            registry,
            input_policy: InputPolicy::default(),
            missing_marker: crate::utils::constants::DEFAULT_MISSING_MARKER.to_string(),
            pool: None,
        }
    }

    /// Run the row-wise estimation on a dedicated pool of `max_workers` threads
    pub fn with_max_workers(mut self, max_workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;
        self.pool = Some(Arc::new(pool));
        Ok(self)
    }

    pub fn with_input_policy(mut self, input_policy: InputPolicy) -> Self {
        self.input_policy = input_policy;
        self
    }

    pub fn with_missing_marker(mut self, missing_marker: &str) -> Self {
        self.missing_marker = missing_marker.to_string();
        self
    }

    /// Read both raw files and reconcile them
    pub async fn reconcile_files(
        &self,
        temperature_path: &Path,
        humidity_path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Reconciliation> {
        if let Some(p) = progress {
            p.set_message("Reading station tables...");
        }

        let reader = ConcurrentReader::new(&self.missing_marker);
        let tables = reader
            .read_station_tables(temperature_path, humidity_path)
            .await?;

        if let Some(p) = progress {
            p.set_message("Joining temperature and humidity...");
        }

        let reconciliation = self.reconcile(&tables.temperature, &tables.humidity);

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Reconciled {} records",
                reconciliation.records.len()
            ));
        }

        Ok(reconciliation)
    }

    /// Clean, inner-join on (station, valid), estimate WBT and label stations.
    ///
    /// Output follows the temperature table's row order; duplicate keys in the
    /// humidity table yield one record per match, in humidity-table order.
    pub fn reconcile(
        &self,
        temperature: &ObservationTable,
        humidity: &ObservationTable,
    ) -> Reconciliation {
        let mut report = ReconcileReport {
            temperature_rows: temperature.len(),
            humidity_rows: humidity.len(),
            malformed_cells: temperature.malformed_cells + humidity.malformed_cells,
            ..Default::default()
        };

        let temperature_rows = Self::clean(temperature);
        let humidity_rows = Self::clean(humidity);
        report.temperature_dropped_missing = temperature.len() - temperature_rows.len();
        report.humidity_dropped_missing = humidity.len() - humidity_rows.len();

        let joined = Self::inner_join(&temperature_rows, &humidity_rows, &mut report);
        report.joined_rows = joined.len();

        let estimate = || -> Vec<Option<WbtRecord>> {
            joined
                .par_iter()
                .map(|row| self.build_record(row))
                .collect()
        };
        let estimated = match &self.pool {
            Some(pool) => pool.install(estimate),
            None => estimate(),
        };

        let mut records = Vec::with_capacity(estimated.len());
        for record in estimated {
            match record {
                Some(record) => {
                    if !record.is_mapped() {
                        report.unmapped_station_rows += 1;
                        report.unmapped_stations.insert(record.station.clone());
                    }
                    *report
                        .records_per_station
                        .entry(record.station.clone())
                        .or_default() += 1;
                    records.push(record);
                }
                None => report.rejected_rows += 1,
            }
        }

        if report.rejected_rows > 0 {
            warn!(
                "{} joined rows refused by the {} input policy",
                report.rejected_rows, self.input_policy
            );
        }
        if !report.unmapped_stations.is_empty() {
            warn!(
                "Stations without a registry name: {:?}",
                report.unmapped_stations
            );
        }
        info!(
            "Reconciled {} records from {} temperature and {} humidity rows",
            records.len(),
            report.temperature_rows,
            report.humidity_rows
        );

        Reconciliation { records, report }
    }

    /// Drop rows lacking any field required downstream.
    fn clean(table: &ObservationTable) -> Vec<CleanRow<'_>> {
        table
            .rows
            .iter()
            .filter_map(|row| row.complete())
            .map(|(station, valid, value)| CleanRow {
                station,
                valid,
                value,
            })
            .collect()
    }

    fn inner_join<'a>(
        temperature: &[CleanRow<'a>],
        humidity: &[CleanRow<'a>],
        report: &mut ReconcileReport,
    ) -> Vec<JoinedRow<'a>> {
        let mut humidity_index: HashMap<(&str, NaiveDateTime), Vec<usize>> = HashMap::new();
        for (position, row) in humidity.iter().enumerate() {
            humidity_index
                .entry((row.station, row.valid))
                .or_default()
                .push(position);
        }

        let mut joined = Vec::new();
        let mut matched_humidity: HashSet<usize> = HashSet::new();

        for row in temperature {
            match humidity_index.get(&(row.station, row.valid)) {
                Some(positions) => {
                    for &position in positions {
                        matched_humidity.insert(position);
                        joined.push(JoinedRow {
                            station: row.station,
                            valid: row.valid,
                            tmpc: row.value,
                            relh: humidity[position].value,
                        });
                    }
                }
                None => report.unmatched_temperature_rows += 1,
            }
        }

        report.unmatched_humidity_rows = humidity.len() - matched_humidity.len();
        joined
    }

    fn build_record(&self, row: &JoinedRow<'_>) -> Option<WbtRecord> {
        let wbt_c = match self.input_policy.estimate(row.tmpc, row.relh) {
            Ok(wbt_c) => wbt_c,
            Err(e) => {
                debug!("Skipping {} at {}: {}", row.station, row.valid, e);
                return None;
            }
        };

        Some(WbtRecord::new(
            row.station.to_string(),
            row.valid,
            row.tmpc,
            row.relh,
            wbt_c,
            self.registry.station_name(row.station).map(str::to_string),
        ))
    }
}

impl Default for HistoricalReconciler {
    fn default() -> Self {
        Self::new(LocationRegistry::default())
    }
}
