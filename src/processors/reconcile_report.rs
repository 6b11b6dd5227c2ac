use std::collections::{BTreeMap, BTreeSet};

/// Row accounting for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub temperature_rows: usize,
    pub humidity_rows: usize,
    pub temperature_dropped_missing: usize,
    pub humidity_dropped_missing: usize,
    /// Cells that were neither a number/timestamp nor the missing marker.
    pub malformed_cells: usize,
    pub joined_rows: usize,
    pub unmatched_temperature_rows: usize,
    pub unmatched_humidity_rows: usize,
    /// Joined rows refused by the input policy.
    pub rejected_rows: usize,
    pub unmapped_station_rows: usize,
    pub unmapped_stations: BTreeSet<String>,
    pub records_per_station: BTreeMap<String, usize>,
}

impl ReconcileReport {
    pub fn output_rows(&self) -> usize {
        self.joined_rows - self.rejected_rows
    }

    pub fn has_warnings(&self) -> bool {
        self.malformed_cells > 0 || self.rejected_rows > 0 || !self.unmapped_stations.is_empty()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Reconciliation Report ===\n");
        summary.push_str(&format!(
            "Temperature rows: {} ({} dropped for missing values)\n",
            self.temperature_rows, self.temperature_dropped_missing
        ));
        summary.push_str(&format!(
            "Humidity rows: {} ({} dropped for missing values)\n",
            self.humidity_rows, self.humidity_dropped_missing
        ));
        summary.push_str(&format!("Malformed cells: {}\n", self.malformed_cells));
        summary.push_str(&format!(
            "Joined rows: {} (unmatched: {} temperature, {} humidity)\n",
            self.joined_rows, self.unmatched_temperature_rows, self.unmatched_humidity_rows
        ));
        summary.push_str(&format!(
            "Rejected by input policy: {}\n",
            self.rejected_rows
        ));
        summary.push_str(&format!("Records written: {}\n", self.output_rows()));

        if !self.records_per_station.is_empty() {
            summary.push_str("\nRecords per station:\n");
            for (station, count) in &self.records_per_station {
                summary.push_str(&format!("  {}: {}\n", station, count));
            }
        }

        if !self.unmapped_stations.is_empty() {
            let stations: Vec<&str> = self.unmapped_stations.iter().map(String::as_str).collect();
            summary.push_str(&format!(
                "\nUnmapped stations ({} rows): {}\n",
                self.unmapped_station_rows,
                stations.join(", ")
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_unmapped_stations() {
        let mut report = ReconcileReport {
            temperature_rows: 4,
            humidity_rows: 3,
            joined_rows: 2,
            unmapped_station_rows: 1,
            ..Default::default()
        };
        report.unmapped_stations.insert("KBOS".to_string());
        report.records_per_station.insert("VOCI".to_string(), 1);
        report.records_per_station.insert("KBOS".to_string(), 1);

        let summary = report.summary();
        assert!(summary.contains("Joined rows: 2"));
        assert!(summary.contains("Unmapped stations (1 rows): KBOS"));
        assert!(summary.contains("  VOCI: 1"));
        assert!(report.has_warnings());
        assert_eq!(report.output_rows(), 2);
    }

    #[test]
    fn test_clean_report_has_no_warnings() {
        let report = ReconcileReport::default();
        assert!(!report.has_warnings());
        assert!(!report.summary().contains("Unmapped"));
    }
}
