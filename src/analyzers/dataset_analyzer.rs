use crate::error::{ProcessingError, Result};
use crate::models::WbtRecord;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

/// Per-station figures over a derived dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary {
    pub station: String,
    pub station_name: Option<String>,
    pub records: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub min_wbt: f64,
    pub max_wbt: f64,
    pub mean_wbt: f64,
    /// Observations strictly above the danger threshold.
    pub above_threshold: usize,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub danger_threshold_c: f64,
    pub stations: Vec<StationSummary>,
    pub hottest: Option<WbtRecord>,
}

/// Running totals for one station.
struct Accumulator {
    station_name: Option<String>,
    records: usize,
    first: NaiveDateTime,
    last: NaiveDateTime,
    min_wbt: f64,
    max_wbt: f64,
    wbt_sum: f64,
    above_threshold: usize,
    years: BTreeSet<i32>,
}

impl Accumulator {
    fn new(record: &WbtRecord) -> Self {
        Self {
            station_name: record.station_name.clone(),
            records: 0,
            first: record.valid,
            last: record.valid,
            min_wbt: f64::INFINITY,
            max_wbt: f64::NEG_INFINITY,
            wbt_sum: 0.0,
            above_threshold: 0,
            years: BTreeSet::new(),
        }
    }

    fn add(&mut self, record: &WbtRecord, threshold_c: f64) {
        self.records += 1;
        self.first = self.first.min(record.valid);
        self.last = self.last.max(record.valid);
        self.min_wbt = self.min_wbt.min(record.wbt_c);
        self.max_wbt = self.max_wbt.max(record.wbt_c);
        self.wbt_sum += record.wbt_c;
        if record.exceeds(threshold_c) {
            self.above_threshold += 1;
        }
        self.years.insert(record.year);
    }

    fn finish(self, station: String) -> StationSummary {
        StationSummary {
            station,
            station_name: self.station_name,
            records: self.records,
            first: self.first,
            last: self.last,
            min_wbt: self.min_wbt,
            max_wbt: self.max_wbt,
            mean_wbt: self.wbt_sum / self.records as f64,
            above_threshold: self.above_threshold,
            years: self.years.into_iter().collect(),
        }
    }
}

/// Read-side queries over reconciled records.
pub struct DatasetAnalyzer {
    danger_threshold_c: f64,
}

impl DatasetAnalyzer {
    pub fn new(danger_threshold_c: f64) -> Self {
        Self { danger_threshold_c }
    }

    fn matches_location(record: &WbtRecord, location: &str) -> bool {
        let wanted = location.trim();
        record.station.eq_ignore_ascii_case(wanted)
            || record
                .station_name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    }

    /// Distinct location labels present in the dataset, sorted.
    pub fn locations(&self, records: &[WbtRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.station_label().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Years with data for a location (station name or code), ascending.
    pub fn available_years(&self, records: &[WbtRecord], location: &str) -> Vec<i32> {
        records
            .iter()
            .filter(|r| Self::matches_location(r, location))
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records for one location and year, sorted by timestamp.
    ///
    /// Without a year the earliest available year is used.
    pub fn series<'a>(
        &self,
        records: &'a [WbtRecord],
        location: &str,
        year: Option<i32>,
    ) -> Vec<&'a WbtRecord> {
        let year = match year.or_else(|| self.available_years(records, location).first().copied()) {
            Some(year) => year,
            None => return Vec::new(),
        };

        let mut series: Vec<&WbtRecord> = records
            .iter()
            .filter(|r| r.year == year && Self::matches_location(r, location))
            .collect();
        series.sort_by_key(|r| r.valid);
        series
    }

    /// Per-station statistics for the whole dataset
    pub fn analyze(&self, records: &[WbtRecord]) -> Result<DatasetStatistics> {
        let first = records
            .first()
            .ok_or_else(|| ProcessingError::InvalidFormat("No records to analyze".to_string()))?;

        let mut per_station: BTreeMap<String, Accumulator> = BTreeMap::new();
        let mut start = first.valid;
        let mut end = first.valid;
        let mut hottest = first;

        for record in records {
            per_station
                .entry(record.station.clone())
                .or_insert_with(|| Accumulator::new(record))
                .add(record, self.danger_threshold_c);

            start = start.min(record.valid);
            end = end.max(record.valid);
            if record.wbt_c > hottest.wbt_c {
                hottest = record;
            }
        }

        Ok(DatasetStatistics {
            total_records: records.len(),
            time_range: (start, end),
            danger_threshold_c: self.danger_threshold_c,
            stations: per_station
                .into_iter()
                .map(|(station, acc)| acc.finish(station))
                .collect(),
            hottest: Some(hottest.clone()),
        })
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new(crate::utils::constants::DEFAULT_DANGER_THRESHOLD_C)
    }
}

impl DatasetStatistics {
    pub fn summary(&self) -> String {
        format!(
            "Stations: {}\n\
            Records: {} total\n\
            Time Range: {} to {}\n\
            Danger threshold: {:.1}°C",
            self.stations.len(),
            self.total_records,
            self.time_range.0.format("%Y-%m-%d %H:%M"),
            self.time_range.1.format("%Y-%m-%d %H:%M"),
            self.danger_threshold_c
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = self.summary();

        if let Some(ref hottest) = self.hottest {
            summary.push_str(&format!(
                "\nHighest WBT: {:.2}°C at {} ({})",
                hottest.wbt_c,
                hottest.station_label(),
                hottest.valid.format("%Y-%m-%d %H:%M")
            ));
        }

        summary.push_str("\n\nPer Station:\n");
        for station in &self.stations {
            let years = match (station.years.first(), station.years.last()) {
                (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
                (Some(first), _) => first.to_string(),
                _ => String::new(),
            };
            summary.push_str(&format!(
                "- {} ({}): {} records, {}, WBT min/mean/max {:.1}/{:.1}/{:.1}°C, {} above threshold\n",
                station.station,
                station
                    .station_name
                    .as_deref()
                    .unwrap_or(crate::models::UNMAPPED_STATION_LABEL),
                station.records,
                years,
                station.min_wbt,
                station.mean_wbt,
                station.max_wbt,
                station.above_threshold
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_timestamp;
    use pretty_assertions::assert_eq;

    fn record(station: &str, name: Option<&str>, valid: &str, wbt: f64) -> WbtRecord {
        WbtRecord::new(
            station.to_string(),
            parse_timestamp(valid).unwrap(),
            30.0,
            80.0,
            wbt,
            name.map(str::to_string),
        )
    }

    fn dataset() -> Vec<WbtRecord> {
        vec![
            record("VOCI", Some("Cochin"), "2021-03-01 12:00", 26.0),
            record("VOCI", Some("Cochin"), "2020-05-01 06:00", 27.5),
            record("VOMM", Some("Madras"), "2020-05-01 00:00", 31.0),
            record("VOCI", Some("Cochin"), "2020-05-01 00:00", 25.0),
            record("KBOS", None, "2020-01-01 00:00", 2.0),
        ]
    }

    #[test]
    fn test_series_filters_and_sorts() {
        let records = dataset();
        let analyzer = DatasetAnalyzer::default();

        let series = analyzer.series(&records, "cochin", Some(2020));

        let times: Vec<String> = series
            .iter()
            .map(|r| r.valid.format("%Y-%m-%d %H:%M").to_string())
            .collect();
        assert_eq!(times, vec!["2020-05-01 00:00", "2020-05-01 06:00"]);
    }

    #[test]
    fn test_series_defaults_to_earliest_year() {
        let records = dataset();
        let analyzer = DatasetAnalyzer::default();

        assert_eq!(analyzer.available_years(&records, "VOCI"), vec![2020, 2021]);
        assert_eq!(analyzer.series(&records, "Cochin", None).len(), 2);
        assert!(analyzer.series(&records, "Atlantis", None).is_empty());
        assert!(analyzer.series(&records, "Cochin", Some(1999)).is_empty());
    }

    #[test]
    fn test_locations_include_unmapped_label() {
        let analyzer = DatasetAnalyzer::default();
        assert_eq!(
            analyzer.locations(&dataset()),
            vec!["Cochin", "Madras", "unmapped"]
        );
    }

    #[test]
    fn test_station_statistics() -> Result<()> {
        let analyzer = DatasetAnalyzer::new(30.0);
        let stats = analyzer.analyze(&dataset())?;

        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.stations.len(), 3);

        let cochin = &stats.stations[1];
        assert_eq!(cochin.station, "VOCI");
        assert_eq!(cochin.records, 3);
        assert_eq!(cochin.min_wbt, 25.0);
        assert_eq!(cochin.max_wbt, 27.5);
        assert!((cochin.mean_wbt - 26.166_666).abs() < 1e-4);
        assert_eq!(cochin.years, vec![2020, 2021]);

        let madras = &stats.stations[2];
        assert_eq!(madras.above_threshold, 1);
        assert_eq!(stats.hottest.as_ref().map(|r| r.station.as_str()), Some("VOMM"));

        let text = stats.detailed_summary();
        assert!(text.contains("KBOS (unmapped)"));
        Ok(())
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(DatasetAnalyzer::default().analyze(&[]).is_err());
    }
}
