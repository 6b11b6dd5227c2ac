use crate::analyzers::DatasetAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::fetchers::OpenWeatherClient;
use crate::logging::init_logging;
use crate::models::{Location, Snapshot, ThresholdBand};
use crate::processors::{HistoricalReconciler, SnapshotAggregator};
use crate::readers::DatasetReader;
use crate::utils::constants::{DANGER_ADVICE, DISPLAY_TIME_FORMAT, NO_DATA_MESSAGE, SAFE_MESSAGE};
use crate::utils::progress::ProgressReporter;
use crate::utils::{InputPolicy, LocationRegistry, MAP_CENTRE};
use crate::writers::{is_parquet_path, write_dataset, ParquetWriter};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    let registry = LocationRegistry::new();

    match cli.command {
        Commands::Snapshot {
            locations,
            max_concurrency,
        } => {
            if let Some(max_concurrency) = max_concurrency {
                config.max_concurrency = max_concurrency;
                config.validate()?;
            }

            let locations = if locations.is_empty() {
                registry.locations()
            } else {
                locations
                    .iter()
                    .map(|name| name.parse::<Location>())
                    .collect::<Result<Vec<_>>>()?
            };

            let source = Arc::new(OpenWeatherClient::from_config(&config)?);
            let aggregator = SnapshotAggregator::from_config(source, &config);

            let progress = ProgressReporter::new(
                locations.len() as u64,
                "Fetching current conditions...",
                cli.quiet,
            );
            let set = aggregator.aggregate(&locations, Some(&progress)).await;
            progress.finish_and_clear();

            let tz = config.timezone()?;
            if let Some(fetched_at) = set.fetched_at {
                println!("Fetched at {}", local_time(fetched_at, &tz));
            }

            if set.is_empty() {
                println!("{}", NO_DATA_MESSAGE);
                return Ok(());
            }

            println!(
                "\n{:<14} {:>8} {:>8} {:>8}  {:<15} {:>8}",
                "Location", "Temp °C", "RH %", "WBT °C", "Band", "Relative"
            );
            for entry in set.bands(config.critical_threshold_c, config.maximum_threshold_c) {
                let s = entry.snapshot;
                println!(
                    "{:<14} {:>8.1} {:>8.0} {:>8.2}  {:<15} {:>8.2}{}",
                    s.location.name(),
                    s.temperature_c,
                    s.humidity_pct,
                    s.wbt_c,
                    entry.band.to_string(),
                    entry.relative_position,
                    if s.is_dangerous { "  ⚠️" } else { "" }
                );
            }

            println!(
                "\nReference lines: critical {:.0}°C, maximum {:.0}°C",
                config.critical_threshold_c, config.maximum_threshold_c
            );

            if set.any_dangerous() {
                println!("\n{}", danger_notice(config.danger_threshold_c));
                for s in set.dangerous() {
                    println!("  - {}: {:.2}°C", s.location, s.wbt_c);
                }
            } else {
                println!("\n{}", SAFE_MESSAGE);
            }
        }

        Commands::Reading { location } => {
            let location: Location = location.parse()?;
            let coordinate = registry.coordinate(location)?;

            let source = Arc::new(OpenWeatherClient::from_config(&config)?);
            let aggregator = SnapshotAggregator::from_config(source, &config);

            match aggregator.snapshot_for(location).await {
                Ok(snapshot) => print_reading(&snapshot, &config)?,
                Err(e) if e.is_absence() => {
                    warn!("No reading for {}: {}", location, e);
                    println!("{} ({})", location, coordinate);
                    println!("{}", NO_DATA_MESSAGE);
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Reconcile {
            temperature,
            humidity,
            output,
            missing_marker,
            input_policy,
            compression,
            validate_only,
            max_workers,
        } => {
            if let Some(marker) = missing_marker {
                config.missing_marker = marker;
            }
            if let Some(policy) = input_policy {
                config.input_policy = policy.parse::<InputPolicy>()?;
            }
            config.validate()?;

            println!("Reconciling historical station data...");
            println!("Temperature: {}", temperature.display());
            println!("Humidity: {}", humidity.display());
            println!("Workers: {}", max_workers);

            let progress = ProgressReporter::new_spinner("Reading station tables...", cli.quiet);

            let reconciler = HistoricalReconciler::new(registry)
                .with_input_policy(config.input_policy)
                .with_missing_marker(&config.missing_marker)
                .with_max_workers(max_workers)?;
            let reconciliation = reconciler
                .reconcile_files(&temperature, &humidity, Some(&progress))
                .await?;

            println!("\n{}", reconciliation.report.summary());

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            write_dataset(&reconciliation.records, &output, &compression)?;
            info!(
                "Wrote {} records to {}",
                reconciliation.records.len(),
                output.display()
            );
            println!(
                "Wrote {} records to {}",
                reconciliation.records.len(),
                output.display()
            );

            if is_parquet_path(&output) {
                let file_info = ParquetWriter::new()
                    .with_compression(&compression)?
                    .get_file_info(&output)?;
                println!("\n{}", file_info.summary());
            }
        }

        Commands::Series {
            dataset,
            location,
            year,
        } => {
            let records = DatasetReader::new().read_records(&dataset)?;
            let analyzer = DatasetAnalyzer::new(config.danger_threshold_c);

            let years = analyzer.available_years(&records, &location);
            if years.is_empty() {
                println!("No records for '{}'", location);
                println!("Available: {}", analyzer.locations(&records).join(", "));
                return Ok(());
            }

            let series = analyzer.series(&records, &location, year);
            let shown_year = year.unwrap_or(years[0]);
            let available: Vec<String> = years.iter().map(i32::to_string).collect();

            println!(
                "{} {}: {} observations (years available: {})",
                location,
                shown_year,
                series.len(),
                available.join(", ")
            );
            println!(
                "\n{:<17} {:>8} {:>8} {:>8}",
                "Time", "Temp °C", "RH %", "WBT °C"
            );
            for record in &series {
                println!(
                    "{:<17} {:>8.1} {:>8.0} {:>8.2}{}",
                    record.valid.format("%Y-%m-%d %H:%M"),
                    record.tmpc,
                    record.humidity,
                    record.wbt_c,
                    if record.exceeds(config.danger_threshold_c) {
                        "  ⚠️"
                    } else {
                        ""
                    }
                );
            }
        }

        Commands::Info { dataset, sample } => {
            println!("Analyzing dataset: {}", dataset.display());

            let records = DatasetReader::new().read_records(&dataset)?;
            let analyzer = DatasetAnalyzer::new(config.danger_threshold_c);
            let stats = analyzer.analyze(&records)?;

            println!("\n{}", stats.detailed_summary());

            if is_parquet_path(&dataset) {
                let file_info = ParquetWriter::new().get_file_info(&dataset)?;
                println!("\nFile Details:");
                println!("{}", file_info.summary());
            }

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(records.len()));
                for (i, record) in records.iter().take(sample).enumerate() {
                    println!(
                        "{}. {} ({}) at {}: {:.1}°C, {:.0}%, WBT {:.2}°C",
                        i + 1,
                        record.station,
                        record.station_label(),
                        record.valid.format("%Y-%m-%d %H:%M"),
                        record.tmpc,
                        record.humidity,
                        record.wbt_c
                    );
                }
            }
        }

        Commands::Locations => {
            println!("Locations (map centre {}):", MAP_CENTRE);
            for location in registry.locations() {
                println!("  {:<14} {}", location.name(), registry.coordinate(location)?);
            }

            println!("\nHistorical stations:");
            for (code, name) in registry.station_codes() {
                println!("  {}  {}", code, name);
            }
        }
    }

    Ok(())
}

fn local_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

fn danger_notice(threshold_c: f64) -> String {
    format!(
        "⚠️ Wet-bulb temperature above {:.0}°C {}",
        threshold_c, DANGER_ADVICE
    )
}

fn print_reading(snapshot: &Snapshot, config: &AppConfig) -> Result<()> {
    let tz = config.timezone()?;
    let band = ThresholdBand::classify(
        snapshot.wbt_c,
        config.critical_threshold_c,
        config.maximum_threshold_c,
    );

    println!("{}", snapshot.location);
    if let Some(observed_at) = snapshot.observed_at {
        println!("Observed: {}", local_time(observed_at, &tz));
    }
    println!("Temperature: {:.1}°C", snapshot.temperature_c);
    println!("Humidity: {:.0}%", snapshot.humidity_pct);
    println!("Wet-bulb temperature: {:.2}°C ({})", snapshot.wbt_c, band);

    if snapshot.is_dangerous {
        println!("\n{}", danger_notice(config.danger_threshold_c));
    } else {
        println!("\n{}", SAFE_MESSAGE);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_time_uses_display_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap();
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        assert_eq!(local_time(instant, &tz), "2024-05-01 12:00:00");
    }

    #[test]
    fn test_danger_notice_names_threshold() {
        let notice = danger_notice(31.0);
        assert!(notice.contains("above 31°C"));
        assert!(notice.contains("can be deadly outside"));
    }
}
