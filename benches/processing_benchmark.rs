use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wetbulb_monitor::models::{ObservationKind, ObservationTable, RawObservation};
use wetbulb_monitor::processors::HistoricalReconciler;
use wetbulb_monitor::readers::ObservationReader;
use wetbulb_monitor::utils::wet_bulb_temperature;

const STATIONS: [&str; 8] = ["VECC", "VABB", "VASU", "VOCI", "VOGO", "VOMM", "VOVZ", "VOTV"];

// Hourly observations for every station; every 17th humidity cell is missing
fn create_test_tables(hours: usize) -> (ObservationTable, ObservationTable) {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();

    let mut temperature = Vec::with_capacity(hours * STATIONS.len());
    let mut humidity = Vec::with_capacity(hours * STATIONS.len());

    for hour in 0..hours {
        let valid = start + Duration::hours(hour as i64);
        for (i, station) in STATIONS.iter().enumerate() {
            let tmpc = 24.0 + (hour % 24) as f64 * 0.4 + i as f64 * 0.2;
            let relh = 55.0 + ((hour + i) % 40) as f64;

            temperature.push(RawObservation::new(
                Some(station.to_string()),
                Some(valid),
                Some(tmpc),
            ));
            humidity.push(RawObservation::new(
                Some(station.to_string()),
                Some(valid),
                if (hour + i) % 17 == 0 { None } else { Some(relh) },
            ));
        }
    }

    (
        ObservationTable::new(ObservationKind::Temperature, temperature),
        ObservationTable::new(ObservationKind::Humidity, humidity),
    )
}

fn benchmark_wet_bulb(c: &mut Criterion) {
    let inputs: Vec<(f64, f64)> = (0..100)
        .map(|i| (15.0 + (i % 30) as f64, 10.0 + (i % 90) as f64))
        .collect();

    c.bench_function("wet_bulb_temperature", |b| {
        b.iter(|| {
            let total: f64 = inputs
                .iter()
                .map(|&(t, rh)| wet_bulb_temperature(black_box(t), black_box(rh)))
                .sum();
            black_box(total)
        })
    });
}

fn benchmark_csv_parsing(c: &mut Criterion) {
    let mut data = String::from("station,valid,tmpc\n");
    for hour in 0..2000 {
        data.push_str(&format!(
            "VOCI,2020-01-{:02} {:02}:00,{}\n",
            1 + hour / 24 % 28,
            hour % 24,
            if hour % 13 == 0 { "M".to_string() } else { format!("{:.1}", 25.0 + (hour % 9) as f64) }
        ));
    }

    c.bench_function("observation_reader", |b| {
        b.iter(|| {
            let reader = ObservationReader::new();
            let table = reader
                .read_from(data.as_bytes(), ObservationKind::Temperature)
                .map(|t| t.len())
                .unwrap_or(0);
            black_box(table)
        })
    });
}

fn benchmark_reconcile_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_by_hours");

    for &hours in &[24, 24 * 30, 24 * 365] {
        let (temperature, humidity) = create_test_tables(hours);

        group.bench_with_input(BenchmarkId::new("hours", hours), &hours, |b, _| {
            let reconciler = HistoricalReconciler::default();
            b.iter(|| {
                let result = reconciler.reconcile(&temperature, &humidity);
                black_box(result.records.len())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_wet_bulb,
    benchmark_csv_parsing,
    benchmark_reconcile_by_size
);
criterion_main!(benches);
