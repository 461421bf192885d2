use chrono::{Days, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use garden_weather::{aggregate_hourly, combine, default_rolling_specs, AggregateSpec, Stage};
use polars::prelude::*;

const DAYS: usize = 3_650;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()
}

fn synthetic_hourly(variables: &[String]) -> DataFrame {
    let stamps: Vec<NaiveDateTime> = (0..DAYS * 24)
        .map(|h| start().and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::hours(h as i64))
        .collect();
    let mut columns: Vec<Column> = vec![Series::new("datetime".into(), stamps).into()];
    for (i, name) in variables.iter().enumerate() {
        let values: Vec<f64> = (0..DAYS * 24)
            .map(|h| ((h + i) % 48) as f64 * 0.5)
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    DataFrame::new(columns).unwrap()
}

fn synthetic_daily(first: NaiveDate, days: usize) -> DataFrame {
    let dates: Vec<NaiveDate> = first.iter_days().take(days).collect();
    let ramp = |scale: f64| -> Vec<f64> { (0..days).map(|d| (d % 30) as f64 * scale).collect() };
    let mut columns: Vec<Column> = vec![
        Series::new("date".into(), dates).into(),
        Series::new("weather_code".into(), vec![3.0; days]).into(),
        Series::new("temperature_2m_mean".into(), ramp(1.5)).into(),
        Series::new("precipitation_sum".into(), ramp(0.01)).into(),
        Series::new("rain_sum".into(), ramp(0.01)).into(),
        Series::new("snowfall_sum".into(), ramp(0.02)).into(),
    ];
    for layer in ["0_to_7cm", "7_to_28cm", "28_to_100cm", "100_to_255cm"] {
        columns.push(
            Series::new(format!("soil_temperature_{layer}_mean").into(), ramp(1.0)).into(),
        );
    }
    DataFrame::new(columns).unwrap()
}

fn bench_transforms(c: &mut Criterion) {
    let variables = Stage::Historical.hourly_variables();
    let hourly = synthetic_hourly(&variables);
    let specs: Vec<AggregateSpec> = Stage::Historical.aggregates();
    c.bench_function("aggregate_hourly_10y", |b| {
        b.iter(|| aggregate_hourly(black_box(&hourly), black_box(&specs)))
    });

    let historical = synthetic_daily(start(), DAYS);
    let ytd_start = start() + Days::new(DAYS as u64);
    let ytd = synthetic_daily(ytd_start, 200);
    let prediction = synthetic_daily(ytd_start + Days::new(200), 9);
    let run_date = ytd_start + Days::new(202);
    let rolling = default_rolling_specs();
    c.bench_function("combine_10y", |b| {
        b.iter(|| {
            combine(
                black_box(&historical),
                black_box(&ytd),
                black_box(&prediction),
                run_date,
                &rolling,
            )
        })
    });
}

criterion_group!(benches, bench_transforms);
criterion_main!(benches);
