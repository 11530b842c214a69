use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sgp4track::epoch_time::EpochTime;
use sgp4track::gravity_model::GravityModel;
use sgp4track::orbital_elements::{ElementSetMetadata, MeanElements, OrbitalElementRecord};
use sgp4track::propagation::{initialize, propagate, propagate_batch};
use sgp4track::tle::parse_tle;

/// Random element set, period below 225 min when `mean_motion` > 6.4 rev/day.
fn random_elements(
    rng: &mut StdRng,
    catalog_number: u32,
    mean_motion: f64,
) -> OrbitalElementRecord {
    OrbitalElementRecord::from_mean_elements(
        ElementSetMetadata {
            catalog_number,
            ..Default::default()
        },
        &MeanElements {
            epoch_year: 2024,
            epoch_day: rng.random_range(1.0..365.0),
            mean_motion,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
            bstar: rng.random_range(0.0..1e-4),
            inclination: rng.random_range(0.0..110.0),
            right_ascension: rng.random_range(0.0..360.0),
            eccentricity: rng.random_range(0.0..0.02),
            argument_of_perigee: rng.random_range(0.0..360.0),
            mean_anomaly: rng.random_range(0.0..360.0),
        },
    )
}

fn bench_parse_and_initialize(c: &mut Criterion) {
    let line1 = "1 25544U 98067A   19356.46068278  .00000035  00000-0  86431-5 0  9990";
    let line2 = "2 25544  51.6420 147.9381 0007793  61.6458  55.7201 15.50124783204461";

    c.bench_function("propagate_elements/parse_tle", |b| {
        b.iter(|| black_box(parse_tle(black_box(line1), black_box(line2), None).unwrap()))
    });

    let record = parse_tle(line1, line2, None).unwrap();
    c.bench_function("propagate_elements/initialize_near_earth", |b| {
        b.iter(|| black_box(initialize(black_box(&record), GravityModel::Wgs72).unwrap()))
    });
}

/// One day of near-earth samples, one minute apart.
fn bench_near_earth_day(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5A7E11);
    let record = random_elements(&mut rng, 1, 15.2);
    let mut state = initialize(&record, GravityModel::Wgs72).unwrap();

    c.bench_function("propagate_elements/near_earth_1440_samples", |b| {
        b.iter(|| {
            for t in 0..1440 {
                black_box(propagate(&mut state, black_box(t as f64)).ok());
            }
        })
    });
}

/// Resonant geostationary orbit: forward queries reuse the integrator checkpoint.
fn bench_deep_space_day(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x6E0);
    let record = random_elements(&mut rng, 2, 1.0027);

    c.bench_function("propagate_elements/geostationary_30_days_hourly", |b| {
        b.iter_batched(
            || initialize(&record, GravityModel::Wgs72).unwrap(),
            |mut state| {
                for hour in 0..720 {
                    black_box(propagate(&mut state, black_box(hour as f64 * 60.0)).ok());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBA7C4);
    let records: Vec<_> = (0..500)
        .map(|k| {
            let n = rng.random_range(11.0..16.0);
            random_elements(&mut rng, k, n)
        })
        .collect();
    let start = EpochTime::from_calendar(2024, 6, 1, 0, 0, 0.0).unwrap();
    let stop = EpochTime::from_calendar(2024, 6, 1, 12, 0, 0.0).unwrap();

    c.bench_function("propagate_elements/batch_500_sets_12h", |b| {
        b.iter(|| {
            black_box(propagate_batch(
                black_box(&records),
                GravityModel::Wgs72,
                &start,
                &stop,
                5.0,
            ))
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse_and_initialize, bench_near_earth_day, bench_deep_space_day, bench_batch
);
criterion_main!(benches);
