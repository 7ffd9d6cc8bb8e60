use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use goalline::config::ModelConfig;
use goalline::corpus::{Match, MatchCorpus};
use goalline::predictor::Predictor;

const TEAMS: [&str; 20] = [
    "Arsenal", "Aston Villa", "Bournemouth", "Brentford", "Brighton", "Burnley", "Chelsea",
    "Crystal Palace", "Everton", "Fulham", "Liverpool", "Luton", "Man City", "Man United",
    "Newcastle", "Nottingham", "Sheffield", "Tottenham", "West Ham", "Wolves",
];

// Deterministic round-robin seasons with scores derived from the indices.
fn synthetic_matches(seasons: usize) -> Vec<Match> {
    let start = NaiveDate::from_ymd_opt(2018, 8, 11).unwrap();
    let mut out = Vec::new();
    let mut round = 0i64;
    for _ in 0..seasons {
        for shift in 1..TEAMS.len() {
            let date = start + Duration::days(7 * round);
            for (i, home) in TEAMS.iter().enumerate().step_by(2) {
                let away = TEAMS[(i + shift) % TEAMS.len()];
                if *home == away {
                    continue;
                }
                let hg = ((i * 7 + shift * 3 + round as usize) % 5) as u8;
                let ag = ((i * 3 + shift * 5 + round as usize) % 4) as u8;
                out.push(Match::played("E0", date, home, away, hg, ag));
            }
            round += 1;
        }
    }
    out
}

fn bench_predict(c: &mut Criterion) {
    let matches = synthetic_matches(5);
    let as_of = matches.last().unwrap().date + Duration::days(3);
    let predictor = Predictor::new(MatchCorpus::new(matches), ModelConfig::default());

    c.bench_function("predict_single", |b| {
        b.iter(|| {
            let p = predictor.predict(black_box("Arsenal"), black_box("Chelsea"), as_of, None);
            black_box(p.percentage);
        })
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let matches = synthetic_matches(5);
    let fixtures: Vec<Match> = matches.iter().rev().take(200).cloned().collect();
    let predictor = Predictor::new(MatchCorpus::new(matches), ModelConfig::default());

    c.bench_function("predict_batch_200", |b| {
        b.iter(|| black_box(predictor.predict_batch(black_box(&fixtures))).len())
    });
    c.bench_function("predict_batch_parallel_200", |b| {
        b.iter(|| black_box(predictor.predict_batch_parallel(black_box(&fixtures))).len())
    });
}

criterion_group!(benches, bench_predict, bench_predict_batch);
criterion_main!(benches);
