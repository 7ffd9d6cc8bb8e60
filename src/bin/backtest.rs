use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use goalline::backtest::{self, Tally};
use goalline::config::ModelConfig;
use goalline::corpus::{self, Match};
use goalline::predictor::Predictor;

const DEFAULT_CORPUS: &str = "tests/fixtures/corpus.json";

fn main() -> Result<()> {
    goalline::load_env_files();
    goalline::init_logging();

    let corpus_path = parse_path_arg("--corpus").unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS));
    let corpus = corpus::load_corpus_json(&corpus_path)?;
    if corpus.is_empty() {
        return Err(anyhow!("no matches found in {}", corpus_path.display()));
    }

    let config = load_config(parse_path_arg("--config").as_deref())?;
    let parallel = has_flag("--parallel");

    // Without explicit fixtures, walk forward over every played match: each
    // prediction only sees matches dated before its kickoff.
    let mut fixtures: Vec<Match> = match parse_path_arg("--fixtures") {
        Some(path) => corpus::load_matches_json(&path)?,
        None => corpus
            .played()
            .filter(|m| m.has_known_date())
            .cloned()
            .collect(),
    };
    if let Some(last) = parse_usize_arg("--last") {
        let skip = fixtures.len().saturating_sub(last.max(1));
        fixtures.drain(..skip);
    }
    if fixtures.is_empty() {
        return Err(anyhow!("no fixtures to evaluate"));
    }

    let predictor = Predictor::new(corpus, config);
    let started = Instant::now();
    let predictions = if parallel {
        predictor.predict_batch_parallel(&fixtures)
    } else {
        predictor.predict_batch(&fixtures)
    };
    info!(
        fixtures = fixtures.len(),
        parallel,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );

    let tally = backtest::evaluate(&fixtures, &predictions);

    println!("Goal-market backtest");
    println!("Corpus: {} ({} matches)", corpus_path.display(), predictor.corpus().len());
    if let (Some(first), Some(last)) = (fixtures.first(), fixtures.last()) {
        println!("Fixtures: {} ({} -> {})", fixtures.len(), first.date, last.date);
    }
    println!();
    print_tally(&tally);

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    let base = match path {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::default(),
    };
    let cfg = base.with_env_overrides();
    cfg.validate().context("model config after env overrides")?;
    Ok(cfg)
}

fn print_tally(tally: &Tally) {
    println!(
        "Predictions: {} qualified={} unresolved={}",
        tally.predictions, tally.qualified, tally.unresolved
    );
    for (bet, count) in &tally.per_bet {
        println!(
            "  {:<22} n={:<5} hit={:<5} acc={:>6.2}%",
            bet.label(),
            count.total,
            count.correct,
            count.accuracy()
        );
    }
    println!(
        "Overall: n={} hit={} acc={:.2}%",
        tally.overall.total,
        tally.overall.correct,
        tally.accuracy()
    );
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn parse_usize_arg(name: &str) -> Option<usize> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<usize>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<usize>()
        {
            return Some(v);
        }
    }
    None
}
