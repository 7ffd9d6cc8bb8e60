use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use goalline::config::ModelConfig;
use goalline::corpus;
use goalline::prediction::BetType;
use goalline::predictor::Predictor;

const DEFAULT_CORPUS: &str = "tests/fixtures/corpus.json";

fn main() -> Result<()> {
    goalline::load_env_files();
    goalline::init_logging();

    let base = match parse_string_arg("--config") {
        Some(path) => ModelConfig::load(&PathBuf::from(path))?,
        None => ModelConfig::default(),
    };
    let config = base.with_env_overrides();
    config
        .validate()
        .context("model config after env overrides")?;

    if let Some(path) = parse_string_arg("--write-config") {
        let path = PathBuf::from(path);
        config.save(&path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let home = parse_string_arg("--home").context("missing --home <team>")?;
    let away = parse_string_arg("--away").context("missing --away <team>")?;
    if home == away {
        return Err(anyhow!("--home and --away must differ"));
    }
    let as_of = match parse_string_arg("--date") {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid --date {raw}, expected YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };
    let filter = match parse_string_arg("--bet") {
        Some(raw) => Some(BetType::from_label(&raw).ok_or_else(|| anyhow!("unknown bet type {raw}"))?),
        None => None,
    };

    let corpus_path = parse_string_arg("--corpus").unwrap_or_else(|| DEFAULT_CORPUS.to_string());
    let corpus = corpus::load_corpus_json(&PathBuf::from(&corpus_path))?;
    for team in [&home, &away] {
        if !corpus.contains_team(team) {
            tracing::warn!(team = team.as_str(), corpus = corpus_path.as_str(), "team not in corpus");
        }
    }

    let predictor = Predictor::new(corpus, config);
    if has_flag("--profiles") {
        // Full profiles, including the recency and conceded figures the rules don't read.
        let profiles = predictor.profiles(&home, &away, as_of);
        let json = serde_json::to_string_pretty(&profiles).context("serialize profiles")?;
        println!("{json}");
    }
    let prediction = predictor.predict(&home, &away, as_of, filter);
    let json = serde_json::to_string_pretty(&prediction).context("serialize prediction")?;
    println!("{json}");
    Ok(())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn parse_string_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
