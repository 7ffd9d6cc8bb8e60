use std::path::Path;

use chrono::NaiveDate;
use goalline::backtest;
use goalline::config::ModelConfig;
use goalline::corpus::{self, Match, MatchCorpus};
use goalline::prediction::BetType;
use goalline::predictor::Predictor;

fn fixture_corpus() -> MatchCorpus {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/corpus.json"));
    corpus::load_corpus_json(path).expect("fixture corpus")
}

fn walk_forward_fixtures(corpus: &MatchCorpus) -> Vec<Match> {
    corpus.played().filter(|m| m.has_known_date()).cloned().collect()
}

#[test]
fn later_matches_never_change_a_prediction() {
    let corpus = fixture_corpus();
    let kickoff = NaiveDate::from_ymd_opt(2023, 10, 7).unwrap();
    let truncated = MatchCorpus::new(corpus.before(kickoff).to_vec());

    let full = Predictor::new(corpus, ModelConfig::default());
    let past_only = Predictor::new(truncated, ModelConfig::default());
    assert_eq!(
        full.predict("Chelsea", "Brighton", kickoff, None),
        past_only.predict("Chelsea", "Brighton", kickoff, None)
    );
    assert_eq!(
        full.predict("Everton", "Arsenal", kickoff, Some(BetType::HomeWin)),
        past_only.predict("Everton", "Arsenal", kickoff, Some(BetType::HomeWin))
    );
}

#[test]
fn unknown_team_is_not_qualified() {
    let predictor = Predictor::new(fixture_corpus(), ModelConfig::default());
    let p = predictor.predict("Arsenal", "Fulham", NaiveDate::from_ymd_opt(2023, 11, 4).unwrap(), None);
    assert_eq!(p.bet_type, BetType::Unknown);
    assert!(!p.qualified());
    assert!(!p.head_to_head_ignored());
}

#[test]
fn batch_keeps_fixture_order_and_matches_parallel() {
    let corpus = fixture_corpus();
    let fixtures = walk_forward_fixtures(&corpus);
    let predictor = Predictor::new(corpus, ModelConfig::default());

    let sequential = predictor.predict_batch(&fixtures);
    let parallel = predictor.predict_batch_parallel(&fixtures);
    assert_eq!(sequential.len(), fixtures.len());
    assert_eq!(sequential, parallel);
    for (fixture, prediction) in fixtures.iter().zip(&sequential) {
        assert_eq!(prediction.home_team, fixture.home_team);
        assert_eq!(prediction.away_team, fixture.away_team);
        assert_eq!(prediction.bet_type == BetType::Unknown, !prediction.qualified());
    }
}

#[test]
fn walk_forward_accuracy_is_a_percentage() {
    let corpus = fixture_corpus();
    let fixtures = walk_forward_fixtures(&corpus);
    let predictor = Predictor::new(corpus, ModelConfig::default());
    let predictions = predictor.predict_batch(&fixtures);

    let tally = backtest::evaluate(&fixtures, &predictions);
    assert_eq!(tally.predictions, fixtures.len());
    assert!(tally.qualified > 0);
    assert!((0.0..=100.0).contains(&tally.accuracy()));
    let per_bet_total: usize = tally.per_bet.values().map(|c| c.total).sum();
    assert_eq!(per_bet_total, tally.overall.total);
}
