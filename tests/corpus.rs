use std::path::Path;

use chrono::NaiveDate;
use goalline::corpus::{self, Match};

fn fixture_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/corpus.json"))
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn fixture_corpus_loads_with_mixed_date_formats() {
    let corpus = corpus::load_corpus_json(fixture_path()).expect("fixture corpus");
    assert_eq!(corpus.len(), 26);
    assert_eq!(corpus.played().count(), 25);
    assert_eq!(
        corpus.teams().into_iter().collect::<Vec<_>>(),
        vec!["Arsenal", "Brighton", "Chelsea", "Everton"]
    );

    // Day-first and ISO dates land on the same calendar.
    let opener = corpus
        .matches()
        .iter()
        .find(|m| m.home_team == "Arsenal" && m.away_team == "Brighton")
        .expect("opening fixture");
    assert_eq!(opener.date, d(2023, 8, 12));
}

#[test]
fn unparsable_date_sorts_as_oldest_history() {
    let corpus = corpus::load_corpus_json(fixture_path()).expect("fixture corpus");
    let first = &corpus.matches()[0];
    assert!(!first.has_known_date());
    assert_eq!(first.date, NaiveDate::MIN);

    let before_opener = corpus.before(d(2023, 8, 12));
    assert_eq!(before_opener.len(), 1);
    assert_eq!(before_opener[0].full_time(), Some((5, 0)));
}

#[test]
fn unplayed_fixture_is_kept_but_not_played() {
    let corpus = corpus::load_corpus_json(fixture_path()).expect("fixture corpus");
    let pending: Vec<&Match> = corpus.matches().iter().filter(|m| !m.is_played()).collect();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].date, d(2023, 11, 4));
    assert!(pending[0].is_between("Arsenal", "Chelsea"));
}

#[test]
fn missing_file_reports_path() {
    let err = corpus::load_matches_json(Path::new("does/not/exist.json")).unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.json"));
}
