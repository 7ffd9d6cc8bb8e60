use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::corpus::{Match, MatchCorpus};
use crate::engine;
use crate::head_to_head::{HeadToHeadProfile, build_head_to_head};
use crate::poisson::{PoissonProbabilityPair, match_probabilities};
use crate::prediction::{BetType, Prediction};
use crate::rules::MatchContext;
use crate::team_stats::{TeamStatisticProfile, Venue, build_team_profile};

/// Request-scoped inputs for one fixture; built fresh per prediction.
#[derive(Debug, Clone, Serialize)]
pub struct MatchProfiles {
    pub home: TeamStatisticProfile,
    pub away: TeamStatisticProfile,
    pub head_to_head: HeadToHeadProfile,
    pub probabilities: PoissonProbabilityPair,
}

impl MatchProfiles {
    pub fn context(&self) -> MatchContext<'_> {
        MatchContext {
            home: &self.home,
            away: &self.away,
            head_to_head: &self.head_to_head,
            probabilities: &self.probabilities,
        }
    }
}

pub struct Predictor {
    corpus: MatchCorpus,
    config: ModelConfig,
}

impl Predictor {
    pub fn new(corpus: MatchCorpus, config: ModelConfig) -> Self {
        Self { corpus, config }
    }

    pub fn corpus(&self) -> &MatchCorpus {
        &self.corpus
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Profiles built only from matches dated strictly before `as_of`.
    pub fn profiles(&self, home: &str, away: &str, as_of: NaiveDate) -> MatchProfiles {
        let history = self.corpus.before(as_of);
        let cfg = &self.config;
        let home_profile = build_team_profile(history, home, as_of, Venue::Home, cfg);
        let away_profile = build_team_profile(history, away, as_of, Venue::Away, cfg);
        let head_to_head = build_head_to_head(history, home, away, as_of, cfg);
        let probabilities = match_probabilities(&home_profile, &away_profile, &cfg.poisson);
        MatchProfiles {
            home: home_profile,
            away: away_profile,
            head_to_head,
            probabilities,
        }
    }

    pub fn predict(
        &self,
        home: &str,
        away: &str,
        as_of: NaiveDate,
        filter: Option<BetType>,
    ) -> Prediction {
        let profiles = self.profiles(home, away, as_of);
        let missing = [&profiles.home, &profiles.away]
            .into_iter()
            .filter(|p| !p.has_history())
            .map(|p| p.team.as_str())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            debug!(home, away, %as_of, ?missing, "no finished history before kickoff");
            return Prediction::unknown(
                home,
                away,
                format!("no history before {as_of} for {}", missing.join(", ")),
            );
        }

        let prediction = engine::decide(&profiles.context(), filter, &self.config);
        debug!(
            home,
            away,
            %as_of,
            bet = %prediction.bet_type,
            status = ?prediction.qualification,
            percentage = prediction.percentage,
            h2h = profiles.head_to_head.sample_size,
            "prediction"
        );
        prediction
    }

    fn predict_fixture(&self, fixture: &Match) -> Prediction {
        self.predict(&fixture.home_team, &fixture.away_team, fixture.date, None)
    }

    pub fn predict_batch(&self, fixtures: &[Match]) -> Vec<Prediction> {
        fixtures.iter().map(|f| self.predict_fixture(f)).collect()
    }

    /// Same output and order as [`Predictor::predict_batch`].
    pub fn predict_batch_parallel(&self, fixtures: &[Match]) -> Vec<Prediction> {
        fixtures.par_iter().map(|f| self.predict_fixture(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn unknown_when_a_side_has_no_history() {
        let corpus = MatchCorpus::new(vec![Match::played("E0", d(2023, 8, 12), "A", "B", 1, 0)]);
        let predictor = Predictor::new(corpus, ModelConfig::default());

        let p = predictor.predict("A", "Z", d(2023, 9, 1), None);
        assert_eq!(p.bet_type, BetType::Unknown);
        assert!(!p.qualified());
        assert!(p.message.contains('Z'));

        // The only match is on kickoff day, so it is not history yet.
        let p = predictor.predict("A", "B", d(2023, 8, 12), None);
        assert_eq!(p.bet_type, BetType::Unknown);
    }

    #[test]
    fn profiles_ignore_same_day_and_later_matches() {
        let corpus = MatchCorpus::new(vec![
            Match::played("E0", d(2023, 8, 12), "A", "B", 1, 0),
            Match::played("E0", d(2023, 8, 19), "B", "A", 5, 5),
            Match::played("E0", d(2023, 8, 26), "A", "B", 4, 4),
        ]);
        let predictor = Predictor::new(corpus, ModelConfig::default());
        let profiles = predictor.profiles("A", "B", d(2023, 8, 19));
        assert_eq!(profiles.home.sample_size(), 1);
        assert_eq!(profiles.head_to_head.sample_size, 1);
        assert_eq!(profiles.home.ratios.over_two_goals, 0.0);
    }

    #[test]
    fn profiles_serialize_report_only_figures() {
        let corpus = MatchCorpus::new(vec![Match::played("E0", d(2023, 8, 12), "A", "B", 2, 1)]);
        let predictor = Predictor::new(corpus, ModelConfig::default());
        let profiles = predictor.profiles("A", "B", d(2023, 9, 1));
        let json = serde_json::to_value(&profiles).unwrap();
        assert!(json["home"]["recency"]["exponential_moving_average"].as_f64().unwrap() > 0.0);
        assert!(json["away"]["conceded_power_away"].as_f64().unwrap() > 0.0);
        assert_eq!(json["head_to_head"]["sample_size"], 1);
    }
}
