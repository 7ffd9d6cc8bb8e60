use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ModelConfig;
use crate::corpus::Match;
use crate::poisson::scoring_probability;
use crate::team_stats::{CategoryCounts, CategoryRatios};

/// Prior meetings of one exact pair, oriented on `home_team`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadToHeadProfile {
    pub home_team: String,
    pub away_team: String,
    pub sample_size: usize,
    /// `win`/`loss` are from `home_team`'s side; goal categories are symmetric.
    pub ratios: CategoryRatios,
    /// Goals per meeting by `home_team`, whichever venue.
    pub lambda_home_side: f64,
    pub lambda_away_side: f64,
    pub both_scored_probability: f64,
    pub reliable: bool,
}

pub fn build_head_to_head(
    history: &[Match],
    home: &str,
    away: &str,
    as_of: NaiveDate,
    config: &ModelConfig,
) -> HeadToHeadProfile {
    let mut counts = CategoryCounts::default();
    let mut home_side_goals = 0.0_f64;
    let mut away_side_goals = 0.0_f64;

    for m in history.iter().filter(|m| m.date < as_of && m.is_between(home, away)) {
        let Some((home_goals, away_goals)) = m.full_time() else {
            continue;
        };
        let (ours, theirs) = if m.home_team == home {
            (home_goals, away_goals)
        } else {
            (away_goals, home_goals)
        };
        counts.record(ours, theirs, m.half_time());
        home_side_goals += ours as f64;
        away_side_goals += theirs as f64;
    }

    let n = counts.len();
    let ratios = counts.ratios();
    let (lambda_home_side, lambda_away_side) = if n > 0 {
        (home_side_goals / n as f64, away_side_goals / n as f64)
    } else {
        (0.0, 0.0)
    };
    let modelled = scoring_probability(lambda_home_side) * scoring_probability(lambda_away_side);

    HeadToHeadProfile {
        home_team: home.to_string(),
        away_team: away.to_string(),
        sample_size: n,
        ratios,
        lambda_home_side,
        lambda_away_side,
        both_scored_probability: (0.5 * modelled + 0.5 * ratios.both_teams_scored).clamp(0.0, 1.0),
        reliable: n > config.thresholds.head_to_head_unreliable_max,
    }
}
