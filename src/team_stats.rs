use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::corpus::{Match, season_start};
use crate::poisson::{blend, scoring_probability};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[default]
    Home,
    Away,
}

impl Venue {
    pub fn opposite(self) -> Self {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_goals(scored: u8, conceded: u8) -> Self {
        if scored > conceded {
            MatchResult::Win
        } else if scored < conceded {
            MatchResult::Loss
        } else {
            MatchResult::Draw
        }
    }
}

/// Share of matches meeting each condition, from the team's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryRatios {
    pub scored_games: f64,
    pub conceded_games: f64,
    pub zero_zero: f64,
    pub over_two_goals: f64,
    pub two_to_three_goals: f64,
    pub under_two_goals: f64,
    pub under_three_goals: f64,
    pub over_three_goals: f64,
    pub both_teams_scored: f64,
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
    /// Among matches with a known half-time score.
    pub half_time_goals: f64,
}

impl CategoryRatios {
    pub fn values(&self) -> [f64; 13] {
        [
            self.scored_games,
            self.conceded_games,
            self.zero_zero,
            self.over_two_goals,
            self.two_to_three_goals,
            self.under_two_goals,
            self.under_three_goals,
            self.over_three_goals,
            self.both_teams_scored,
            self.win,
            self.loss,
            self.draw,
            self.half_time_goals,
        ]
    }

    /// Weighted merge, normalised by the weight sum. Zero total weight yields zeros.
    pub fn weighted(parts: &[(CategoryRatios, f64)]) -> Self {
        let total: f64 = parts.iter().map(|(_, w)| w.max(0.0)).sum();
        let mut out = CategoryRatios::default();
        if total <= 0.0 {
            return out;
        }
        for (r, w) in parts {
            let w = w.max(0.0) / total;
            out.scored_games += w * r.scored_games;
            out.conceded_games += w * r.conceded_games;
            out.zero_zero += w * r.zero_zero;
            out.over_two_goals += w * r.over_two_goals;
            out.two_to_three_goals += w * r.two_to_three_goals;
            out.under_two_goals += w * r.under_two_goals;
            out.under_three_goals += w * r.under_three_goals;
            out.over_three_goals += w * r.over_three_goals;
            out.both_teams_scored += w * r.both_teams_scored;
            out.win += w * r.win;
            out.loss += w * r.loss;
            out.draw += w * r.draw;
            out.half_time_goals += w * r.half_time_goals;
        }
        out
    }
}

pub(crate) fn ratio(count: usize, size: usize) -> f64 {
    if size == 0 {
        0.0
    } else {
        count as f64 / size as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CategoryCounts {
    matches: usize,
    scored: usize,
    conceded: usize,
    zero_zero: usize,
    over_two: usize,
    two_to_three: usize,
    under_two: usize,
    under_three: usize,
    over_three: usize,
    both_scored: usize,
    win: usize,
    loss: usize,
    draw: usize,
    half_time_known: usize,
    half_time_goals: usize,
}

impl CategoryCounts {
    pub(crate) fn record(&mut self, scored: u8, conceded: u8, half_time: Option<(u8, u8)>) {
        let total = scored as u32 + conceded as u32;
        self.matches += 1;
        self.scored += usize::from(scored > 0);
        self.conceded += usize::from(conceded > 0);
        self.zero_zero += usize::from(total == 0);
        self.over_two += usize::from(total >= 3);
        self.two_to_three += usize::from((2..=3).contains(&total));
        self.under_two += usize::from(total <= 1);
        self.under_three += usize::from(total <= 2);
        self.over_three += usize::from(total >= 4);
        self.both_scored += usize::from(scored > 0 && conceded > 0);
        match MatchResult::from_goals(scored, conceded) {
            MatchResult::Win => self.win += 1,
            MatchResult::Loss => self.loss += 1,
            MatchResult::Draw => self.draw += 1,
        }
        if let Some((h, a)) = half_time {
            self.half_time_known += 1;
            self.half_time_goals += usize::from(h > 0 || a > 0);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.matches
    }

    pub(crate) fn ratios(&self) -> CategoryRatios {
        let n = self.matches;
        CategoryRatios {
            scored_games: ratio(self.scored, n),
            conceded_games: ratio(self.conceded, n),
            zero_zero: ratio(self.zero_zero, n),
            over_two_goals: ratio(self.over_two, n),
            two_to_three_goals: ratio(self.two_to_three, n),
            under_two_goals: ratio(self.under_two, n),
            under_three_goals: ratio(self.under_three, n),
            over_three_goals: ratio(self.over_three, n),
            both_teams_scored: ratio(self.both_scored, n),
            win: ratio(self.win, n),
            loss: ratio(self.loss, n),
            draw: ratio(self.draw, n),
            half_time_goals: ratio(self.half_time_goals, self.half_time_known),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GoalLambdas {
    pub scored_home: f64,
    pub scored_away: f64,
    pub scored_all: f64,
    pub conceded_home: f64,
    pub conceded_away: f64,
    pub conceded_all: f64,
}

impl GoalLambdas {
    pub fn scored_at(&self, venue: Venue) -> f64 {
        match venue {
            Venue::Home => self.scored_home,
            Venue::Away => self.scored_away,
        }
    }

    pub fn conceded_at(&self, venue: Venue) -> f64 {
        match venue {
            Venue::Home => self.conceded_home,
            Venue::Away => self.conceded_away,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowSizes {
    pub all_time: usize,
    pub season: usize,
    pub home: usize,
    pub away: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RecencyForm {
    /// Recency-weighted goals scored per match.
    pub scored: f64,
    pub conceded: f64,
    /// Scoring probability at the recency-weighted scoring rate. Printed by
    /// `predict --profiles`; the rules read the venue scoring powers instead.
    pub exponential_moving_average: f64,
    /// Recency-weighted scoring rate relative to the all-context rate.
    pub form_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LastThree {
    /// Newest first.
    pub results: Vec<MatchResult>,
    pub dominant: Option<MatchResult>,
    /// All three most recent matches ended the same way.
    pub unanimous: bool,
}

impl LastThree {
    fn from_results(results: Vec<MatchResult>) -> Self {
        let count = |r: MatchResult| results.iter().filter(|x| **x == r).count();
        let dominant = [MatchResult::Win, MatchResult::Draw, MatchResult::Loss]
            .into_iter()
            .find(|r| count(*r) * 2 > results.len());
        let unanimous = results.len() == 3 && dominant.is_some_and(|r| count(r) == 3);
        Self {
            results,
            dominant,
            unanimous,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamStatisticProfile {
    pub team: String,
    /// Which venue window was treated as the team's own venue.
    pub venue: Venue,
    pub windows: WindowSizes,
    pub ratios: CategoryRatios,
    pub lambdas: GoalLambdas,
    pub scoring_power_home: f64,
    pub scoring_power_away: f64,
    /// Probability of conceding, per venue. Profile output only.
    pub conceded_power_home: f64,
    pub conceded_power_away: f64,
    pub recency: RecencyForm,
    pub last_three: LastThree,
}

impl TeamStatisticProfile {
    pub fn sample_size(&self) -> usize {
        self.windows.all_time
    }

    pub fn has_history(&self) -> bool {
        self.windows.all_time > 0
    }

    pub fn scoring_power(&self, venue: Venue) -> f64 {
        match venue {
            Venue::Home => self.scoring_power_home,
            Venue::Away => self.scoring_power_away,
        }
    }

    pub fn own_scoring_power(&self) -> f64 {
        self.scoring_power(self.venue)
    }
}

/// A finished match seen from one team's side.
#[derive(Debug, Clone, Copy)]
struct TeamView {
    date: NaiveDate,
    venue: Venue,
    scored: u8,
    conceded: u8,
    half_time: Option<(u8, u8)>,
}

fn team_view(m: &Match, team: &str) -> Option<TeamView> {
    let (home_goals, away_goals) = m.full_time()?;
    let venue = if m.home_team == team {
        Venue::Home
    } else if m.away_team == team {
        Venue::Away
    } else {
        return None;
    };
    let (scored, conceded) = match venue {
        Venue::Home => (home_goals, away_goals),
        Venue::Away => (away_goals, home_goals),
    };
    Some(TeamView {
        date: m.date,
        venue,
        scored,
        conceded,
        half_time: m.half_time(),
    })
}

#[derive(Debug, Clone, Copy, Default)]
struct GoalSums {
    scored: f64,
    conceded: f64,
    n: usize,
}

impl GoalSums {
    fn add(&mut self, v: &TeamView) {
        self.scored += v.scored as f64;
        self.conceded += v.conceded as f64;
        self.n += 1;
    }

    fn scored_avg(&self) -> f64 {
        if self.n == 0 { 0.0 } else { self.scored / self.n as f64 }
    }

    fn conceded_avg(&self) -> f64 {
        if self.n == 0 { 0.0 } else { self.conceded / self.n as f64 }
    }
}

/// Builds the calibrated profile for `team` from matches dated strictly before `as_of`.
/// `venue` selects which venue window counts as the team's own.
pub fn build_team_profile(
    history: &[Match],
    team: &str,
    as_of: NaiveDate,
    venue: Venue,
    config: &ModelConfig,
) -> TeamStatisticProfile {
    let mut views: Vec<TeamView> = history
        .iter()
        .filter(|m| m.date < as_of)
        .filter_map(|m| team_view(m, team))
        .collect();
    views.sort_by_key(|v| v.date);

    let season_from = season_start(as_of, config.season_start_month);

    let mut all_time = CategoryCounts::default();
    let mut season = CategoryCounts::default();
    let mut home = CategoryCounts::default();
    let mut away = CategoryCounts::default();
    let mut goals_all = GoalSums::default();
    let mut goals_home = GoalSums::default();
    let mut goals_away = GoalSums::default();

    let decay = config.recency.decay_per_day;
    let mut weight_sum = 0.0_f64;
    let mut weighted_scored = 0.0_f64;
    let mut weighted_conceded = 0.0_f64;

    for v in &views {
        all_time.record(v.scored, v.conceded, v.half_time);
        goals_all.add(v);
        if v.date >= season_from {
            season.record(v.scored, v.conceded, v.half_time);
        }
        match v.venue {
            Venue::Home => {
                home.record(v.scored, v.conceded, v.half_time);
                goals_home.add(v);
            }
            Venue::Away => {
                away.record(v.scored, v.conceded, v.half_time);
                goals_away.add(v);
            }
        }

        let days = (as_of - v.date).num_days().max(0) as f64;
        let w = (-decay * days).exp();
        weight_sum += w;
        weighted_scored += w * v.scored as f64;
        weighted_conceded += w * v.conceded as f64;
    }

    let venue_counts = match venue {
        Venue::Home => &home,
        Venue::Away => &away,
    };
    let weights = config.windows;
    let ratios = CategoryRatios::weighted(&[
        (venue_counts.ratios(), weights.venue),
        (season.ratios(), weights.season),
        (all_time.ratios(), weights.all_time),
    ]);

    let lambdas = GoalLambdas {
        scored_home: goals_home.scored_avg(),
        scored_away: goals_away.scored_avg(),
        scored_all: goals_all.scored_avg(),
        conceded_home: goals_home.conceded_avg(),
        conceded_away: goals_away.conceded_avg(),
        conceded_all: goals_all.conceded_avg(),
    };
    let venue_blend = config.poisson.venue_blend;
    let power = |context: f64, all: f64| scoring_probability(blend(context, all, venue_blend));

    let (recent_scored, recent_conceded) = if weight_sum > 0.0 {
        (weighted_scored / weight_sum, weighted_conceded / weight_sum)
    } else {
        (0.0, 0.0)
    };
    let denominator = if lambdas.scored_all == 0.0 {
        config.recency.zero_lambda_placeholder
    } else {
        lambdas.scored_all
    };
    let recency = RecencyForm {
        scored: recent_scored,
        conceded: recent_conceded,
        exponential_moving_average: scoring_probability(recent_scored),
        form_ratio: recent_scored / denominator,
    };

    let last_three = LastThree::from_results(
        views
            .iter()
            .rev()
            .take(3)
            .map(|v| MatchResult::from_goals(v.scored, v.conceded))
            .collect(),
    );

    TeamStatisticProfile {
        team: team.to_string(),
        venue,
        windows: WindowSizes {
            all_time: all_time.len(),
            season: season.len(),
            home: home.len(),
            away: away.len(),
        },
        ratios,
        scoring_power_home: power(lambdas.scored_home, lambdas.scored_all),
        scoring_power_away: power(lambdas.scored_away, lambdas.scored_all),
        conceded_power_home: power(lambdas.conceded_home, lambdas.conceded_all),
        conceded_power_away: power(lambdas.conceded_away, lambdas.conceded_all),
        lambdas,
        recency,
        last_three,
    }
}
