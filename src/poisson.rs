use serde::Serialize;

use crate::config::PoissonConfig;
use crate::team_stats::{TeamStatisticProfile, Venue};

/// Goals counted as "scoring"; mass above this folds into the last bucket.
pub const SCORING_MAX_GOALS: usize = 4;

/// Scoring probabilities for one specific match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoissonProbabilityPair {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub home: f64,
    pub away: f64,
    /// Both sides score, assuming independent scoring.
    pub total: f64,
    /// Normal-approximation P(total goals < threshold). Exploratory only.
    pub under_total: f64,
}

/// P(X = k) for k in 0..=max_k; the tail above `max_k` is added to the last bucket.
pub fn poisson_pmf(lambda: f64, max_k: usize) -> Vec<f64> {
    let mut out = vec![0.0; max_k + 1];
    let lambda = if lambda.is_finite() { lambda.max(0.0) } else { 0.0 };

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

/// Probability of scoring 1..=4 goals at rate `lambda`.
pub fn scoring_probability(lambda: f64) -> f64 {
    if !(lambda > 0.0) {
        return 0.0;
    }
    let pmf = poisson_pmf(lambda, SCORING_MAX_GOALS);
    pmf[1..].iter().sum::<f64>().clamp(0.0, 1.0)
}

/// `weight * primary + (1 - weight) * secondary`.
pub fn blend(primary: f64, secondary: f64, weight: f64) -> f64 {
    let w = weight.clamp(0.0, 1.0);
    w * primary + (1.0 - w) * secondary
}

/// Abramowitz-Stegun 7.1.26, |error| < 1.5e-7.
pub fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

pub fn normal_cdf(z: f64) -> f64 {
    (0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))).clamp(0.0, 1.0)
}

/// P(total < threshold) for total goals ~ Normal(mean, sqrt(mean)).
pub fn under_total_probability(mean: f64, threshold: f64) -> f64 {
    if !(mean > 0.0) {
        return if threshold > 0.0 { 1.0 } else { 0.0 };
    }
    normal_cdf((threshold - mean) / mean.sqrt())
}

pub fn match_probabilities(
    home: &TeamStatisticProfile,
    away: &TeamStatisticProfile,
    cfg: &PoissonConfig,
) -> PoissonProbabilityPair {
    let lambda_home = match_lambda(home, away, Venue::Home, cfg);
    let lambda_away = match_lambda(away, home, Venue::Away, cfg);
    let p_home = scoring_probability(lambda_home);
    let p_away = scoring_probability(lambda_away);

    PoissonProbabilityPair {
        lambda_home,
        lambda_away,
        home: p_home,
        away: p_away,
        total: (p_home * p_away).clamp(0.0, 1.0),
        under_total: under_total_probability(lambda_home + lambda_away, cfg.total_goals_threshold),
    }
}

fn match_lambda(
    side: &TeamStatisticProfile,
    opponent: &TeamStatisticProfile,
    venue: Venue,
    cfg: &PoissonConfig,
) -> f64 {
    let attack = blend(
        side.lambdas.scored_at(venue),
        side.lambdas.scored_all,
        cfg.venue_blend,
    );
    let defence = blend(
        opponent.lambdas.conceded_at(venue.opposite()),
        opponent.lambdas.conceded_all,
        cfg.venue_blend,
    );
    let lambda = blend(defence, attack, cfg.opponent_weight);
    if cfg.current_form {
        blend(lambda * side.recency.form_ratio, lambda, cfg.form_blend)
    } else {
        lambda
    }
}
