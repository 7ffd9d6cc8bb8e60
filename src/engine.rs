use crate::config::{DecisionThresholds, ModelConfig};
use crate::head_to_head::HeadToHeadProfile;
use crate::prediction::{BetType, Note, OverrideReason, Prediction, Qualification};
use crate::rules::{self, Category, Hypothesis, MatchContext, Verdict};
use crate::team_stats::TeamStatisticProfile;

/// Outcome of running one hypothesis's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub bet_type: BetType,
    pub rule: &'static str,
    pub qualification: Qualification,
}

pub fn evaluate(hypothesis: &Hypothesis, ctx: &MatchContext<'_>, t: &DecisionThresholds) -> Evaluation {
    let Some(rule) = hypothesis.first_match(ctx, t) else {
        return Evaluation {
            bet_type: hypothesis.bet_type,
            rule: "no rule matched",
            qualification: Qualification::NotQualified,
        };
    };
    let qualification = match rule.verdict {
        Verdict::Reject => Qualification::NotQualified,
        Verdict::Accept => Qualification::WithConsensus,
        Verdict::AcceptBypassingHeadToHead => {
            bypass_qualification(ctx.head_to_head, hypothesis.category, t)
        }
    };
    Evaluation {
        bet_type: hypothesis.bet_type,
        rule: rule.name,
        qualification,
    }
}

fn bypass_qualification(
    h2h: &HeadToHeadProfile,
    category: Category,
    t: &DecisionThresholds,
) -> Qualification {
    if !h2h.reliable {
        Qualification::WithOverride(OverrideReason::HeadToHeadUnreliable)
    } else if category(&h2h.ratios) >= t.head_to_head_gate {
        Qualification::WithConsensus
    } else {
        Qualification::WithOverride(OverrideReason::HeadToHeadDisagrees)
    }
}

/// Picks exactly one qualified prediction. `filter` restricts the cascade to a
/// single bet type; the under-three fallback applies either way.
pub fn decide(ctx: &MatchContext<'_>, filter: Option<BetType>, config: &ModelConfig) -> Prediction {
    let t = &config.thresholds;
    let candidates: Vec<BetType> = match filter {
        Some(bet) if bet != BetType::Unknown => vec![bet],
        _ => rules::SELECTION_ORDER.to_vec(),
    };

    let mut notes = Vec::with_capacity(candidates.len() + 1);
    let mut chosen: Option<Evaluation> = None;
    for bet in candidates {
        let Some(hypothesis) = rules::hypothesis(bet) else {
            continue;
        };
        let eval = evaluate(&hypothesis, ctx, t);
        notes.push(note_for(&eval, ctx));
        if eval.qualification.is_qualified() {
            chosen = Some(eval);
            break;
        }
    }

    let chosen = match chosen {
        Some(eval) => eval,
        None => fallback(ctx, t, &mut notes),
    };

    let (percentage, away_percentage, is_home) = confidence(chosen.bet_type, ctx, config);
    let risky = match chosen.bet_type {
        BetType::HomeWin => ctx.home.last_three.unanimous,
        BetType::AwayWin => ctx.away.last_three.unanimous,
        _ => false,
    };
    let message = notes
        .iter()
        .rev()
        .find(|n| n.bet_type == chosen.bet_type)
        .map(|n| n.text.clone())
        .unwrap_or_default();

    Prediction {
        home_team: ctx.home.team.clone(),
        away_team: ctx.away.team.clone(),
        bet_type: chosen.bet_type,
        qualification: chosen.qualification,
        percentage,
        away_percentage,
        is_home,
        risky,
        message,
        notes,
    }
}

fn fallback(ctx: &MatchContext<'_>, t: &DecisionThresholds, notes: &mut Vec<Note>) -> Evaluation {
    let already = notes.iter().any(|n| n.bet_type == rules::FALLBACK);
    let hypothesis = rules::hypothesis(rules::FALLBACK);
    let own = match (already, hypothesis) {
        (false, Some(h)) => {
            let eval = evaluate(&h, ctx, t);
            notes.push(note_for(&eval, ctx));
            Some(eval)
        }
        _ => None,
    };
    if let Some(eval) = own
        && eval.qualification.is_qualified()
    {
        return eval;
    }

    let eval = Evaluation {
        bet_type: rules::FALLBACK,
        rule: "fallback",
        qualification: Qualification::WithOverride(OverrideReason::Fallback),
    };
    notes.push(note_for(&eval, ctx));
    eval
}

fn note_for(eval: &Evaluation, ctx: &MatchContext<'_>) -> Note {
    let status = match eval.qualification {
        Qualification::WithConsensus => "qualified".to_string(),
        Qualification::WithOverride(reason) => format!("qualified, override {reason:?}"),
        Qualification::NotQualified => "not qualified".to_string(),
    };
    let mut text = format!("{}: {} ({status})", eval.bet_type, eval.rule);
    if eval.qualification.is_qualified() {
        let backed = match eval.bet_type {
            BetType::HomeWin => Some(ctx.home),
            BetType::AwayWin => Some(ctx.away),
            _ => None,
        };
        if let Some(side) = backed
            && side.last_three.unanimous
            && let Some(result) = side.last_three.dominant
        {
            text.push_str(&format!("; risky, last three {result:?}"));
        }
    }
    Note {
        bet_type: eval.bet_type,
        rule: eval.rule,
        qualification: eval.qualification,
        text,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn win_figure(p_scores: f64, side: &TeamStatisticProfile, opponent: &TeamStatisticProfile) -> f64 {
    0.5 * p_scores + 0.25 * side.ratios.win + 0.25 * opponent.ratios.loss
}

/// `(percentage, away_percentage, is_home)` for the chosen hypothesis.
fn confidence(bet: BetType, ctx: &MatchContext<'_>, config: &ModelConfig) -> (f64, f64, bool) {
    let h2h = ctx.head_to_head;
    let pair = ctx.probabilities;
    let category_blend = |home: f64, away: f64, h2h_value: f64| {
        let value = if h2h.reliable {
            mean(&[home, away, h2h_value])
        } else {
            mean(&[home, away])
        };
        (value, away, home >= away)
    };

    let (value, away_value, is_home) = match bet {
        BetType::OverTwoGoals => category_blend(
            ctx.home.ratios.over_two_goals,
            ctx.away.ratios.over_two_goals,
            h2h.ratios.over_two_goals,
        ),
        BetType::BothTeamsScoreGoals => category_blend(
            ctx.home.ratios.both_teams_scored,
            ctx.away.ratios.both_teams_scored,
            h2h.both_scored_probability,
        ),
        BetType::TwoToThreeGoals => category_blend(
            ctx.home.ratios.two_to_three_goals,
            ctx.away.ratios.two_to_three_goals,
            h2h.ratios.two_to_three_goals,
        ),
        BetType::UnderThreeGoals => {
            let w = config.under_three.for_sample(h2h.sample_size);
            let category = mean(&[
                ctx.home.ratios.under_three_goals,
                ctx.away.ratios.under_three_goals,
            ]);
            let total_weight = (w.scoring + w.category + w.head_to_head).max(1e-9);
            let value = (w.scoring * (1.0 - pair.total)
                + w.category * category
                + w.head_to_head * h2h.ratios.under_three_goals)
                / total_weight;
            let away = ctx.away.ratios.under_three_goals;
            (value, away, ctx.home.ratios.under_three_goals >= away)
        }
        BetType::HomeWin => {
            let home = win_figure(pair.home, ctx.home, ctx.away);
            (home, win_figure(pair.away, ctx.away, ctx.home), true)
        }
        BetType::AwayWin => {
            let away = win_figure(pair.away, ctx.away, ctx.home);
            (away, away, false)
        }
        BetType::Unknown => (0.0, 0.0, false),
    };

    (
        (value * 100.0).clamp(0.0, 100.0),
        (away_value * 100.0).clamp(0.0, 100.0),
        is_home,
    )
}
