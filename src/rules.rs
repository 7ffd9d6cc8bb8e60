//! Ordered rule tables, one per hypothesis.
//!
//! A table is scanned top to bottom and the first rule whose predicate holds
//! decides the hypothesis. Thresholds come from [`DecisionThresholds`], never
//! from literals in the predicates.

use crate::config::DecisionThresholds;
use crate::head_to_head::HeadToHeadProfile;
use crate::poisson::PoissonProbabilityPair;
use crate::prediction::BetType;
use crate::team_stats::{CategoryRatios, TeamStatisticProfile};

/// Everything the engine knows about one match.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub home: &'a TeamStatisticProfile,
    pub away: &'a TeamStatisticProfile,
    pub head_to_head: &'a HeadToHeadProfile,
    pub probabilities: &'a PoissonProbabilityPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Reject,
    /// Qualifies with consensus; any head-to-head gate is part of the predicate.
    Accept,
    /// Qualifies; the head-to-head record is consulted only for the consensus tag.
    AcceptBypassingHeadToHead,
}

/// Selects the category a hypothesis is about.
pub type Category = fn(&CategoryRatios) -> f64;

pub type Predicate = fn(&MatchContext<'_>, &DecisionThresholds, Category) -> bool;

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub when: Predicate,
    pub verdict: Verdict,
}

#[derive(Clone, Copy)]
pub struct Hypothesis {
    pub bet_type: BetType,
    pub category: Category,
    pub rules: &'static [Rule],
}

impl Hypothesis {
    pub fn first_match(&self, ctx: &MatchContext<'_>, t: &DecisionThresholds) -> Option<&'static Rule> {
        self.rules.iter().find(|rule| (rule.when)(ctx, t, self.category))
    }
}

/// Evaluation order; the last entry is the fallback.
pub const SELECTION_ORDER: [BetType; 6] = [
    BetType::OverTwoGoals,
    BetType::BothTeamsScoreGoals,
    BetType::TwoToThreeGoals,
    BetType::HomeWin,
    BetType::AwayWin,
    BetType::UnderThreeGoals,
];

pub const FALLBACK: BetType = BetType::UnderThreeGoals;

pub fn hypothesis(bet_type: BetType) -> Option<Hypothesis> {
    let (category, rules): (Category, &'static [Rule]) = match bet_type {
        BetType::OverTwoGoals => (over_two as Category, GOAL_RULES),
        BetType::BothTeamsScoreGoals => (both_scored as Category, GOAL_RULES),
        BetType::TwoToThreeGoals => (two_to_three as Category, TWO_TO_THREE_RULES),
        BetType::UnderThreeGoals => (under_three as Category, UNDER_THREE_RULES),
        BetType::HomeWin => (win as Category, HOME_WIN_RULES),
        BetType::AwayWin => (loss as Category, AWAY_WIN_RULES),
        BetType::Unknown => return None,
    };
    Some(Hypothesis {
        bet_type,
        category,
        rules,
    })
}

pub const GOAL_RULES: &[Rule] = &[
    Rule {
        name: "scoring floor",
        when: both_below_scoring_floor,
        verdict: Verdict::Reject,
    },
    Rule {
        name: "strict consensus",
        when: strict_tier,
        verdict: Verdict::Accept,
    },
    Rule {
        name: "relaxed home lead",
        when: relaxed_home_lead,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
    Rule {
        name: "relaxed away lead",
        when: relaxed_away_lead,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
];

pub const TWO_TO_THREE_RULES: &[Rule] = &[
    Rule {
        name: "head-to-head two-to-three record",
        when: head_to_head_two_to_three,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
    Rule {
        name: "both sides high scoring",
        when: both_high_scoring,
        verdict: Verdict::Reject,
    },
    Rule {
        name: "strict consensus",
        when: strict_tier,
        verdict: Verdict::Accept,
    },
    Rule {
        name: "relaxed home lead",
        when: relaxed_home_lead,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
    Rule {
        name: "relaxed away lead",
        when: relaxed_away_lead,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
];

pub const UNDER_THREE_RULES: &[Rule] = &[
    Rule {
        name: "both sides concede four-goal games",
        when: both_over_three_heavy,
        verdict: Verdict::Reject,
    },
    Rule {
        name: "under-two strict ladder",
        when: under_two_strict,
        verdict: Verdict::Accept,
    },
    Rule {
        name: "under-two loose ladder",
        when: under_two_loose,
        verdict: Verdict::AcceptBypassingHeadToHead,
    },
];

pub const HOME_WIN_RULES: &[Rule] = &[
    Rule {
        name: "both sides unlikely to score",
        when: both_win_scoring_low,
        verdict: Verdict::Reject,
    },
    Rule {
        name: "home side stronger",
        when: home_dominant,
        verdict: Verdict::Accept,
    },
];

pub const AWAY_WIN_RULES: &[Rule] = &[
    Rule {
        name: "both sides unlikely to score",
        when: both_win_scoring_low,
        verdict: Verdict::Reject,
    },
    Rule {
        name: "away side stronger",
        when: away_dominant,
        verdict: Verdict::Accept,
    },
];

fn over_two(r: &CategoryRatios) -> f64 {
    r.over_two_goals
}

fn both_scored(r: &CategoryRatios) -> f64 {
    r.both_teams_scored
}

fn two_to_three(r: &CategoryRatios) -> f64 {
    r.two_to_three_goals
}

fn under_three(r: &CategoryRatios) -> f64 {
    r.under_three_goals
}

fn win(r: &CategoryRatios) -> f64 {
    r.win
}

// Head-to-head ratios are oriented on the home side, so an away win is a loss.
fn loss(r: &CategoryRatios) -> f64 {
    r.loss
}

/// Category, scored-games and conceded-games averages all clear `gate`.
pub fn passes_profile_gates(p: &TeamStatisticProfile, category: Category, gate: f64) -> bool {
    category(&p.ratios) >= gate && p.ratios.scored_games >= gate && p.ratios.conceded_games >= gate
}

/// Satisfied by a small sample or by a head-to-head average at the gate.
pub fn head_to_head_gate(h2h: &HeadToHeadProfile, category: Category, t: &DecisionThresholds) -> bool {
    !h2h.reliable || category(&h2h.ratios) >= t.head_to_head_gate
}

fn both_pass_profile_gates(ctx: &MatchContext<'_>, category: Category, gate: f64) -> bool {
    passes_profile_gates(ctx.home, category, gate) && passes_profile_gates(ctx.away, category, gate)
}

fn both_below_scoring_floor(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    ctx.home.own_scoring_power() <= t.scoring_floor && ctx.away.own_scoring_power() <= t.scoring_floor
}

fn strict_tier(ctx: &MatchContext<'_>, t: &DecisionThresholds, category: Category) -> bool {
    ctx.home.own_scoring_power() >= t.strict_gate
        && ctx.away.own_scoring_power() >= t.strict_gate
        && both_pass_profile_gates(ctx, category, t.strict_gate)
        && head_to_head_gate(ctx.head_to_head, category, t)
}

fn relaxed_home_lead(ctx: &MatchContext<'_>, t: &DecisionThresholds, category: Category) -> bool {
    ctx.home.own_scoring_power() >= t.strong_gate
        && ctx.away.own_scoring_power() >= t.relaxed_floor
        && both_pass_profile_gates(ctx, category, t.strict_gate)
}

fn relaxed_away_lead(ctx: &MatchContext<'_>, t: &DecisionThresholds, category: Category) -> bool {
    ctx.away.own_scoring_power() >= t.strong_gate
        && ctx.home.own_scoring_power() >= t.relaxed_floor
        && both_pass_profile_gates(ctx, category, t.strict_gate)
}

fn head_to_head_two_to_three(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    let tails_capped = |p: &TeamStatisticProfile| {
        p.ratios.over_three_goals <= t.two_three_tail_cap && p.ratios.under_two_goals <= t.two_three_tail_cap
    };
    ctx.head_to_head.ratios.two_to_three_goals > t.two_three_head_to_head
        && tails_capped(ctx.home)
        && tails_capped(ctx.away)
        && ctx.probabilities.total < t.two_three_low_scoring
}

fn both_high_scoring(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    ctx.home.own_scoring_power() >= t.high_scoring_power
        && ctx.away.own_scoring_power() >= t.high_scoring_power
}

fn both_over_three_heavy(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    ctx.home.ratios.over_three_goals >= t.under_over_three_block
        && ctx.away.ratios.over_three_goals >= t.under_over_three_block
}

fn under_two_strict(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    let h2h = ctx.head_to_head;
    ctx.home.ratios.under_two_goals >= t.under_strict
        && ctx.away.ratios.under_two_goals >= t.under_strict
        && (!h2h.reliable || h2h.ratios.under_two_goals >= t.under_strict)
}

fn under_two_loose(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    let h2h = ctx.head_to_head;
    ctx.home.ratios.under_two_goals >= t.under_loose
        || ctx.away.ratios.under_two_goals >= t.under_loose
        || (h2h.reliable && h2h.ratios.under_two_goals >= t.under_loose)
}

fn both_win_scoring_low(ctx: &MatchContext<'_>, t: &DecisionThresholds, _: Category) -> bool {
    ctx.probabilities.home <= t.win_scoring_floor && ctx.probabilities.away <= t.win_scoring_floor
}

fn home_dominant(ctx: &MatchContext<'_>, _: &DecisionThresholds, _: Category) -> bool {
    ctx.probabilities.home > ctx.probabilities.away
        && ctx.home.own_scoring_power() > ctx.away.own_scoring_power()
}

fn away_dominant(ctx: &MatchContext<'_>, _: &DecisionThresholds, _: Category) -> bool {
    ctx.probabilities.away > ctx.probabilities.home
        && ctx.away.own_scoring_power() > ctx.home.own_scoring_power()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team_stats::Venue;

    fn side(venue: Venue, power: f64, ratios: CategoryRatios) -> TeamStatisticProfile {
        TeamStatisticProfile {
            venue,
            scoring_power_home: power,
            scoring_power_away: power,
            ratios,
            ..Default::default()
        }
    }

    fn open_game() -> CategoryRatios {
        CategoryRatios {
            scored_games: 0.8,
            conceded_games: 0.7,
            over_two_goals: 0.65,
            both_teams_scored: 0.6,
            ..Default::default()
        }
    }

    fn first_rule(bet: BetType, ctx: &MatchContext<'_>) -> Option<&'static str> {
        hypothesis(bet)
            .and_then(|h| h.first_match(ctx, &DecisionThresholds::default()))
            .map(|r| r.name)
    }

    #[test]
    fn selection_order_ends_with_fallback() {
        assert_eq!(SELECTION_ORDER[0], BetType::OverTwoGoals);
        assert_eq!(SELECTION_ORDER.last(), Some(&FALLBACK));
        assert!(hypothesis(BetType::Unknown).is_none());
    }

    #[test]
    fn scoring_floor_precedes_everything() {
        let home = side(Venue::Home, 0.28, open_game());
        let away = side(Venue::Away, 0.10, open_game());
        let h2h = HeadToHeadProfile::default();
        let pair = PoissonProbabilityPair::default();
        let ctx = MatchContext {
            home: &home,
            away: &away,
            head_to_head: &h2h,
            probabilities: &pair,
        };
        assert_eq!(first_rule(BetType::OverTwoGoals, &ctx), Some("scoring floor"));
        assert_eq!(first_rule(BetType::BothTeamsScoreGoals, &ctx), Some("scoring floor"));
    }

    #[test]
    fn strict_tier_needs_head_to_head_agreement_when_reliable() {
        let home = side(Venue::Home, 0.7, open_game());
        let away = side(Venue::Away, 0.55, open_game());
        let mut h2h = HeadToHeadProfile {
            sample_size: 4,
            reliable: true,
            ..Default::default()
        };
        h2h.ratios.over_two_goals = 0.25;
        let pair = PoissonProbabilityPair::default();
        let ctx = MatchContext {
            home: &home,
            away: &away,
            head_to_head: &h2h,
            probabilities: &pair,
        };
        // Disagreeing record: strict fails, home lead carries it.
        assert_eq!(first_rule(BetType::OverTwoGoals, &ctx), Some("relaxed home lead"));

        let agreeing = HeadToHeadProfile {
            ratios: CategoryRatios {
                over_two_goals: 0.5,
                ..Default::default()
            },
            ..h2h.clone()
        };
        let ctx = MatchContext {
            head_to_head: &agreeing,
            ..ctx
        };
        assert_eq!(first_rule(BetType::OverTwoGoals, &ctx), Some("strict consensus"));
    }

    #[test]
    fn profile_gates_check_all_three_averages() {
        let mut ratios = open_game();
        assert!(passes_profile_gates(&side(Venue::Home, 0.6, ratios), over_two, 0.5));
        ratios.conceded_games = 0.49;
        assert!(!passes_profile_gates(&side(Venue::Home, 0.6, ratios), over_two, 0.5));
    }

    #[test]
    fn two_to_three_record_overrides_high_scoring_block() {
        let tame = CategoryRatios {
            over_three_goals: 0.2,
            under_two_goals: 0.3,
            ..Default::default()
        };
        let home = side(Venue::Home, 0.75, tame);
        let away = side(Venue::Away, 0.72, tame);
        let h2h = HeadToHeadProfile {
            sample_size: 5,
            reliable: true,
            ratios: CategoryRatios {
                two_to_three_goals: 0.8,
                ..Default::default()
            },
            ..Default::default()
        };
        let pair = PoissonProbabilityPair {
            total: 0.25,
            ..Default::default()
        };
        let ctx = MatchContext {
            home: &home,
            away: &away,
            head_to_head: &h2h,
            probabilities: &pair,
        };
        assert_eq!(
            first_rule(BetType::TwoToThreeGoals, &ctx),
            Some("head-to-head two-to-three record")
        );

        let busy = PoissonProbabilityPair { total: 0.45, ..pair };
        let ctx = MatchContext {
            probabilities: &busy,
            ..ctx
        };
        assert_eq!(first_rule(BetType::TwoToThreeGoals, &ctx), Some("both sides high scoring"));
    }

    #[test]
    fn under_three_ladder() {
        let heavy = CategoryRatios {
            over_three_goals: 0.4,
            under_two_goals: 0.9,
            ..Default::default()
        };
        let h2h = HeadToHeadProfile::default();
        let pair = PoissonProbabilityPair::default();
        let home = side(Venue::Home, 0.5, heavy);
        let away = side(Venue::Away, 0.5, heavy);
        let ctx = MatchContext {
            home: &home,
            away: &away,
            head_to_head: &h2h,
            probabilities: &pair,
        };
        assert_eq!(
            first_rule(BetType::UnderThreeGoals, &ctx),
            Some("both sides concede four-goal games")
        );

        let tight = CategoryRatios {
            under_two_goals: 0.6,
            ..Default::default()
        };
        let loose_home = CategoryRatios {
            under_two_goals: 0.85,
            ..Default::default()
        };
        let home = side(Venue::Home, 0.5, tight);
        let away = side(Venue::Away, 0.5, tight);
        let ctx = MatchContext {
            home: &home,
            away: &away,
            ..ctx
        };
        assert_eq!(first_rule(BetType::UnderThreeGoals, &ctx), Some("under-two strict ladder"));

        let home = side(Venue::Home, 0.5, loose_home);
        let away = side(Venue::Away, 0.5, CategoryRatios::default());
        let ctx = MatchContext {
            home: &home,
            away: &away,
            ..ctx
        };
        assert_eq!(first_rule(BetType::UnderThreeGoals, &ctx), Some("under-two loose ladder"));
    }

    #[test]
    fn win_rules_need_both_edges() {
        let home = side(Venue::Home, 0.7, CategoryRatios::default());
        let away = side(Venue::Away, 0.4, CategoryRatios::default());
        let h2h = HeadToHeadProfile::default();
        let pair = PoissonProbabilityPair {
            home: 0.7,
            away: 0.5,
            ..Default::default()
        };
        let ctx = MatchContext {
            home: &home,
            away: &away,
            head_to_head: &h2h,
            probabilities: &pair,
        };
        assert_eq!(first_rule(BetType::HomeWin, &ctx), Some("home side stronger"));
        assert_eq!(first_rule(BetType::AwayWin, &ctx), None);

        let low = PoissonProbabilityPair {
            home: 0.3,
            away: 0.2,
            ..Default::default()
        };
        let ctx = MatchContext {
            probabilities: &low,
            ..ctx
        };
        assert_eq!(first_rule(BetType::HomeWin, &ctx), Some("both sides unlikely to score"));
    }
}
