use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BetType {
    OverTwoGoals,
    UnderThreeGoals,
    TwoToThreeGoals,
    BothTeamsScoreGoals,
    HomeWin,
    AwayWin,
    Unknown,
}

impl BetType {
    pub fn label(self) -> &'static str {
        match self {
            BetType::OverTwoGoals => "OverTwoGoals",
            BetType::UnderThreeGoals => "UnderThreeGoals",
            BetType::TwoToThreeGoals => "TwoToThreeGoals",
            BetType::BothTeamsScoreGoals => "BothTeamsScoreGoals",
            BetType::HomeWin => "HomeWin",
            BetType::AwayWin => "AwayWin",
            BetType::Unknown => "Unknown",
        }
    }

    /// Accepts the variant name or a short alias, case-insensitively.
    pub fn from_label(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        let bet = match key.as_str() {
            "overtwogoals" | "over2" | "over25" => BetType::OverTwoGoals,
            "underthreegoals" | "under3" | "under25" => BetType::UnderThreeGoals,
            "twotothreegoals" | "2to3" | "twotothree" => BetType::TwoToThreeGoals,
            "bothteamsscoregoals" | "btts" => BetType::BothTeamsScoreGoals,
            "homewin" | "home" | "1" => BetType::HomeWin,
            "awaywin" | "away" | "2" => BetType::AwayWin,
            _ => return None,
        };
        Some(bet)
    }

    /// Whether the bet won given the final score. `Unknown` never resolves.
    pub fn is_hit(self, home_goals: u8, away_goals: u8) -> Option<bool> {
        let total = home_goals as u32 + away_goals as u32;
        let hit = match self {
            BetType::OverTwoGoals => total >= 3,
            BetType::UnderThreeGoals => total <= 2,
            BetType::TwoToThreeGoals => (2..=3).contains(&total),
            BetType::BothTeamsScoreGoals => home_goals > 0 && away_goals > 0,
            BetType::HomeWin => home_goals > away_goals,
            BetType::AwayWin => away_goals > home_goals,
            BetType::Unknown => return None,
        };
        Some(hit)
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverrideReason {
    /// Too few meetings to ask the head-to-head record for consensus.
    HeadToHeadUnreliable,
    /// The head-to-head record disagreed and was bypassed.
    HeadToHeadDisagrees,
    /// Nothing else qualified.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason")]
pub enum Qualification {
    WithConsensus,
    WithOverride(OverrideReason),
    NotQualified,
}

impl Qualification {
    pub fn is_qualified(self) -> bool {
        !matches!(self, Qualification::NotQualified)
    }

    pub fn head_to_head_ignored(self) -> bool {
        matches!(
            self,
            Qualification::WithOverride(
                OverrideReason::HeadToHeadUnreliable | OverrideReason::HeadToHeadDisagrees
            )
        )
    }
}

/// One hypothesis's verdict, kept in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub bet_type: BetType,
    pub rule: &'static str,
    pub qualification: Qualification,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub bet_type: BetType,
    pub qualification: Qualification,
    /// Confidence in 0..=100.
    pub percentage: f64,
    /// The away side's figure for the same hypothesis, 0..=100.
    pub away_percentage: f64,
    /// The home side carries the hypothesis (always set for `HomeWin`).
    pub is_home: bool,
    /// The backed side's last three matches all ended the same way.
    pub risky: bool,
    pub message: String,
    pub notes: Vec<Note>,
}

impl Prediction {
    pub fn unknown(home: &str, away: &str, message: impl Into<String>) -> Self {
        Self {
            home_team: home.to_string(),
            away_team: away.to_string(),
            bet_type: BetType::Unknown,
            qualification: Qualification::NotQualified,
            percentage: 0.0,
            away_percentage: 0.0,
            is_home: false,
            risky: false,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn qualified(&self) -> bool {
        self.qualification.is_qualified()
    }

    pub fn head_to_head_ignored(&self) -> bool {
        self.qualification.head_to_head_ignored()
    }
}
