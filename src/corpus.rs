use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// football-data style exports mix ISO dates with day-first dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d/%m/%y"];

/// One historical (or scheduled) match fact. Goals are `None` until played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub league: String,
    #[serde(deserialize_with = "de_match_date")]
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_goals: Option<u8>,
    #[serde(default)]
    pub away_goals: Option<u8>,
    #[serde(default)]
    pub half_time_home_goals: Option<u8>,
    #[serde(default)]
    pub half_time_away_goals: Option<u8>,
}

impl Match {
    pub fn fixture(league: &str, date: NaiveDate, home: &str, away: &str) -> Self {
        Self {
            league: league.to_string(),
            date,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: None,
            away_goals: None,
            half_time_home_goals: None,
            half_time_away_goals: None,
        }
    }

    pub fn played(
        league: &str,
        date: NaiveDate,
        home: &str,
        away: &str,
        home_goals: u8,
        away_goals: u8,
    ) -> Self {
        Self {
            home_goals: Some(home_goals),
            away_goals: Some(away_goals),
            ..Self::fixture(league, date, home, away)
        }
    }

    pub fn with_half_time(mut self, home_goals: u8, away_goals: u8) -> Self {
        self.half_time_home_goals = Some(home_goals);
        self.half_time_away_goals = Some(away_goals);
        self
    }

    pub fn full_time(&self) -> Option<(u8, u8)> {
        match (self.home_goals, self.away_goals) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }

    pub fn half_time(&self) -> Option<(u8, u8)> {
        match (self.half_time_home_goals, self.half_time_away_goals) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.full_time().is_some()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// True when this is a meeting of exactly `a` and `b`, either venue.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.home_team == a && self.away_team == b) || (self.home_team == b && self.away_team == a)
    }

    pub fn has_known_date(&self) -> bool {
        self.date != NaiveDate::MIN
    }
}

/// Parses a match date. Anything unparsable becomes `NaiveDate::MIN`, which
/// sorts as the oldest possible match.
pub fn parse_match_date(raw: &str) -> NaiveDate {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date;
        }
    }
    // ISO timestamps ("2024-03-02T15:00:00Z") keep their date part.
    if let Some(prefix) = s.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return date;
    }
    warn!(raw = s, "unparsable match date, treating as oldest");
    NaiveDate::MIN
}

fn de_match_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_match_date(&raw))
}

/// First day of the season containing `as_of`.
pub fn season_start(as_of: NaiveDate, start_month: u32) -> NaiveDate {
    let month = start_month.clamp(1, 12);
    let Some(this_year) = NaiveDate::from_ymd_opt(as_of.year(), month, 1) else {
        return NaiveDate::MIN;
    };
    if as_of >= this_year {
        return this_year;
    }
    NaiveDate::from_ymd_opt(as_of.year() - 1, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Immutable, date-ordered match history shared by every prediction.
#[derive(Debug, Clone, Default)]
pub struct MatchCorpus {
    matches: Vec<Match>,
}

impl MatchCorpus {
    pub fn new(mut matches: Vec<Match>) -> Self {
        // Stable: same-day matches keep their source order.
        matches.sort_by(|a, b| a.date.cmp(&b.date));
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Every match dated strictly before `as_of`, oldest first.
    pub fn before(&self, as_of: NaiveDate) -> &[Match] {
        let idx = self.matches.partition_point(|m| m.date < as_of);
        &self.matches[..idx]
    }

    pub fn played(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.is_played())
    }

    pub fn teams(&self) -> BTreeSet<&str> {
        self.matches
            .iter()
            .flat_map(|m| [m.home_team.as_str(), m.away_team.as_str()])
            .collect()
    }

    pub fn contains_team(&self, team: &str) -> bool {
        self.matches.iter().any(|m| m.involves(team))
    }
}

pub fn load_matches_json(path: &Path) -> Result<Vec<Match>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read match file {}", path.display()))?;
    serde_json::from_str::<Vec<Match>>(&raw)
        .with_context(|| format!("parse match file {}", path.display()))
}

pub fn load_corpus_json(path: &Path) -> Result<MatchCorpus> {
    let matches = load_matches_json(path)?;
    let undated = matches.iter().filter(|m| !m.has_known_date()).count();
    if undated > 0 {
        warn!(undated, path = %path.display(), "matches without a usable date");
    }
    Ok(MatchCorpus::new(matches))
}
