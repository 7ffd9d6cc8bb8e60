use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(
        "window weights must be non-negative with a positive sum (venue={venue}, season={season}, all_time={all_time})"
    )]
    WindowWeights {
        venue: f64,
        season: f64,
        all_time: f64,
    },
    #[error("`{name}` must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("season start month must be 1..=12, got {0}")]
    SeasonStartMonth(u32),
    #[error("recency decay must be finite and non-negative, got {0}")]
    Decay(f64),
    #[error("zero-lambda placeholder must be positive, got {0}")]
    Placeholder(f64),
}

/// Weights used to merge the venue, season and all-time windows into one profile.
/// They are normalised by their sum when applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowWeights {
    pub venue: f64,
    pub season: f64,
    pub all_time: f64,
}

impl Default for WindowWeights {
    fn default() -> Self {
        Self {
            venue: 0.50,
            season: 0.30,
            all_time: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyConfig {
    /// `w = exp(-decay_per_day * days_since_match)`.
    pub decay_per_day: f64,
    /// Denominator of the form ratio when a team's own scoring lambda is 0.
    pub zero_lambda_placeholder: f64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            decay_per_day: 0.005,
            zero_lambda_placeholder: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonConfig {
    /// Share of the venue lambda when blending it with the all-context lambda.
    pub venue_blend: f64,
    /// Share of the opponent's conceded lambda in a side's match lambda. 0 keeps
    /// the plain venue/all-context blend.
    pub opponent_weight: f64,
    pub current_form: bool,
    /// Share of the recency-adjusted lambda in current-form mode.
    pub form_blend: f64,
    /// Total-goals line for the Normal-approximation estimator.
    pub total_goals_threshold: f64,
}

impl Default for PoissonConfig {
    fn default() -> Self {
        Self {
            venue_blend: 0.50,
            opponent_weight: 0.0,
            current_form: false,
            form_blend: 0.50,
            total_goals_threshold: 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub scoring_floor: f64,
    pub strict_gate: f64,
    pub strong_gate: f64,
    pub relaxed_floor: f64,
    pub head_to_head_gate: f64,
    /// Meetings at or below this count make a head-to-head profile unreliable.
    pub head_to_head_unreliable_max: usize,
    pub high_scoring_power: f64,
    pub two_three_head_to_head: f64,
    pub two_three_tail_cap: f64,
    pub two_three_low_scoring: f64,
    pub under_over_three_block: f64,
    pub under_strict: f64,
    pub under_loose: f64,
    pub win_scoring_floor: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            scoring_floor: 0.28,
            strict_gate: 0.50,
            strong_gate: 0.60,
            relaxed_floor: 0.30,
            head_to_head_gate: 0.50,
            head_to_head_unreliable_max: 2,
            high_scoring_power: 0.70,
            two_three_head_to_head: 0.60,
            two_three_tail_cap: 0.34,
            two_three_low_scoring: 0.30,
            under_over_three_block: 0.40,
            under_strict: 0.59,
            under_loose: 0.80,
            win_scoring_floor: 0.30,
        }
    }
}

impl DecisionThresholds {
    fn unit_fields(&self) -> [(&'static str, f64); 13] {
        [
            ("scoring_floor", self.scoring_floor),
            ("strict_gate", self.strict_gate),
            ("strong_gate", self.strong_gate),
            ("relaxed_floor", self.relaxed_floor),
            ("head_to_head_gate", self.head_to_head_gate),
            ("high_scoring_power", self.high_scoring_power),
            ("two_three_head_to_head", self.two_three_head_to_head),
            ("two_three_tail_cap", self.two_three_tail_cap),
            ("two_three_low_scoring", self.two_three_low_scoring),
            ("under_over_three_block", self.under_over_three_block),
            ("under_strict", self.under_strict),
            ("under_loose", self.under_loose),
            ("win_scoring_floor", self.win_scoring_floor),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub scoring: f64,
    pub category: f64,
    pub head_to_head: f64,
}

/// Confidence blend for the under-three-goals fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderThreeWeights {
    pub sparse: BlendWeights,
    pub rich: BlendWeights,
    /// Head-to-head sample size from which `rich` applies.
    pub rich_from_sample: usize,
}

impl Default for UnderThreeWeights {
    fn default() -> Self {
        Self {
            sparse: BlendWeights {
                scoring: 0.45,
                category: 0.45,
                head_to_head: 0.10,
            },
            rich: BlendWeights {
                scoring: 0.30,
                category: 0.30,
                head_to_head: 0.40,
            },
            rich_from_sample: 2,
        }
    }
}

impl UnderThreeWeights {
    pub fn for_sample(&self, head_to_head_sample: usize) -> BlendWeights {
        if head_to_head_sample >= self.rich_from_sample {
            self.rich
        } else {
            self.sparse
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub season_start_month: u32,
    pub windows: WindowWeights,
    pub recency: RecencyConfig,
    pub poisson: PoissonConfig,
    pub thresholds: DecisionThresholds,
    pub under_three: UnderThreeWeights,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            season_start_month: 7,
            windows: WindowWeights::default(),
            recency: RecencyConfig::default(),
            poisson: PoissonConfig::default(),
            thresholds: DecisionThresholds::default(),
            under_three: UnderThreeWeights::default(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let w = self.windows;
        let weights_ok = [w.venue, w.season, w.all_time]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
            && (w.venue + w.season + w.all_time) > 0.0;
        if !weights_ok {
            return Err(ConfigError::WindowWeights {
                venue: w.venue,
                season: w.season,
                all_time: w.all_time,
            });
        }
        if !(1..=12).contains(&self.season_start_month) {
            return Err(ConfigError::SeasonStartMonth(self.season_start_month));
        }
        let decay = self.recency.decay_per_day;
        if !decay.is_finite() || decay < 0.0 {
            return Err(ConfigError::Decay(decay));
        }
        let placeholder = self.recency.zero_lambda_placeholder;
        if !(placeholder.is_finite() && placeholder > 0.0) {
            return Err(ConfigError::Placeholder(placeholder));
        }

        let blends = [
            ("poisson.venue_blend", self.poisson.venue_blend),
            ("poisson.opponent_weight", self.poisson.opponent_weight),
            ("poisson.form_blend", self.poisson.form_blend),
        ];
        for (name, value) in blends.into_iter().chain(self.thresholds.unit_fields()) {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read model config {}", path.display()))?;
        let cfg: ModelConfig = serde_json::from_str(&raw).context("parse model config")?;
        cfg.validate()
            .with_context(|| format!("invalid model config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize model config")?;
        fs::write(&tmp, json).context("write model config")?;
        fs::rename(&tmp, path).context("swap model config")?;
        Ok(())
    }

    /// Applies `GOALLINE_*` environment overrides; malformed values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(decay) = env_f64("GOALLINE_DECAY_PER_DAY") {
            self.recency.decay_per_day = decay.clamp(0.0, 1.0);
        }
        if let Some(month) = std::env::var("GOALLINE_SEASON_START_MONTH")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
        {
            self.season_start_month = month.clamp(1, 12);
        }
        if let Ok(raw) = std::env::var("GOALLINE_CURRENT_FORM") {
            match parse_bool(&raw) {
                Some(on) => self.poisson.current_form = on,
                None => warn!(value = raw.as_str(), "ignoring GOALLINE_CURRENT_FORM"),
            }
        }
        self
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
