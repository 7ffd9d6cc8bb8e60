use std::collections::BTreeMap;

use serde::Serialize;

use crate::corpus::Match;
use crate::prediction::{BetType, Prediction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCount {
    pub total: usize,
    pub correct: usize,
}

impl HitCount {
    fn add(&mut self, hit: bool) {
        self.total += 1;
        if hit {
            self.correct += 1;
        }
    }

    /// Percentage in 0..=100; 0 when nothing was counted.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

/// Running correctness tally. Only qualified predictions with a known final
/// score are counted; everything else lands in `unresolved`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tally {
    pub predictions: usize,
    pub qualified: usize,
    pub unresolved: usize,
    pub overall: HitCount,
    pub per_bet: BTreeMap<BetType, HitCount>,
}

impl Tally {
    pub fn record(mut self, fixture: &Match, prediction: &Prediction) -> Self {
        self.predictions += 1;
        if !prediction.qualified() {
            self.unresolved += 1;
            return self;
        }
        self.qualified += 1;

        let hit = fixture
            .full_time()
            .and_then(|(h, a)| prediction.bet_type.is_hit(h, a));
        match hit {
            Some(hit) => {
                self.overall.add(hit);
                self.per_bet.entry(prediction.bet_type).or_default().add(hit);
            }
            None => self.unresolved += 1,
        }
        self
    }

    pub fn accuracy(&self) -> f64 {
        self.overall.accuracy()
    }
}

/// Pairs fixtures with predictions positionally; extra entries on either side are ignored.
pub fn evaluate(fixtures: &[Match], predictions: &[Prediction]) -> Tally {
    fixtures
        .iter()
        .zip(predictions)
        .fold(Tally::default(), |tally, (fixture, prediction)| {
            tally.record(fixture, prediction)
        })
}
