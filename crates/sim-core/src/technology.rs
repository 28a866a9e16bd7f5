//! Technology maturation.
//!
//! Each platform carries a maturity level in [0, 1] that rises passively
//! every tick and can be boosted by breakthrough events. Maturity feeds the
//! market's technology premium and the regulators' stringency multipliers.

use crate::Technology;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maturity state of one technology platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechnologyState {
    /// Current maturity in [0, 1].
    pub maturity: f64,
    /// Passive per-tick maturity gain.
    pub maturation_rate: f64,
}

impl TechnologyState {
    pub fn new(maturity: f64, maturation_rate: f64) -> Self {
        Self {
            maturity: maturity.clamp(0.0, 1.0),
            maturation_rate: maturation_rate.max(0.0),
        }
    }
}

/// Maturity tracker for all platforms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TechnologyPipeline {
    states: BTreeMap<Technology, TechnologyState>,
}

impl Default for TechnologyPipeline {
    /// Conventional breeding starts mature; the engineered platforms start
    /// partially developed and mature slowly.
    fn default() -> Self {
        let mut states = BTreeMap::new();
        states.insert(Technology::Conventional, TechnologyState::new(1.0, 0.0));
        states.insert(Technology::GeneEditing, TechnologyState::new(0.6, 0.02));
        states.insert(Technology::Transgenic, TechnologyState::new(0.8, 0.01));
        Self { states }
    }
}

impl TechnologyPipeline {
    pub fn new(states: BTreeMap<Technology, TechnologyState>) -> Self {
        Self { states }
    }

    /// Current maturity of a platform; unknown platforms report 0.0.
    pub fn maturity(&self, tech: Technology) -> f64 {
        self.states.get(&tech).map(|s| s.maturity).unwrap_or(0.0)
    }

    /// Apply one tick of passive maturation, capped at 1.0.
    pub fn advance_tick(&mut self) {
        for state in self.states.values_mut() {
            state.maturity = (state.maturity + state.maturation_rate).min(1.0);
        }
    }

    /// Breakthrough boost, capped at 1.0. Unknown platforms are inserted.
    pub fn boost(&mut self, tech: Technology, amount: f64) {
        let state = self
            .states
            .entry(tech)
            .or_insert_with(|| TechnologyState::new(0.0, 0.0));
        state.maturity = (state.maturity + amount.max(0.0)).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturation_caps_at_one() {
        let mut pipeline = TechnologyPipeline::new(
            [(Technology::GeneEditing, TechnologyState::new(0.95, 0.1))]
                .into_iter()
                .collect(),
        );
        pipeline.advance_tick();
        assert_eq!(pipeline.maturity(Technology::GeneEditing), 1.0);
        pipeline.advance_tick();
        assert_eq!(pipeline.maturity(Technology::GeneEditing), 1.0);
    }

    #[test]
    fn boost_caps_and_inserts() {
        let mut pipeline = TechnologyPipeline::new(BTreeMap::new());
        assert_eq!(pipeline.maturity(Technology::Transgenic), 0.0);
        pipeline.boost(Technology::Transgenic, 0.3);
        assert_eq!(pipeline.maturity(Technology::Transgenic), 0.3);
        pipeline.boost(Technology::Transgenic, 2.0);
        assert_eq!(pipeline.maturity(Technology::Transgenic), 1.0);
    }

    #[test]
    fn default_platforms_present() {
        let pipeline = TechnologyPipeline::default();
        assert_eq!(pipeline.maturity(Technology::Conventional), 1.0);
        assert!(pipeline.maturity(Technology::GeneEditing) > 0.0);
    }
}
