//! Research entities: universities, institutes, and startups.
//!
//! A research entity accumulates progress toward its focus technology.
//! Completing a program proposes a research project, nudges the platform's
//! maturity, and resets the clock. Capital drains with the annual budget and
//! triggers funding requests when it runs low.

use sim_core::{ActorCore, ActorId, ActorKind, Region, Technology, Tick};
use sim_runtime::{ActionSet, Actor, ActorError, FundingRequest, ResearchProject, WorldView};
use tracing::debug;

/// Maturity gained by the focus platform when a program completes.
const DISCOVERY_BOOST: f64 = 0.02;
/// Capital floor below which the entity asks for outside funding.
const FUNDING_FLOOR: f64 = 2.0;

pub struct ResearchEntity {
    core: ActorCore,
    focus: Technology,
    /// Annual spend in millions USD.
    annual_budget: f64,
    /// Progress toward the next completed program, in [0, 1+).
    progress: f64,
}

impl ResearchEntity {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        region: Region,
        focus: Technology,
        annual_budget: f64,
        initial_capital: f64,
    ) -> Self {
        let mut core = ActorCore::new(id, ActorKind::Research, name, region);
        core.adjust_resource("capital", initial_capital);
        Self {
            core,
            focus,
            annual_budget: annual_budget.max(0.0),
            progress: 0.0,
        }
    }

    pub fn focus(&self) -> Technology {
        self.focus
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl Actor for ResearchEntity {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn advance(&mut self, tick: Tick, world: &mut WorldView<'_>) -> Result<ActionSet, ActorError> {
        let mut actions = ActionSet::default();

        self.core.adjust_resource("capital", -self.annual_budget);

        // Mature platforms are easier to make progress on.
        let maturity = world.technology.maturity(self.focus);
        let gain = world.rng.beta(2.0, 3.0) * 0.3 * (0.5 + maturity / 2.0);
        self.progress += gain;

        if self.progress >= 1.0 {
            self.progress -= 1.0;
            world.technology.boost(self.focus, DISCOVERY_BOOST);
            let project = ResearchProject {
                focus: self.focus,
                duration_years: world.rng.pick(2, 4),
                budget: self.annual_budget * world.rng.uniform(1.0, 2.5),
                success_probability: world.rng.bounded_normal(0.6, 0.15, 0.2, 0.9),
            };
            self.core
                .record_history(tick, format!("completed {} program", self.focus));
            debug!(actor = %self.core.id(), focus = %self.focus, "research program completed");
            actions.research_projects.push(project);
        }

        if self.core.resource("capital") < FUNDING_FLOOR {
            let amount = self.annual_budget * 5.0;
            self.core.adjust_resource("capital", amount);
            self.core.record_history(tick, "raised grant funding");
            actions.funding_requests.push(FundingRequest {
                amount,
                purpose: format!("{} research program", self.focus),
            });
        }

        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::World;

    fn entity() -> ResearchEntity {
        ResearchEntity::new(
            ActorId(1),
            "Crop Institute",
            Region::Europe,
            Technology::GeneEditing,
            3.0,
            10.0,
        )
    }

    #[test]
    fn progress_accumulates_and_eventually_completes() {
        let mut world = World::new(5);
        let mut entity = entity();
        let mut completed = 0;
        for tick in 2025..2060 {
            let actions = entity.advance(tick, &mut world.view()).unwrap();
            completed += actions.research_projects.len();
        }
        assert!(completed >= 1);
        assert!(entity.progress() < 1.0);
    }

    #[test]
    fn low_capital_triggers_funding_requests() {
        let mut world = World::new(1);
        let mut entity = entity();
        let mut requested = false;
        for tick in 2025..2035 {
            let actions = entity.advance(tick, &mut world.view()).unwrap();
            requested |= !actions.funding_requests.is_empty();
        }
        // 10.0 of capital at 3.0 a year runs out within the decade.
        assert!(requested);
        assert!(entity.core().resource("capital") >= 0.0);
    }

    #[test]
    fn completions_raise_platform_maturity() {
        let mut world = World::new(9);
        let before = world.technology.maturity(Technology::GeneEditing);
        let mut entity = entity();
        for tick in 2025..2060 {
            entity.advance(tick, &mut world.view()).unwrap();
        }
        assert!(world.technology.maturity(Technology::GeneEditing) > before);
    }
}
