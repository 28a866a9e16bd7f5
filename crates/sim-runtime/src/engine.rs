//! Tick orchestration.
//!
//! Per tick the engine runs a fixed phase order: due events, passive
//! technology maturation, regulatory processing, market simulation, then
//! every actor in insertion order, and finally metrics recording. A single
//! seeded RNG drives all draws, so a run is fully determined by its
//! configuration.

use crate::actor::{Actor, ActorError, ActorSummary, WorldView};
use crate::events::{Event, EventEffect, EventScheduler};
use crate::metrics::{MetricsRecorder, RunReport};
use sim_core::{validate_horizon, ActorId, SimRng, TechnologyPipeline, Tick, ValidationError};
use sim_market::MarketModel;
use sim_regulatory::RegulatoryFramework;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ValidationError),
    /// Fail-fast: the first actor failure aborts the run mid-tick.
    #[error("actor {actor} failed to advance at tick {tick}")]
    ActorAdvance {
        actor: ActorId,
        tick: Tick,
        #[source]
        source: ActorError,
    },
}

/// Horizon and seed of one run.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub seed: u64,
}

/// The simulation engine: owns every subsystem and the actor roster.
pub struct Engine {
    config: EngineConfig,
    market: MarketModel,
    regulatory: RegulatoryFramework,
    technology: TechnologyPipeline,
    scheduler: EventScheduler,
    actors: Vec<Box<dyn Actor>>,
    rng: SimRng,
    metrics: MetricsRecorder,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        market: MarketModel,
        regulatory: RegulatoryFramework,
        scheduler: EventScheduler,
    ) -> Result<Self, EngineError> {
        validate_horizon(config.start_tick, config.end_tick)?;
        Ok(Self {
            rng: SimRng::seeded(config.seed),
            config,
            market,
            regulatory,
            technology: TechnologyPipeline::default(),
            scheduler,
            actors: Vec::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    /// Actors advance in the order they were added.
    pub fn add_actor(&mut self, actor: Box<dyn Actor>) {
        self.actors.push(actor);
    }

    pub fn market(&self) -> &MarketModel {
        &self.market
    }

    pub fn regulatory(&self) -> &RegulatoryFramework {
        &self.regulatory
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Run every tick of the horizon and consume the engine into a report.
    pub fn run(mut self) -> Result<(RunReport, MarketModel), EngineError> {
        info!(
            start = self.config.start_tick,
            end = self.config.end_tick,
            seed = self.config.seed,
            actors = self.actors.len(),
            "run starting"
        );
        for tick in self.config.start_tick..=self.config.end_tick {
            self.run_tick(tick)?;
        }
        let report = self
            .metrics
            .into_report(self.config.start_tick, self.config.end_tick, self.config.seed);
        info!(
            final_sales = report.final_total_sales(),
            approvals = report.total_approvals(),
            "run finished"
        );
        Ok((report, self.market))
    }

    /// One tick in the fixed phase order.
    pub fn run_tick(&mut self, tick: Tick) -> Result<(), EngineError> {
        let events = self.scheduler.take_due(tick);
        let events_applied = events.len();
        for event in events {
            self.apply_event(tick, event);
        }

        self.technology.advance_tick();
        let regulatory_outcome = self.regulatory.process_tick(tick, &mut self.rng);
        let market_summary = self.market.simulate_tick(tick);

        let summaries: Vec<ActorSummary> = self.actors.iter().map(|a| a.summary()).collect();
        // The roster is taken out so WorldView can borrow the subsystems
        // mutably while actors run; it is restored afterwards.
        let mut actors = std::mem::take(&mut self.actors);
        let result: Result<(), EngineError> = (|| {
            for actor in actors.iter_mut() {
                if !actor.core().is_active() {
                    continue;
                }
                let mut world = WorldView {
                    market: &mut self.market,
                    regulatory: &mut self.regulatory,
                    technology: &mut self.technology,
                    rng: &mut self.rng,
                    actors: &summaries,
                };
                let actions = actor.advance(tick, &mut world).map_err(|source| {
                    EngineError::ActorAdvance {
                        actor: actor.core().id(),
                        tick,
                        source,
                    }
                })?;
                if !actions.is_empty() {
                    debug!(
                        actor = %actor.core().id(),
                        tick,
                        projects = actions.research_projects.len(),
                        launches = actions.product_launches.len(),
                        applications = actions.applications_filed.len(),
                        "actor acted"
                    );
                }
            }
            Ok(())
        })();
        self.actors = actors;
        result?;

        self.metrics
            .record(tick, &market_summary, &regulatory_outcome, events_applied);
        Ok(())
    }

    fn apply_event(&mut self, tick: Tick, event: Event) {
        info!(tick, description = %event.description, "event");
        match event.effect {
            EventEffect::TechnologyImprovement { technology, boost } => {
                self.technology.boost(technology, boost);
            }
            EventEffect::PolicyChange(change) => {
                if let Err(err) = self.regulatory.apply_policy_change(&change) {
                    warn!(%err, "policy change dropped");
                }
            }
            EventEffect::MarketGrowthChange { segment, growth_rate } => {
                self.market.apply_growth_change(segment, growth_rate);
            }
            EventEffect::MarketSizeShock { segment, multiplier } => {
                self.market.apply_size_multiplier(segment, multiplier);
            }
            EventEffect::RegionalShock { region, multiplier } => {
                self.market.apply_regional_shock(region, multiplier);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActionSet;
    use sim_core::{ActorCore, ActorKind, ProductKind, Region, SegmentId, Technology};
    use sim_market::{default_segments, ProductSpec};

    struct Launcher {
        core: ActorCore,
        launched: bool,
    }

    impl Actor for Launcher {
        fn core(&self) -> &ActorCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ActorCore {
            &mut self.core
        }
        fn advance(
            &mut self,
            tick: Tick,
            world: &mut WorldView<'_>,
        ) -> Result<ActionSet, ActorError> {
            let mut actions = ActionSet::default();
            if !self.launched {
                let id = world.market.register_product(ProductSpec {
                    owner: self.core.id(),
                    name: "test seed".to_string(),
                    segment: SegmentId::RowCrops,
                    technology: Technology::GeneEditing,
                    kind: ProductKind::Seed,
                    traits: vec![],
                    launch_tick: tick,
                })?;
                actions.product_launches.push(id);
                self.launched = true;
            }
            Ok(actions)
        }
    }

    struct Failing(ActorCore);

    impl Actor for Failing {
        fn core(&self) -> &ActorCore {
            &self.0
        }
        fn core_mut(&mut self) -> &mut ActorCore {
            &mut self.0
        }
        fn advance(
            &mut self,
            _tick: Tick,
            _world: &mut WorldView<'_>,
        ) -> Result<ActionSet, ActorError> {
            Err(ActorError::InsufficientResources {
                actor: self.0.id(),
                resource: "capital".to_string(),
            })
        }
    }

    fn engine(seed: u64) -> Engine {
        Engine::new(
            EngineConfig {
                start_tick: 2025,
                end_tick: 2030,
                seed,
            },
            MarketModel::new(2025, default_segments()).unwrap(),
            RegulatoryFramework::with_default_regions(),
            EventScheduler::new(),
        )
        .unwrap()
    }

    #[test]
    fn empty_horizon_is_rejected() {
        let err = Engine::new(
            EngineConfig {
                start_tick: 2030,
                end_tick: 2025,
                seed: 1,
            },
            MarketModel::new(2025, default_segments()).unwrap(),
            RegulatoryFramework::with_default_regions(),
            EventScheduler::new(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn run_produces_one_row_per_tick() {
        let mut engine = engine(1);
        engine.add_actor(Box::new(Launcher {
            core: ActorCore::new(
                ActorId(1),
                ActorKind::Commercial,
                "AgriCorp",
                Region::NorthAmerica,
            ),
            launched: false,
        }));
        let (report, market) = engine.run().unwrap();
        assert_eq!(report.ticks.len(), 6);
        assert_eq!(market.products().count(), 1);
        // The product launched at the first tick, so later ticks show sales.
        assert!(report.final_total_sales() > 0.0);
    }

    #[test]
    fn actor_failure_aborts_the_run() {
        let mut engine = engine(1);
        engine.add_actor(Box::new(Failing(ActorCore::new(
            ActorId(2),
            ActorKind::Commercial,
            "Broke Inc",
            Region::Europe,
        ))));
        match engine.run() {
            Err(EngineError::ActorAdvance { actor, tick, .. }) => {
                assert_eq!(actor, ActorId(2));
                assert_eq!(tick, 2025);
            }
            other => panic!("expected actor failure, got {other:?}"),
        }
    }

    #[test]
    fn inactive_actors_are_skipped() {
        let mut engine = engine(1);
        let mut core = ActorCore::new(ActorId(3), ActorKind::Commercial, "Gone", Region::Asia);
        core.deactivate();
        engine.add_actor(Box::new(Failing(core)));
        assert!(engine.run().is_ok());
    }

    #[test]
    fn events_mutate_subsystems_before_market_runs() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(Event::new(
            2025,
            "gene editing breakthrough",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 1.0,
            },
        ));
        let mut engine = Engine::new(
            EngineConfig {
                start_tick: 2025,
                end_tick: 2025,
                seed: 1,
            },
            MarketModel::new(2025, default_segments()).unwrap(),
            RegulatoryFramework::with_default_regions(),
            scheduler,
        )
        .unwrap();
        engine.run_tick(2025).unwrap();
        assert_eq!(engine.metrics.rows()[0].events_applied, 1);
    }
}
