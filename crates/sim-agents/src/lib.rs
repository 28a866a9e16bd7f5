#![deny(warnings)]

//! The four actor variants of the ecosystem.
//!
//! Each variant wraps the shared [`sim_core::ActorCore`] with a typed
//! per-kind profile and a modest decision rule. The engine only sees the
//! [`sim_runtime::Actor`] contract; everything an actor decides comes back
//! as an [`sim_runtime::ActionSet`].

pub mod commercial;
pub mod participant;
pub mod regulator;
pub mod research;

pub use commercial::{CommercialPlayer, PlannedProduct};
pub use participant::MarketParticipant;
pub use regulator::RegulatorActor;
pub use research::ResearchEntity;

#[cfg(test)]
pub(crate) mod testutil {
    use sim_core::{SimRng, TechnologyPipeline};
    use sim_market::MarketModel;
    use sim_regulatory::RegulatoryFramework;
    use sim_runtime::{ActorSummary, WorldView};

    /// Owns the subsystems a test WorldView borrows.
    pub struct World {
        pub market: MarketModel,
        pub regulatory: RegulatoryFramework,
        pub technology: TechnologyPipeline,
        pub rng: SimRng,
        pub summaries: Vec<ActorSummary>,
    }

    impl World {
        pub fn new(seed: u64) -> Self {
            Self {
                market: MarketModel::with_default_segments(2025),
                regulatory: RegulatoryFramework::with_default_regions(),
                technology: TechnologyPipeline::default(),
                rng: SimRng::seeded(seed),
                summaries: Vec::new(),
            }
        }

        pub fn view(&mut self) -> WorldView<'_> {
            WorldView {
                market: &mut self.market,
                regulatory: &mut self.regulatory,
                technology: &mut self.technology,
                rng: &mut self.rng,
                actors: &self.summaries,
            }
        }
    }
}
