//! The actor contract.
//!
//! Every actor advances once per tick through the same fixed interface:
//! `advance(tick, &mut WorldView) -> Result<ActionSet>`. The [`WorldView`] is
//! the only handle bundle through which actors read and mutate shared state;
//! the market and regulatory registries are its only cross-actor write paths.

use serde::{Deserialize, Serialize};
use sim_core::{
    ActorCore, ActorId, ActorKind, ApplicationId, ProductId, Region, SimRng, Technology,
    TechnologyPipeline, Tick,
};
use sim_market::{MarketError, MarketModel};
use sim_regulatory::{RegulatoryError, RegulatoryFramework};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActorError {
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Regulatory(#[from] RegulatoryError),
    #[error("actor {actor} lacks {resource}")]
    InsufficientResources { actor: ActorId, resource: String },
}

/// Read-only digest of another actor, published to all actors each tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorSummary {
    pub id: ActorId,
    pub kind: ActorKind,
    pub name: String,
    pub region: Region,
    pub active: bool,
}

/// A proposed research undertaking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResearchProject {
    pub focus: Technology,
    pub duration_years: u32,
    pub budget: f64,
    pub success_probability: f64,
}

/// A request for external funding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FundingRequest {
    pub amount: f64,
    pub purpose: String,
}

/// Post-approval enforcement outcomes short of revocation are recorded here;
/// revocation itself goes through the regulatory framework.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EnforcementKind {
    Warning,
    Fine { amount: f64 },
    Suspension,
    Revocation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnforcementAction {
    pub application: ApplicationId,
    pub action: EnforcementKind,
}

/// Everything an actor decided this tick. The engine logs the set; each
/// actor applies its own decisions to its own state and history.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionSet {
    pub research_projects: Vec<ResearchProject>,
    pub partnerships: Vec<ActorId>,
    pub product_launches: Vec<ProductId>,
    pub applications_filed: Vec<ApplicationId>,
    pub funding_requests: Vec<FundingRequest>,
    pub enforcement_actions: Vec<EnforcementAction>,
}

impl ActionSet {
    pub fn is_empty(&self) -> bool {
        self.research_projects.is_empty()
            && self.partnerships.is_empty()
            && self.product_launches.is_empty()
            && self.applications_filed.is_empty()
            && self.funding_requests.is_empty()
            && self.enforcement_actions.is_empty()
    }
}

/// Mutable handles an actor may touch during its turn, plus read-only
/// summaries of the whole population.
pub struct WorldView<'a> {
    pub market: &'a mut MarketModel,
    pub regulatory: &'a mut RegulatoryFramework,
    pub technology: &'a mut TechnologyPipeline,
    pub rng: &'a mut SimRng,
    pub actors: &'a [ActorSummary],
}

/// One participant in the simulation.
pub trait Actor {
    fn core(&self) -> &ActorCore;
    fn core_mut(&mut self) -> &mut ActorCore;

    /// Advance one tick. Errors abort the run.
    fn advance(&mut self, tick: Tick, world: &mut WorldView<'_>) -> Result<ActionSet, ActorError>;

    fn summary(&self) -> ActorSummary {
        let core = self.core();
        ActorSummary {
            id: core.id(),
            kind: core.kind(),
            name: core.name.clone(),
            region: core.region,
            active: core.is_active(),
        }
    }
}
