#![deny(warnings)]

//! Simulation runtime: event scheduler, tick-orchestrating engine, the actor
//! contract, metrics recording, and prebuilt scenario timelines.

pub mod actor;
pub mod engine;
pub mod events;
pub mod metrics;
pub mod scenario;

pub use actor::{
    ActionSet, Actor, ActorError, ActorSummary, EnforcementAction, EnforcementKind,
    FundingRequest, ResearchProject, WorldView,
};
pub use engine::{Engine, EngineConfig, EngineError};
pub use events::{Event, EventEffect, EventScheduler};
pub use metrics::{product_rows, MetricsRecorder, ProductTickRow, RunReport, TickMetrics};
pub use scenario::Scenario;
