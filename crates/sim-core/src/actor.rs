//! Shared actor record.
//!
//! Every actor variant in the simulation wraps an [`ActorCore`]: identity,
//! kind tag, region, a numeric resource ledger, a connection set, and an
//! append-only history log. Identity and kind are fixed at creation; actors
//! are never destroyed, only deactivated.

use crate::{ActorId, Region, Tick};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The four actor classes of the ecosystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Research,
    Commercial,
    Regulator,
    MarketParticipant,
}

/// One entry in an actor's append-only history log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tick: Tick,
    pub summary: String,
}

/// State common to all actor variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorCore {
    id: ActorId,
    kind: ActorKind,
    pub name: String,
    pub region: Region,
    /// Named numeric resources (capital, capacity, reputation, ...).
    pub resources: BTreeMap<String, f64>,
    /// Free-form numeric extensions a variant does not model as a field.
    pub extra: BTreeMap<String, f64>,
    connections: BTreeSet<ActorId>,
    history: Vec<HistoryEntry>,
    active: bool,
}

impl ActorCore {
    pub fn new(id: ActorId, kind: ActorKind, name: impl Into<String>, region: Region) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            region,
            resources: BTreeMap::new(),
            extra: BTreeMap::new(),
            connections: BTreeSet::new(),
            history: Vec::new(),
            active: true,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivation is the only lifecycle exit; the record stays queryable.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Current value of a named resource, 0.0 when absent.
    pub fn resource(&self, name: &str) -> f64 {
        self.resources.get(name).copied().unwrap_or(0.0)
    }

    /// Add (or subtract, with a negative delta) to a named resource.
    pub fn adjust_resource(&mut self, name: &str, delta: f64) -> f64 {
        let entry = self.resources.entry(name.to_string()).or_insert(0.0);
        *entry += delta;
        *entry
    }

    pub fn add_connection(&mut self, other: ActorId) -> bool {
        if other == self.id {
            return false;
        }
        self.connections.insert(other)
    }

    pub fn remove_connection(&mut self, other: ActorId) -> bool {
        self.connections.remove(&other)
    }

    pub fn connections(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.connections.iter().copied()
    }

    pub fn is_connected(&self, other: ActorId) -> bool {
        self.connections.contains(&other)
    }

    pub fn record_history(&mut self, tick: Tick, summary: impl Into<String>) {
        self.history.push(HistoryEntry {
            tick,
            summary: summary.into(),
        });
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> ActorCore {
        ActorCore::new(
            ActorId(1),
            ActorKind::Commercial,
            "AgriCorp",
            Region::NorthAmerica,
        )
    }

    #[test]
    fn identity_and_kind_are_fixed() {
        let actor = core();
        assert_eq!(actor.id(), ActorId(1));
        assert_eq!(actor.kind(), ActorKind::Commercial);
        // No mutators exist for id/kind; this is a compile-time property.
    }

    #[test]
    fn deactivation_keeps_record() {
        let mut actor = core();
        actor.record_history(2025, "founded");
        actor.deactivate();
        assert!(!actor.is_active());
        assert_eq!(actor.history().len(), 1);
    }

    #[test]
    fn resources_default_to_zero() {
        let mut actor = core();
        assert_eq!(actor.resource("capital"), 0.0);
        assert_eq!(actor.adjust_resource("capital", 500.0), 500.0);
        assert_eq!(actor.adjust_resource("capital", -200.0), 300.0);
    }

    #[test]
    fn no_self_connections() {
        let mut actor = core();
        assert!(!actor.add_connection(ActorId(1)));
        assert!(actor.add_connection(ActorId(2)));
        assert!(actor.is_connected(ActorId(2)));
        assert!(actor.remove_connection(ActorId(2)));
        assert!(!actor.is_connected(ActorId(2)));
    }

    #[test]
    fn history_is_append_only() {
        let mut actor = core();
        actor.record_history(2025, "launched prod-1");
        actor.record_history(2026, "submitted app-1");
        let ticks: Vec<_> = actor.history().iter().map(|h| h.tick).collect();
        assert_eq!(ticks, vec![2025, 2026]);
    }
}
