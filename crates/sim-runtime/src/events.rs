//! Tick-indexed event scheduling.
//!
//! Events are typed mutations of a single subsystem, applied by the engine at
//! the start of the tick they are scheduled for. Scenario timelines are built
//! on top of this primitive in [`crate::scenario`].

use serde::{Deserialize, Serialize};
use sim_core::{Region, SegmentId, Technology, Tick};
use sim_regulatory::PolicyChange;
use std::collections::BTreeMap;

/// The subsystem mutation an event carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EventEffect {
    /// Boost a technology platform's maturity.
    TechnologyImprovement { technology: Technology, boost: f64 },
    /// Mutate one region's regulatory parameters.
    PolicyChange(PolicyChange),
    /// Replace a segment's annual growth rate.
    MarketGrowthChange { segment: SegmentId, growth_rate: f64 },
    /// Scale a segment's base size (demand expansion or collapse).
    MarketSizeShock { segment: SegmentId, multiplier: f64 },
    /// Scale a region's price factor.
    RegionalShock { region: Region, multiplier: f64 },
}

/// A scheduled occurrence: when, what, and a human-readable description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub tick: Tick,
    pub description: String,
    pub effect: EventEffect,
}

impl Event {
    pub fn new(tick: Tick, description: impl Into<String>, effect: EventEffect) -> Self {
        Self {
            tick,
            description: description.into(),
            effect,
        }
    }
}

/// Tick-indexed multimap of pending events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventScheduler {
    pending: BTreeMap<Tick, Vec<Event>>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timeline(events: Vec<Event>) -> Self {
        let mut scheduler = Self::new();
        for event in events {
            scheduler.schedule(event);
        }
        scheduler
    }

    pub fn schedule(&mut self, event: Event) {
        self.pending.entry(event.tick).or_default().push(event);
    }

    /// Remove and return every event scheduled for `tick`, in scheduling
    /// order. Events for earlier ticks that were never taken stay pending.
    pub fn take_due(&mut self, tick: Tick) -> Vec<Event> {
        self.pending.remove(&tick).unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.pending.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tick: Tick) -> Event {
        Event::new(
            tick,
            "boost",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.1,
            },
        )
    }

    #[test]
    fn due_events_are_taken_in_scheduling_order() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule(Event::new(
            2027,
            "first",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::RowCrops,
                growth_rate: 0.05,
            },
        ));
        scheduler.schedule(event(2027));
        scheduler.schedule(event(2030));

        let due = scheduler.take_due(2027);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].description, "first");
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.take_due(2027).is_empty());
    }

    #[test]
    fn ticks_without_events_yield_nothing() {
        let mut scheduler = EventScheduler::from_timeline(vec![event(2030)]);
        assert!(scheduler.take_due(2029).is_empty());
        assert_eq!(scheduler.pending_count(), 1);
    }
}
