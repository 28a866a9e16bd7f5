//! Market participants: the demand side of the ecosystem.
//!
//! A participant tracks the adoption climate of its segment and feeds an
//! appetite signal back into its own record. It is deliberately the lightest
//! actor: it observes, drifts, and occasionally connects with a supplier.

use sim_core::{ActorCore, ActorId, ActorKind, Region, SegmentId, Tick};
use sim_runtime::{ActionSet, Actor, ActorError, WorldView};

pub struct MarketParticipant {
    core: ActorCore,
    segment: SegmentId,
    /// Willingness to adopt new products, in [0, 1].
    appetite: f64,
}

impl MarketParticipant {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        region: Region,
        segment: SegmentId,
        appetite: f64,
    ) -> Self {
        Self {
            core: ActorCore::new(id, ActorKind::MarketParticipant, name, region),
            segment,
            appetite: appetite.clamp(0.0, 1.0),
        }
    }

    pub fn appetite(&self) -> f64 {
        self.appetite
    }

    /// Mean adoption of this segment's products in the participant's region.
    fn observed_adoption(&self, tick: Tick, world: &WorldView<'_>) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for product in world.market.products() {
            if product.segment != self.segment {
                continue;
            }
            sum += world
                .market
                .adoption_or_default(product.id, tick, self.core.region);
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

impl Actor for MarketParticipant {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn advance(&mut self, tick: Tick, world: &mut WorldView<'_>) -> Result<ActionSet, ActorError> {
        let mut actions = ActionSet::default();

        // Appetite drifts toward the observed adoption climate with noise.
        let observed = self.observed_adoption(tick, world);
        let drift = (observed - self.appetite) * 0.2 + world.rng.normal(0.0, 0.02);
        self.appetite = (self.appetite + drift).clamp(0.0, 1.0);
        self.core
            .resources
            .insert("appetite".to_string(), self.appetite);

        // High appetite sometimes forms a supplier relationship.
        if self.appetite > 0.5 && world.rng.chance(0.1) {
            if let Some(supplier) = world
                .actors
                .iter()
                .find(|a| a.active && a.kind == ActorKind::Commercial)
            {
                if self.core.add_connection(supplier.id) {
                    self.core
                        .record_history(tick, format!("contracted with {}", supplier.name));
                    actions.partnerships.push(supplier.id);
                }
            }
        }

        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::World;
    use sim_core::{ProductKind, Technology, TraitSpec};
    use sim_market::ProductSpec;

    fn participant(appetite: f64) -> MarketParticipant {
        MarketParticipant::new(
            ActorId(20),
            "Growers Co-op",
            Region::NorthAmerica,
            SegmentId::RowCrops,
            appetite,
        )
    }

    #[test]
    fn appetite_stays_in_unit_range() {
        let mut world = World::new(6);
        let mut participant = participant(0.9);
        for tick in 2025..2060 {
            participant.advance(tick, &mut world.view()).unwrap();
            assert!((0.0..=1.0).contains(&participant.appetite()));
        }
    }

    #[test]
    fn appetite_rises_with_segment_adoption() {
        let mut world = World::new(6);
        world
            .market
            .register_product(ProductSpec {
                owner: ActorId(1),
                name: "popular seed".to_string(),
                segment: SegmentId::RowCrops,
                technology: Technology::Conventional,
                kind: ProductKind::Seed,
                traits: vec![TraitSpec::new("yield", 1.0)],
                launch_tick: 2020,
            })
            .unwrap();
        let mut participant = participant(0.0);
        for tick in 2035..2055 {
            participant.advance(tick, &mut world.view()).unwrap();
        }
        // Fifteen years after launch the logistic curve is high in a
        // heavily-weighted region; appetite must have followed it upward.
        assert!(participant.appetite() > 0.1);
    }
}
