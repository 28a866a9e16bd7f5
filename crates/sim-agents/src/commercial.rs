//! Commercial players: the firms that develop, file, and launch products.
//!
//! A player carries a development pipeline. When a planned product matures it
//! is registered with the market (blocked in every region) and filed with the
//! regulators; regional approvals then open the corresponding markets by
//! lifting the product's regulatory-impact multiplier.

use serde::{Deserialize, Serialize};
use sim_core::{
    ActorCore, ActorId, ActorKind, ApplicationId, DataCategory, ProductId, ProductKind, Region,
    SegmentId, Technology, Tick, TraitSpec,
};
use sim_regulatory::{OverallStatus, SubmissionRecord};
use sim_runtime::{ActionSet, Actor, ActorError, WorldView};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A product still in development.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannedProduct {
    pub name: String,
    pub segment: SegmentId,
    pub technology: Technology,
    pub kind: ProductKind,
    pub traits: Vec<TraitSpec>,
    pub data_quality: BTreeMap<DataCategory, f64>,
    pub target_regions: Vec<Region>,
    pub years_to_ready: u32,
}

/// A filed application awaiting a decision.
#[derive(Clone, Copy, Debug)]
struct Filing {
    application: ApplicationId,
    product: ProductId,
    resolved: bool,
}

pub struct CommercialPlayer {
    core: ActorCore,
    pipeline: Vec<PlannedProduct>,
    filings: Vec<Filing>,
    /// Annual development spend per pipeline entry, in millions USD.
    development_cost: f64,
}

impl CommercialPlayer {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        region: Region,
        initial_capital: f64,
        pipeline: Vec<PlannedProduct>,
    ) -> Self {
        let mut core = ActorCore::new(id, ActorKind::Commercial, name, region);
        core.adjust_resource("capital", initial_capital);
        Self {
            core,
            pipeline,
            filings: Vec::new(),
            development_cost: 2.0,
        }
    }

    pub fn pipeline_len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn launched_products(&self) -> Vec<ProductId> {
        self.filings.iter().map(|f| f.product).collect()
    }

    /// Register a ready product blocked everywhere and file for approval.
    fn file_product(
        &mut self,
        plan: PlannedProduct,
        tick: Tick,
        world: &mut WorldView<'_>,
        actions: &mut ActionSet,
    ) -> Result<(), ActorError> {
        let product = world.market.register_product(sim_market::ProductSpec {
            owner: self.core.id(),
            name: plan.name.clone(),
            segment: plan.segment,
            technology: plan.technology,
            kind: plan.kind,
            traits: plan.traits.clone(),
            launch_tick: tick + 1,
        })?;
        for region in Region::ALL {
            world.market.set_regulatory_impact(product, region, 0.0)?;
        }
        let application = world.regulatory.submit_application(
            SubmissionRecord {
                applicant: self.core.id(),
                product,
                kind: plan.kind,
                technology: plan.technology,
                data_quality: plan.data_quality.clone(),
                target_regions: plan.target_regions.clone(),
            },
            tick,
        )?;
        info!(actor = %self.core.id(), %product, %application, "product filed");
        self.core
            .record_history(tick, format!("filed {} for approval", plan.name));
        self.filings.push(Filing {
            application,
            product,
            resolved: false,
        });
        actions.product_launches.push(product);
        actions.applications_filed.push(application);
        Ok(())
    }

    /// Open approved regions and close rejected or revoked ones.
    fn reconcile_filings(
        &mut self,
        tick: Tick,
        world: &mut WorldView<'_>,
    ) -> Result<(), ActorError> {
        for filing in self.filings.iter_mut() {
            let status = world.regulatory.status(filing.application)?;
            match status {
                OverallStatus::Approved => {
                    let approved: Vec<Region> = world
                        .regulatory
                        .application(filing.application)?
                        .approved_regions()
                        .collect();
                    for region in approved {
                        world
                            .market
                            .set_regulatory_impact(filing.product, region, 1.0)?;
                    }
                    if !filing.resolved {
                        filing.resolved = true;
                        self.core
                            .record_history(tick, format!("{} approved", filing.product));
                        self.core.adjust_resource("capital", 5.0);
                    }
                }
                OverallStatus::Rejected | OverallStatus::Revoked => {
                    if !filing.resolved {
                        for region in Region::ALL {
                            world
                                .market
                                .set_regulatory_impact(filing.product, region, 0.0)?;
                        }
                        filing.resolved = true;
                        self.core
                            .record_history(tick, format!("{} blocked ({status:?})", filing.product));
                    }
                }
                OverallStatus::UnderReview => {}
            }
        }
        Ok(())
    }

    /// Sketch a new product when the pipeline thins out.
    fn plan_product(&mut self, tick: Tick, world: &mut WorldView<'_>) {
        let technology = if world.rng.chance(world.technology.maturity(Technology::GeneEditing)) {
            Technology::GeneEditing
        } else if world.rng.chance(0.5) {
            Technology::Transgenic
        } else {
            Technology::Conventional
        };
        let segment = match world.rng.pick(0, 2) {
            0 => SegmentId::RowCrops,
            1 => SegmentId::SpecialtyCrops,
            _ => SegmentId::Biofuels,
        };
        let maturity = world.technology.maturity(technology);
        let mean_quality = 0.55 + maturity * 0.3;
        let plan = PlannedProduct {
            name: format!("{}-{}-{}", self.core.name, technology, tick),
            segment,
            technology,
            kind: ProductKind::Seed,
            traits: vec![TraitSpec::new(
                "yield",
                world.rng.triangular(0.5, 1.5, 3.0),
            )],
            data_quality: [
                (
                    DataCategory::Safety,
                    world.rng.bounded_normal(mean_quality, 0.1, 0.2, 1.0),
                ),
                (
                    DataCategory::Efficacy,
                    world.rng.bounded_normal(mean_quality, 0.1, 0.2, 1.0),
                ),
                (
                    DataCategory::Environmental,
                    world.rng.bounded_normal(mean_quality, 0.1, 0.2, 1.0),
                ),
            ]
            .into_iter()
            .collect(),
            target_regions: vec![Region::NorthAmerica, Region::Europe, Region::Asia],
            years_to_ready: world.rng.pick(1, 3),
        };
        debug!(actor = %self.core.id(), name = %plan.name, "product planned");
        self.pipeline.push(plan);
    }
}

impl Actor for CommercialPlayer {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn advance(&mut self, tick: Tick, world: &mut WorldView<'_>) -> Result<ActionSet, ActorError> {
        let mut actions = ActionSet::default();

        self.core.adjust_resource(
            "capital",
            -(self.pipeline.len() as f64) * self.development_cost,
        );

        // Develop the pipeline; file everything that became ready.
        let mut ready = Vec::new();
        let mut remaining = Vec::new();
        for mut plan in std::mem::take(&mut self.pipeline) {
            plan.years_to_ready = plan.years_to_ready.saturating_sub(1);
            if plan.years_to_ready == 0 {
                ready.push(plan);
            } else {
                remaining.push(plan);
            }
        }
        self.pipeline = remaining;
        for plan in ready {
            self.file_product(plan, tick, world, &mut actions)?;
        }

        self.reconcile_filings(tick, world)?;

        if self.pipeline.is_empty() && world.rng.chance(0.4) {
            self.plan_product(tick, world);
        }

        // Occasional partnership with another commercial player.
        if world.rng.chance(0.05) {
            if let Some(partner) = world
                .actors
                .iter()
                .find(|a| a.active && a.kind == ActorKind::Commercial && a.id != self.core.id())
            {
                if self.core.add_connection(partner.id) {
                    self.core
                        .record_history(tick, format!("partnered with {}", partner.name));
                    actions.partnerships.push(partner.id);
                }
            }
        }

        Ok(actions)
    }
}
