//! Regulator actors: post-approval surveillance and enforcement.
//!
//! A regulator periodically audits the approvals held in its jurisdiction.
//! Each audit draws a non-compliance severity; graded findings produce
//! warnings, fines, or suspensions, and severe findings revoke the approval
//! through the regulatory framework.

use sim_core::{ActorCore, ActorId, ActorKind, ApplicationId, Region, Tick};
use sim_runtime::{
    ActionSet, Actor, ActorError, EnforcementAction, EnforcementKind, WorldView,
};
use tracing::info;

/// Severity thresholds for the graded enforcement ladder.
const REVOCATION_SEVERITY: f64 = 0.6;
const SUSPENSION_SEVERITY: f64 = 0.4;
const FINE_SEVERITY: f64 = 0.25;
const WARNING_SEVERITY: f64 = 0.15;

pub struct RegulatorActor {
    core: ActorCore,
    /// Years between surveillance rounds.
    review_interval: u32,
    /// Probability that a severe finding is actually pursued to revocation.
    enforcement_capacity: f64,
    last_review: Option<Tick>,
}

impl RegulatorActor {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        region: Region,
        review_interval: u32,
        enforcement_capacity: f64,
    ) -> Self {
        Self {
            core: ActorCore::new(id, ActorKind::Regulator, name, region),
            review_interval: review_interval.max(1),
            enforcement_capacity: enforcement_capacity.clamp(0.0, 1.0),
            last_review: None,
        }
    }

    fn review_due(&self, tick: Tick) -> bool {
        match self.last_review {
            Some(last) => tick >= last + self.review_interval,
            None => true,
        }
    }

    fn audit(
        &mut self,
        application: ApplicationId,
        tick: Tick,
        world: &mut WorldView<'_>,
        actions: &mut ActionSet,
    ) -> Result<(), ActorError> {
        // Findings are rare and mostly minor.
        let severity = world.rng.beta(1.5, 8.0);
        let action = if severity > REVOCATION_SEVERITY
            && world.rng.chance(self.enforcement_capacity)
        {
            world
                .regulatory
                .revoke_approval(application, tick, "post-market surveillance finding")?;
            self.core
                .record_history(tick, format!("revoked {application}"));
            Some(EnforcementKind::Revocation)
        } else if severity > SUSPENSION_SEVERITY {
            self.core
                .record_history(tick, format!("suspended {application}"));
            Some(EnforcementKind::Suspension)
        } else if severity > FINE_SEVERITY {
            Some(EnforcementKind::Fine {
                amount: severity * 10.0,
            })
        } else if severity > WARNING_SEVERITY {
            Some(EnforcementKind::Warning)
        } else {
            None
        };
        if let Some(action) = action {
            info!(regulator = %self.core.id(), %application, ?action, "enforcement");
            actions.enforcement_actions.push(EnforcementAction {
                application,
                action,
            });
        }
        Ok(())
    }
}

impl Actor for RegulatorActor {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn advance(&mut self, tick: Tick, world: &mut WorldView<'_>) -> Result<ActionSet, ActorError> {
        let mut actions = ActionSet::default();
        if !self.review_due(tick) {
            return Ok(actions);
        }
        self.last_review = Some(tick);

        let held: Vec<ApplicationId> = world
            .regulatory
            .approvals_for_region(self.core.region)
            .iter()
            .map(|app| app.id)
            .collect();
        for application in held {
            self.audit(application, tick, world, &mut actions)?;
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::World;
    use sim_core::{DataCategory, ProductId, ProductKind, Technology};
    use sim_regulatory::{OverallStatus, SubmissionRecord};

    fn approved_application(world: &mut World) -> ApplicationId {
        let id = world
            .regulatory
            .submit_application(
                SubmissionRecord {
                    applicant: ActorId(1),
                    product: ProductId(1),
                    kind: ProductKind::Seed,
                    technology: Technology::Conventional,
                    data_quality: [
                        (DataCategory::Safety, 0.95),
                        (DataCategory::Efficacy, 0.95),
                        (DataCategory::Environmental, 0.95),
                    ]
                    .into_iter()
                    .collect(),
                    target_regions: vec![sim_core::Region::NorthAmerica],
                },
                2025,
            )
            .unwrap();
        // Run the clock to a decision. The strong dossier puts the stored
        // probability at the upper clamp, but the draw may still reject;
        // callers branch on the resulting status.
        for tick in 2025..2045 {
            world.regulatory.process_tick(tick, &mut world.rng);
            if world.regulatory.status(id).unwrap() != OverallStatus::UnderReview {
                break;
            }
        }
        id
    }

    #[test]
    fn no_review_before_the_interval_elapses() {
        let mut world = World::new(2);
        let mut regulator = RegulatorActor::new(
            ActorId(10),
            "NA Agency",
            sim_core::Region::NorthAmerica,
            3,
            1.0,
        );
        regulator.advance(2025, &mut world.view()).unwrap();
        assert_eq!(regulator.last_review, Some(2025));
        regulator.advance(2026, &mut world.view()).unwrap();
        assert_eq!(regulator.last_review, Some(2025));
        regulator.advance(2028, &mut world.view()).unwrap();
        assert_eq!(regulator.last_review, Some(2028));
    }

    #[test]
    fn audits_only_touch_approved_applications() {
        let mut world = World::new(4);
        let id = approved_application(&mut world);
        let status = world.regulatory.status(id).unwrap();
        let mut regulator = RegulatorActor::new(
            ActorId(10),
            "NA Agency",
            sim_core::Region::NorthAmerica,
            1,
            1.0,
        );
        // Audit for many rounds; whatever enforcement lands, the application
        // must end approved or revoked, never half-transitioned.
        for tick in 2045..2070 {
            regulator.advance(tick, &mut world.view()).unwrap();
        }
        let end = world.regulatory.status(id).unwrap();
        match status {
            OverallStatus::Approved => {
                assert!(matches!(
                    end,
                    OverallStatus::Approved | OverallStatus::Revoked
                ));
            }
            other => assert_eq!(end, other),
        }
    }

    #[test]
    fn zero_capacity_never_revokes() {
        let mut world = World::new(4);
        let id = approved_application(&mut world);
        let mut regulator = RegulatorActor::new(
            ActorId(10),
            "NA Agency",
            sim_core::Region::NorthAmerica,
            1,
            0.0,
        );
        for tick in 2045..2070 {
            regulator.advance(tick, &mut world.view()).unwrap();
        }
        assert_ne!(world.regulatory.status(id).unwrap(), OverallStatus::Revoked);
    }
}
