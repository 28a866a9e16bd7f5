#![deny(warnings)]

//! Multi-region regulatory approval pipeline.
//!
//! Each application carries one clocked review per targeted region:
//! `Submitted -> UnderReview -> Approved | Rejected`, with `Approved ->
//! Revoked` reachable only through the enforcement path. Review durations and
//! decisions are drawn from the shared seeded RNG; the approval probability is
//! fixed when a review starts and changes afterwards only through policy
//! events.

use serde::{Deserialize, Serialize};
use sim_core::{
    ActorId, ApplicationId, DataCategory, ProductId, ProductKind, Region, SimRng, Technology,
    Tick, ValidationError,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Stored per-region probabilities are kept away from certainty so that no
/// jurisdiction is a guaranteed pass or fail.
pub const MIN_APPROVAL_PROBABILITY: f64 = 0.05;
pub const MAX_APPROVAL_PROBABILITY: f64 = 0.95;

#[derive(Debug, Error)]
pub enum RegulatoryError {
    #[error("application {0} is not registered")]
    UnknownApplication(ApplicationId),
    #[error("region {0} is not configured")]
    UnknownRegion(Region),
    #[error("application targets no configured region")]
    NoTargetRegions,
    #[error("application {0} holds no approval to revoke")]
    NotApproved(ApplicationId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Review parameters of one jurisdiction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionParams {
    /// Mean review duration in years (>= 1).
    pub review_years_mean: f64,
    pub review_years_std: f64,
    /// Base approval probability in [0, 1] before data and technology
    /// adjustments.
    pub base_approval_probability: f64,
    /// Minimum data-quality score per category.
    pub data_requirements: BTreeMap<DataCategory, f64>,
    /// Per-technology stringency multipliers on the base probability.
    pub tech_multipliers: BTreeMap<Technology, f64>,
}

/// Validate one region's parameters.
pub fn validate_region_params(params: &RegionParams) -> Result<(), ValidationError> {
    if !params.review_years_mean.is_finite() || !params.review_years_std.is_finite() {
        return Err(ValidationError::NonFinite("review duration"));
    }
    if params.review_years_mean < 1.0 {
        return Err(ValidationError::ReviewMeanTooShort(params.review_years_mean));
    }
    if !(0.0..=1.0).contains(&params.base_approval_probability) {
        return Err(ValidationError::OutOfUnitRange("base approval probability"));
    }
    Ok(())
}

/// State of one region's review of one application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReviewStatus {
    Submitted,
    UnderReview,
    Approved { tick: Tick },
    Rejected { tick: Tick },
    Revoked { tick: Tick },
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Submitted | ReviewStatus::UnderReview)
    }
}

/// One region's clocked review.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionReview {
    pub status: ReviewStatus,
    pub years_remaining: u32,
    /// Probability fixed at review start; recomputed only by policy changes.
    pub approval_probability: f64,
}

/// Application-level status derived from the per-region reviews.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    UnderReview,
    Approved,
    Rejected,
    Revoked,
}

/// A regulatory application and its per-region reviews.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: ActorId,
    pub product: ProductId,
    pub kind: ProductKind,
    pub technology: Technology,
    pub submitted_tick: Tick,
    /// Data-quality scores per dossier category, each in [0, 1].
    pub data_quality: BTreeMap<DataCategory, f64>,
    pub reviews: BTreeMap<Region, RegionReview>,
    /// Reason recorded when an approval is revoked.
    pub revocation_reason: Option<String>,
}

impl Application {
    /// Any approved region approves the application; all regions rejected
    /// rejects it; a revocation (with no surviving approval) marks it
    /// revoked; anything else is still under review.
    pub fn overall_status(&self) -> OverallStatus {
        let mut all_rejected = true;
        let mut any_revoked = false;
        for review in self.reviews.values() {
            match review.status {
                ReviewStatus::Approved { .. } => return OverallStatus::Approved,
                ReviewStatus::Revoked { .. } => any_revoked = true,
                ReviewStatus::Rejected { .. } => {}
                ReviewStatus::Submitted | ReviewStatus::UnderReview => all_rejected = false,
            }
        }
        if any_revoked {
            OverallStatus::Revoked
        } else if all_rejected {
            OverallStatus::Rejected
        } else {
            OverallStatus::UnderReview
        }
    }

    pub fn approved_regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.reviews.iter().filter_map(|(region, review)| {
            matches!(review.status, ReviewStatus::Approved { .. }).then_some(*region)
        })
    }
}

/// What an applicant files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub applicant: ActorId,
    pub product: ProductId,
    pub kind: ProductKind,
    pub technology: Technology,
    pub data_quality: BTreeMap<DataCategory, f64>,
    pub target_regions: Vec<Region>,
}

/// A policy event's mutation of one region's parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyChange {
    pub region: Region,
    pub base_approval_probability: Option<f64>,
    pub review_years_mean: Option<f64>,
    pub tech_multipliers: Option<BTreeMap<Technology, f64>>,
}

/// Per-tick processing counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryTickOutcome {
    /// Region reviews that entered the pipeline this tick.
    pub submitted: usize,
    /// Region reviews still pending after the tick.
    pub under_review: usize,
    /// Approval decisions made this tick.
    pub approved: usize,
    /// Rejection decisions made this tick.
    pub rejected: usize,
}

/// The application registry and per-region review state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegulatoryFramework {
    regions: BTreeMap<Region, RegionParams>,
    applications: BTreeMap<ApplicationId, Application>,
    approved: BTreeSet<ApplicationId>,
    rejected: BTreeSet<ApplicationId>,
    next_application: u64,
}

impl RegulatoryFramework {
    pub fn new(regions: BTreeMap<Region, RegionParams>) -> Result<Self, RegulatoryError> {
        for params in regions.values() {
            validate_region_params(params)?;
        }
        Ok(Self {
            regions,
            applications: BTreeMap::new(),
            approved: BTreeSet::new(),
            rejected: BTreeSet::new(),
            next_application: 1,
        })
    }

    /// Default five-jurisdiction calibration.
    pub fn with_default_regions() -> Self {
        match Self::new(default_regions()) {
            Ok(framework) => framework,
            Err(_) => unreachable!("default region parameters are valid"),
        }
    }

    pub fn region_params(&self, region: Region) -> Result<&RegionParams, RegulatoryError> {
        self.regions
            .get(&region)
            .ok_or(RegulatoryError::UnknownRegion(region))
    }

    pub fn application(&self, id: ApplicationId) -> Result<&Application, RegulatoryError> {
        self.applications
            .get(&id)
            .ok_or(RegulatoryError::UnknownApplication(id))
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.applications.values()
    }

    pub fn status(&self, id: ApplicationId) -> Result<OverallStatus, RegulatoryError> {
        Ok(self.application(id)?.overall_status())
    }

    /// File an application. Unconfigured target regions are skipped with a
    /// warning; filing fails only when no configured region remains.
    pub fn submit_application(
        &mut self,
        record: SubmissionRecord,
        tick: Tick,
    ) -> Result<ApplicationId, RegulatoryError> {
        let mut reviews = BTreeMap::new();
        for region in &record.target_regions {
            if self.regions.contains_key(region) {
                reviews.insert(
                    *region,
                    RegionReview {
                        status: ReviewStatus::Submitted,
                        years_remaining: 0,
                        approval_probability: 0.0,
                    },
                );
            } else {
                warn!(%region, "application targets unconfigured region, skipping");
            }
        }
        if reviews.is_empty() {
            return Err(RegulatoryError::NoTargetRegions);
        }
        let id = ApplicationId(self.next_application);
        self.next_application += 1;
        info!(application = %id, product = %record.product, regions = reviews.len(), "application submitted");
        self.applications.insert(
            id,
            Application {
                id,
                applicant: record.applicant,
                product: record.product,
                kind: record.kind,
                technology: record.technology,
                submitted_tick: tick,
                data_quality: record.data_quality,
                reviews,
                revocation_reason: None,
            },
        );
        Ok(id)
    }

    /// Advance every pending region review by one year.
    ///
    /// Freshly submitted reviews draw their duration and probability; running
    /// clocks decrement, and a clock reaching zero resolves with one
    /// Bernoulli draw against the stored probability.
    pub fn process_tick(&mut self, tick: Tick, rng: &mut SimRng) -> RegulatoryTickOutcome {
        let mut outcome = RegulatoryTickOutcome::default();
        for application in self.applications.values_mut() {
            // A revoked application never resumes; any still-pending regional
            // clocks stay frozen so it cannot be reinstated by a late approval.
            if application.overall_status() == OverallStatus::Revoked {
                continue;
            }
            for (region, review) in application.reviews.iter_mut() {
                match review.status {
                    ReviewStatus::Submitted => {
                        let params = match self.regions.get(region) {
                            Some(p) => p,
                            None => continue,
                        };
                        let years = rng
                            .normal(params.review_years_mean, params.review_years_std)
                            .round()
                            .max(1.0) as u32;
                        review.status = ReviewStatus::UnderReview;
                        review.years_remaining = years;
                        review.approval_probability = approval_probability(
                            params,
                            application.technology,
                            &application.data_quality,
                        );
                        outcome.submitted += 1;
                        outcome.under_review += 1;
                        debug!(
                            application = %application.id,
                            %region,
                            years,
                            probability = review.approval_probability,
                            "review started"
                        );
                    }
                    ReviewStatus::UnderReview => {
                        review.years_remaining = review.years_remaining.saturating_sub(1);
                        if review.years_remaining > 0 {
                            outcome.under_review += 1;
                        } else if rng.chance(review.approval_probability) {
                            review.status = ReviewStatus::Approved { tick };
                            outcome.approved += 1;
                            info!(application = %application.id, %region, tick, "approved");
                        } else {
                            review.status = ReviewStatus::Rejected { tick };
                            outcome.rejected += 1;
                            info!(application = %application.id, %region, tick, "rejected");
                        }
                    }
                    _ => {}
                }
            }
            match application.overall_status() {
                OverallStatus::Approved => {
                    self.approved.insert(application.id);
                }
                OverallStatus::Rejected | OverallStatus::Revoked => {
                    self.rejected.insert(application.id);
                }
                OverallStatus::UnderReview => {}
            }
        }
        outcome
    }

    /// Enforcement path: revoke every regional approval of an application.
    ///
    /// Only applications currently holding at least one approval can be
    /// revoked; the application is re-filed as rejected with the reason.
    pub fn revoke_approval(
        &mut self,
        id: ApplicationId,
        tick: Tick,
        reason: impl Into<String>,
    ) -> Result<(), RegulatoryError> {
        let application = self
            .applications
            .get_mut(&id)
            .ok_or(RegulatoryError::UnknownApplication(id))?;
        let mut revoked_any = false;
        for review in application.reviews.values_mut() {
            if matches!(review.status, ReviewStatus::Approved { .. }) {
                review.status = ReviewStatus::Revoked { tick };
                revoked_any = true;
            }
        }
        if !revoked_any {
            return Err(RegulatoryError::NotApproved(id));
        }
        let reason = reason.into();
        warn!(application = %id, tick, %reason, "approval revoked");
        application.revocation_reason = Some(reason);
        self.approved.remove(&id);
        self.rejected.insert(id);
        Ok(())
    }

    /// Apply a policy change: mutate the region's parameters and recompute
    /// the stored probability of every still-pending review in that region.
    pub fn apply_policy_change(&mut self, change: &PolicyChange) -> Result<(), RegulatoryError> {
        let params = self
            .regions
            .get_mut(&change.region)
            .ok_or(RegulatoryError::UnknownRegion(change.region))?;
        if let Some(p) = change.base_approval_probability {
            params.base_approval_probability = p.clamp(0.0, 1.0);
        }
        if let Some(mean) = change.review_years_mean {
            params.review_years_mean = mean.max(1.0);
        }
        if let Some(multipliers) = &change.tech_multipliers {
            params.tech_multipliers = multipliers.clone();
        }
        let params = params.clone();
        let mut recomputed = 0usize;
        for application in self.applications.values_mut() {
            if let Some(review) = application.reviews.get_mut(&change.region) {
                if review.status == ReviewStatus::UnderReview {
                    review.approval_probability = approval_probability(
                        &params,
                        application.technology,
                        &application.data_quality,
                    );
                    recomputed += 1;
                }
            }
        }
        info!(region = %change.region, recomputed, "policy change applied");
        Ok(())
    }

    /// Applications currently approved somewhere.
    pub fn approved_applications(&self) -> impl Iterator<Item = &Application> {
        self.approved.iter().filter_map(|id| self.applications.get(id))
    }

    /// Applications approved in a specific region.
    pub fn approvals_for_region(&self, region: Region) -> Vec<&Application> {
        self.approved_applications()
            .filter(|app| {
                app.reviews
                    .get(&region)
                    .is_some_and(|r| matches!(r.status, ReviewStatus::Approved { .. }))
            })
            .collect()
    }

    /// All applications filed for a product, newest last.
    pub fn applications_for_product(&self, product: ProductId) -> Vec<&Application> {
        self.applications
            .values()
            .filter(|app| app.product == product)
            .collect()
    }

    pub fn is_approved(&self, id: ApplicationId) -> bool {
        self.approved.contains(&id)
    }
}

/// Effective approval probability for one region review.
///
/// Starts from the region base times the technology stringency multiplier,
/// then adjusts by the dossier quality factor `prod(quality / required)`:
/// exceeding requirements earns a diminishing-returns bonus, falling short
/// scales the probability down. The result is clamped to
/// [[`MIN_APPROVAL_PROBABILITY`], [`MAX_APPROVAL_PROBABILITY`]].
pub fn approval_probability(
    params: &RegionParams,
    technology: Technology,
    data_quality: &BTreeMap<DataCategory, f64>,
) -> f64 {
    let multiplier = params.tech_multipliers.get(&technology).copied().unwrap_or(1.0);
    let base = params.base_approval_probability * multiplier;
    let mut data_factor = 1.0;
    for (category, required) in &params.data_requirements {
        if *required <= 0.0 {
            continue;
        }
        if let Some(quality) = data_quality.get(category) {
            data_factor *= quality / required;
        }
    }
    let adjusted = if data_factor > 1.0 {
        base + (1.0 - base) * (1.0 - 1.0 / data_factor)
    } else {
        base * data_factor
    };
    adjusted.clamp(MIN_APPROVAL_PROBABILITY, MAX_APPROVAL_PROBABILITY)
}

/// Default five-jurisdiction calibration: North America is the fastest and
/// most permissive, Europe the slowest and strictest.
pub fn default_regions() -> BTreeMap<Region, RegionParams> {
    let params = |mean: f64, std: f64, base: f64, reqs: [f64; 3], gene: f64, trans: f64| {
        RegionParams {
            review_years_mean: mean,
            review_years_std: std,
            base_approval_probability: base,
            data_requirements: [
                (DataCategory::Safety, reqs[0]),
                (DataCategory::Efficacy, reqs[1]),
                (DataCategory::Environmental, reqs[2]),
            ]
            .into_iter()
            .collect(),
            tech_multipliers: [
                (Technology::Conventional, 1.0),
                (Technology::GeneEditing, gene),
                (Technology::Transgenic, trans),
            ]
            .into_iter()
            .collect(),
        }
    };
    [
        (
            Region::NorthAmerica,
            params(3.0, 1.0, 0.8, [0.7, 0.6, 0.5], 0.95, 0.9),
        ),
        (
            Region::Europe,
            params(4.5, 1.2, 0.6, [0.9, 0.7, 0.8], 0.7, 0.5),
        ),
        (
            Region::Asia,
            params(3.6, 1.1, 0.7, [0.8, 0.8, 0.6], 0.85, 0.75),
        ),
        (
            Region::SouthAmerica,
            params(3.3, 1.0, 0.75, [0.7, 0.7, 0.7], 0.9, 0.85),
        ),
        (
            Region::Africa,
            params(4.0, 1.3, 0.65, [0.7, 0.6, 0.7], 0.8, 0.7),
        ),
    ]
    .into_iter()
    .collect()
}
