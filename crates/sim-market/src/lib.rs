#![deny(warnings)]

//! Competitive market model: pricing, logistic adoption, attractiveness-based
//! share allocation, and per-tick sales aggregation.
//!
//! Prices and adoption rates are pure functions of the model state at a tick;
//! [`MarketModel::simulate_tick`] evaluates them for every registered product
//! and region, records the samples on the product's sparse series, and returns
//! the aggregated [`MarketTickSummary`].

use serde::{Deserialize, Serialize};
use sim_core::{
    validate_segment, ActorId, MarketSegment, ProductId, ProductKind, Region, SegmentId,
    Technology, Tick, TraitSpec,
};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Years after launch at which adoption reaches half of its ceiling.
const ADOPTION_MIDPOINT_YEARS: f64 = 5.0;
/// Price premium per trait value point.
const TRAIT_PRICE_PREMIUM: f64 = 0.05;
/// Attractiveness bonus per trait value point.
const TRAIT_ATTRACTIVENESS_BONUS: f64 = 0.1;
/// Discount step per same-kind competitor, capped below.
const COMPETITOR_DISCOUNT_STEP: f64 = 0.05;
const MAX_COMPETITION_DISCOUNT: f64 = 0.5;
/// Fallbacks when a product references unparameterized kinds or regions.
const DEFAULT_BASE_PRICE: f64 = 100.0;
const DEFAULT_MAX_ADOPTION: f64 = 0.7;
const DEFAULT_ADOPTION_RATE: f64 = 0.1;
const DEFAULT_REGION_WEIGHT: f64 = 0.2;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("product {0} is not registered in the market model")]
    UnknownProduct(ProductId),
    #[error("market segment {0} is not configured")]
    UnknownSegment(SegmentId),
    #[error(transparent)]
    Validation(#[from] sim_core::ValidationError),
}

/// Logistic adoption curve for one (segment, technology) pair.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct AdoptionCurve {
    /// Adoption ceiling in [0, 1].
    pub max_adoption: f64,
    /// Steepness of the S-curve.
    pub rate: f64,
}

/// Parameters describing how a product is offered to the market.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSpec {
    pub owner: ActorId,
    pub name: String,
    pub segment: SegmentId,
    pub technology: Technology,
    pub kind: ProductKind,
    pub traits: Vec<TraitSpec>,
    pub launch_tick: Tick,
}

/// Price, adoption, sales, and share observed for one product in one region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSample {
    pub price: f64,
    pub adoption: f64,
    pub sales: f64,
    pub share: f64,
}

/// A registered product with its sparse per-tick observation series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub owner: ActorId,
    pub name: String,
    pub segment: SegmentId,
    pub technology: Technology,
    pub kind: ProductKind,
    pub traits: Vec<TraitSpec>,
    pub launch_tick: Tick,
    /// Regulatory multipliers on adoption, keyed by region. Absent = 1.0.
    regulatory_impact: BTreeMap<Region, f64>,
    /// Samples recorded by `simulate_tick`, sparse over ticks.
    series: BTreeMap<Tick, BTreeMap<Region, RegionSample>>,
}

impl Product {
    fn trait_value(&self) -> f64 {
        self.traits.iter().map(|t| t.value).sum()
    }

    pub fn sample(&self, tick: Tick, region: Region) -> Option<RegionSample> {
        self.series.get(&tick).and_then(|m| m.get(&region)).copied()
    }

    /// Recorded samples in tick order.
    pub fn series(&self) -> impl Iterator<Item = (Tick, &BTreeMap<Region, RegionSample>)> {
        self.series.iter().map(|(tick, samples)| (*tick, samples))
    }
}

/// Aggregated market outcome for one tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MarketTickSummary {
    pub tick: Tick,
    pub total_sales: f64,
    pub regional_sales: BTreeMap<Region, f64>,
    pub segment_sales: BTreeMap<SegmentId, f64>,
    pub product_sales: BTreeMap<ProductId, f64>,
    /// Per-product, per-region share snapshot.
    pub shares: BTreeMap<ProductId, BTreeMap<Region, f64>>,
    /// Mean of strictly positive prices observed this tick.
    pub average_price: f64,
}

/// The market model: segments, parameter tables, and the product registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketModel {
    start_tick: Tick,
    segments: BTreeMap<SegmentId, MarketSegment>,
    adoption_curves: BTreeMap<SegmentId, BTreeMap<Technology, AdoptionCurve>>,
    base_prices: BTreeMap<ProductKind, f64>,
    regional_factors: BTreeMap<Region, f64>,
    /// How strongly one technology's products compete with another's.
    competition_matrix: BTreeMap<Technology, BTreeMap<Technology, f64>>,
    products: BTreeMap<ProductId, Product>,
    next_product: u64,
}

impl MarketModel {
    /// Build a model from validated segments; other tables start at the
    /// default calibration and can be replaced afterwards.
    pub fn new(start_tick: Tick, segments: Vec<MarketSegment>) -> Result<Self, MarketError> {
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self {
            start_tick,
            segments: segments.into_iter().map(|s| (s.id, s)).collect(),
            adoption_curves: default_adoption_curves(),
            base_prices: default_base_prices(),
            regional_factors: default_regional_factors(),
            competition_matrix: default_competition_matrix(),
            products: BTreeMap::new(),
            next_product: 1,
        })
    }

    /// Default three-segment calibration.
    pub fn with_default_segments(start_tick: Tick) -> Self {
        // Default segments are hand-normalized; validation cannot fail.
        match Self::new(start_tick, default_segments()) {
            Ok(model) => model,
            Err(_) => unreachable!("default segments are normalized"),
        }
    }

    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    pub fn product(&self, id: ProductId) -> Result<&Product, MarketError> {
        self.products.get(&id).ok_or(MarketError::UnknownProduct(id))
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn segment(&self, id: SegmentId) -> Result<&MarketSegment, MarketError> {
        self.segments.get(&id).ok_or(MarketError::UnknownSegment(id))
    }

    /// Register a product; it contributes no sales before its launch tick.
    pub fn register_product(&mut self, spec: ProductSpec) -> Result<ProductId, MarketError> {
        if !self.segments.contains_key(&spec.segment) {
            return Err(MarketError::UnknownSegment(spec.segment));
        }
        let id = ProductId(self.next_product);
        self.next_product += 1;
        debug!(product = %id, name = %spec.name, segment = %spec.segment, "product registered");
        self.products.insert(
            id,
            Product {
                id,
                owner: spec.owner,
                name: spec.name,
                segment: spec.segment,
                technology: spec.technology,
                kind: spec.kind,
                traits: spec.traits,
                launch_tick: spec.launch_tick,
                regulatory_impact: BTreeMap::new(),
                series: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// Set the regulatory multiplier applied to a product's adoption in a
    /// region (1.0 = neutral, 0.0 = blocked).
    pub fn set_regulatory_impact(
        &mut self,
        id: ProductId,
        region: Region,
        multiplier: f64,
    ) -> Result<(), MarketError> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or(MarketError::UnknownProduct(id))?;
        product.regulatory_impact.insert(region, multiplier.max(0.0));
        Ok(())
    }

    /// Unit price for a product in a region at a tick.
    ///
    /// price = base(kind) * technology premium * (1 + trait value * 0.05)
    ///         * regional factor * (1 - competition discount)
    pub fn price(&self, id: ProductId, tick: Tick, region: Region) -> Result<f64, MarketError> {
        let product = self.product(id)?;
        let base = self
            .base_prices
            .get(&product.kind)
            .copied()
            .unwrap_or(DEFAULT_BASE_PRICE);
        let premium = technology_premium(product.technology);
        let trait_premium = 1.0 + product.trait_value() * TRAIT_PRICE_PREMIUM;
        let regional = self.regional_factors.get(&region).copied().unwrap_or(1.0);
        let discount = self.competition_discount(product);
        let _ = tick; // prices are tick-invariant in the current calibration
        Ok(base * premium * trait_premium * regional * (1.0 - discount))
    }

    /// Discount from same-kind competitors, scaled by the mean cross-technology
    /// competition factor. Always within [0, MAX_COMPETITION_DISCOUNT].
    pub fn competition_discount(&self, product: &Product) -> f64 {
        let same_kind = self
            .products
            .values()
            .filter(|p| p.id != product.id && p.kind == product.kind)
            .count();
        let base = (same_kind as f64 * COMPETITOR_DISCOUNT_STEP).min(MAX_COMPETITION_DISCOUNT);
        let Some(row) = self.competition_matrix.get(&product.technology) else {
            return base;
        };
        let factors: Vec<f64> = self
            .products
            .values()
            .filter(|p| p.id != product.id)
            .filter_map(|p| row.get(&p.technology).copied())
            .collect();
        if factors.is_empty() {
            base
        } else {
            base * factors.iter().sum::<f64>() / factors.len() as f64
        }
    }

    /// Adoption rate in [0, 1]: zero before launch, then a logistic curve in
    /// years since launch, scaled by the segment's regional weight and the
    /// product's regulatory multiplier for the region.
    pub fn adoption_rate(
        &self,
        id: ProductId,
        tick: Tick,
        region: Region,
    ) -> Result<f64, MarketError> {
        let product = self.product(id)?;
        if tick < product.launch_tick {
            return Ok(0.0);
        }
        let curve = self.adoption_curve(product.segment, product.technology);
        let years = (tick - product.launch_tick) as f64;
        let logistic =
            curve.max_adoption / (1.0 + (-curve.rate * (years - ADOPTION_MIDPOINT_YEARS)).exp());
        let weight = self
            .segments
            .get(&product.segment)
            .and_then(|s| s.region_weights.get(&region).copied())
            .unwrap_or(DEFAULT_REGION_WEIGHT);
        let impact = product.regulatory_impact.get(&region).copied().unwrap_or(1.0);
        Ok(logistic * weight * impact)
    }

    fn adoption_curve(&self, segment: SegmentId, technology: Technology) -> AdoptionCurve {
        self.adoption_curves
            .get(&segment)
            .and_then(|m| m.get(&technology))
            .copied()
            .unwrap_or(AdoptionCurve {
                max_adoption: DEFAULT_MAX_ADOPTION,
                rate: DEFAULT_ADOPTION_RATE,
            })
    }

    /// Market share among products of the same segment, allocated by relative
    /// attractiveness. Shares across a segment sum to 1 in every region with
    /// at least one product; a lone product takes the whole segment.
    pub fn market_share(
        &self,
        id: ProductId,
        tick: Tick,
        region: Region,
    ) -> Result<f64, MarketError> {
        let product = self.product(id)?;
        let competitors: Vec<&Product> = self
            .products
            .values()
            .filter(|p| p.segment == product.segment)
            .collect();
        if competitors.len() == 1 {
            return Ok(1.0);
        }
        let mut own = 0.0;
        let mut total = 0.0;
        for p in &competitors {
            let a = self.attractiveness(p, tick, region)?;
            if p.id == id {
                own = a;
            }
            total += a;
        }
        if total > 0.0 {
            Ok(own / total)
        } else {
            Ok(1.0 / competitors.len() as f64)
        }
    }

    fn attractiveness(
        &self,
        product: &Product,
        tick: Tick,
        region: Region,
    ) -> Result<f64, MarketError> {
        let adoption = self.adoption_rate(product.id, tick, region)?;
        let price = self.price(product.id, tick, region)?;
        let price_factor = 1.0 / price.max(1.0);
        let trait_factor = 1.0 + product.trait_value() * TRAIT_ATTRACTIVENESS_BONUS;
        Ok(adoption * price_factor * trait_factor)
    }

    /// Segment size apportioned to a region at a tick, compounding growth
    /// from the model's start tick.
    pub fn regional_market_size(
        &self,
        segment: SegmentId,
        tick: Tick,
        region: Region,
    ) -> Result<f64, MarketError> {
        let seg = self.segment(segment)?;
        let years = tick.saturating_sub(self.start_tick) as f64;
        let size = seg.base_size_usd * (1.0 + seg.growth_rate).powf(years);
        let weight = seg
            .region_weights
            .get(&region)
            .copied()
            .unwrap_or(DEFAULT_REGION_WEIGHT);
        Ok(size * weight)
    }

    /// Sales revenue for a product in a region at a tick.
    pub fn sales(&self, id: ProductId, tick: Tick, region: Region) -> Result<f64, MarketError> {
        let product = self.product(id)?;
        let market = self.regional_market_size(product.segment, tick, region)?;
        let adoption = self.adoption_rate(id, tick, region)?;
        let share = self.market_share(id, tick, region)?;
        Ok(market * adoption * share)
    }

    /// Soft-fail price lookup: logs and reports 0.0 for unknown products.
    pub fn price_or_default(&self, id: ProductId, tick: Tick, region: Region) -> f64 {
        self.price(id, tick, region).unwrap_or_else(|err| {
            warn!(product = %id, %err, "price lookup failed");
            0.0
        })
    }

    /// Soft-fail adoption lookup: logs and reports 0.0 for unknown products.
    pub fn adoption_or_default(&self, id: ProductId, tick: Tick, region: Region) -> f64 {
        self.adoption_rate(id, tick, region).unwrap_or_else(|err| {
            warn!(product = %id, %err, "adoption lookup failed");
            0.0
        })
    }

    /// Evaluate every product in every region, record the samples on the
    /// product series, and aggregate totals.
    pub fn simulate_tick(&mut self, tick: Tick) -> MarketTickSummary {
        let mut summary = MarketTickSummary {
            tick,
            ..MarketTickSummary::default()
        };
        for region in Region::ALL {
            summary.regional_sales.insert(region, 0.0);
        }
        for id in self.segments.keys() {
            summary.segment_sales.insert(*id, 0.0);
        }

        let ids: Vec<ProductId> = self.products.keys().copied().collect();
        let mut price_sum = 0.0;
        let mut price_count = 0usize;
        for id in ids {
            let segment = match self.product(id) {
                Ok(p) => p.segment,
                Err(_) => continue,
            };
            let mut product_total = 0.0;
            let mut samples: BTreeMap<Region, RegionSample> = BTreeMap::new();
            for region in Region::ALL {
                // Registered products cannot miss here; fall back to zeros
                // rather than aborting the tick.
                let price = self.price_or_default(id, tick, region);
                let adoption = self.adoption_or_default(id, tick, region);
                let share = self.market_share(id, tick, region).unwrap_or(0.0);
                let sales = self.sales(id, tick, region).unwrap_or(0.0);
                if price > 0.0 {
                    price_sum += price;
                    price_count += 1;
                }
                product_total += sales;
                *summary.regional_sales.entry(region).or_insert(0.0) += sales;
                summary
                    .shares
                    .entry(id)
                    .or_default()
                    .insert(region, share);
                samples.insert(
                    region,
                    RegionSample {
                        price,
                        adoption,
                        sales,
                        share,
                    },
                );
            }
            if let Some(product) = self.products.get_mut(&id) {
                product.series.insert(tick, samples);
            }
            summary.product_sales.insert(id, product_total);
            *summary.segment_sales.entry(segment).or_insert(0.0) += product_total;
            summary.total_sales += product_total;
        }
        summary.average_price = if price_count > 0 {
            price_sum / price_count as f64
        } else {
            0.0
        };
        debug!(
            tick,
            total_sales = summary.total_sales,
            products = summary.product_sales.len(),
            "market tick simulated"
        );
        summary
    }

    /// Event hook: replace a segment's annual growth rate.
    pub fn apply_growth_change(&mut self, segment: SegmentId, growth_rate: f64) {
        match self.segments.get_mut(&segment) {
            Some(seg) => seg.growth_rate = growth_rate,
            None => warn!(%segment, "growth change for unconfigured segment ignored"),
        }
    }

    /// Event hook: scale a segment's base size (demand expansion or collapse).
    pub fn apply_size_multiplier(&mut self, segment: SegmentId, multiplier: f64) {
        match self.segments.get_mut(&segment) {
            Some(seg) => seg.base_size_usd *= multiplier.max(0.0),
            None => warn!(%segment, "size multiplier for unconfigured segment ignored"),
        }
    }

    /// Event hook: scale a region's price factor (supply shock or subsidy).
    pub fn apply_regional_shock(&mut self, region: Region, multiplier: f64) {
        let factor = self.regional_factors.entry(region).or_insert(1.0);
        *factor *= multiplier.max(0.0);
    }
}

fn technology_premium(technology: Technology) -> f64 {
    match technology {
        Technology::Conventional => 1.0,
        Technology::GeneEditing => 1.2,
        Technology::Transgenic => 1.3,
    }
}

/// Default three-segment calibration (sizes in USD, weights normalized).
pub fn default_segments() -> Vec<MarketSegment> {
    vec![
        MarketSegment {
            id: SegmentId::RowCrops,
            base_size_usd: 100_000_000_000.0,
            growth_rate: 0.02,
            price_sensitivity: 0.8,
            region_weights: [
                (Region::NorthAmerica, 0.35),
                (Region::Europe, 0.15),
                (Region::Asia, 0.25),
                (Region::SouthAmerica, 0.2),
                (Region::Africa, 0.05),
            ]
            .into_iter()
            .collect(),
        },
        MarketSegment {
            id: SegmentId::SpecialtyCrops,
            base_size_usd: 50_000_000_000.0,
            growth_rate: 0.04,
            price_sensitivity: 0.6,
            region_weights: [
                (Region::NorthAmerica, 0.3),
                (Region::Europe, 0.25),
                (Region::Asia, 0.2),
                (Region::SouthAmerica, 0.15),
                (Region::Africa, 0.1),
            ]
            .into_iter()
            .collect(),
        },
        MarketSegment {
            id: SegmentId::Biofuels,
            base_size_usd: 30_000_000_000.0,
            growth_rate: 0.05,
            price_sensitivity: 0.9,
            region_weights: [
                (Region::NorthAmerica, 0.4),
                (Region::Europe, 0.3),
                (Region::Asia, 0.15),
                (Region::SouthAmerica, 0.1),
                (Region::Africa, 0.05),
            ]
            .into_iter()
            .collect(),
        },
    ]
}

fn default_adoption_curves() -> BTreeMap<SegmentId, BTreeMap<Technology, AdoptionCurve>> {
    let curve = |max_adoption, rate| AdoptionCurve { max_adoption, rate };
    [
        (
            SegmentId::RowCrops,
            [
                (Technology::Conventional, curve(0.95, 0.1)),
                (Technology::GeneEditing, curve(0.8, 0.15)),
                (Technology::Transgenic, curve(0.7, 0.12)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            SegmentId::SpecialtyCrops,
            [
                (Technology::Conventional, curve(0.9, 0.08)),
                (Technology::GeneEditing, curve(0.75, 0.1)),
                (Technology::Transgenic, curve(0.6, 0.09)),
            ]
            .into_iter()
            .collect(),
        ),
        (
            SegmentId::Biofuels,
            [
                (Technology::Conventional, curve(0.85, 0.12)),
                (Technology::GeneEditing, curve(0.9, 0.18)),
                (Technology::Transgenic, curve(0.8, 0.15)),
            ]
            .into_iter()
            .collect(),
        ),
    ]
    .into_iter()
    .collect()
}

fn default_base_prices() -> BTreeMap<ProductKind, f64> {
    [
        (ProductKind::Seed, 100.0),
        (ProductKind::CropProtection, 50.0),
        (ProductKind::Biostimulant, 30.0),
    ]
    .into_iter()
    .collect()
}

fn default_regional_factors() -> BTreeMap<Region, f64> {
    [
        (Region::NorthAmerica, 1.2),
        (Region::Europe, 1.0),
        (Region::Asia, 1.5),
        (Region::SouthAmerica, 1.3),
        (Region::Africa, 0.8),
    ]
    .into_iter()
    .collect()
}

fn default_competition_matrix() -> BTreeMap<Technology, BTreeMap<Technology, f64>> {
    [
        (
            Technology::Conventional,
            [
                (Technology::Conventional, 1.0),
                (Technology::GeneEditing, 0.7),
                (Technology::Transgenic, 0.5),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Technology::GeneEditing,
            [
                (Technology::Conventional, 0.8),
                (Technology::GeneEditing, 1.0),
                (Technology::Transgenic, 0.6),
            ]
            .into_iter()
            .collect(),
        ),
        (
            Technology::Transgenic,
            [
                (Technology::Conventional, 0.6),
                (Technology::GeneEditing, 0.7),
                (Technology::Transgenic, 1.0),
            ]
            .into_iter()
            .collect(),
        ),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> MarketModel {
        MarketModel::with_default_segments(2025)
    }

    fn spec(name: &str, traits: Vec<TraitSpec>, launch: Tick) -> ProductSpec {
        ProductSpec {
            owner: ActorId(1),
            name: name.to_string(),
            segment: SegmentId::RowCrops,
            technology: Technology::GeneEditing,
            kind: ProductKind::Seed,
            traits,
            launch_tick: launch,
        }
    }

    #[test]
    fn unknown_product_is_an_error() {
        let m = model();
        assert!(matches!(
            m.price(ProductId(99), 2025, Region::Europe),
            Err(MarketError::UnknownProduct(_))
        ));
        assert_eq!(m.price_or_default(ProductId(99), 2025, Region::Europe), 0.0);
    }

    #[test]
    fn registration_requires_known_segment() {
        let mut m = MarketModel::new(
            2025,
            vec![default_segments().remove(0)], // row crops only
        )
        .unwrap();
        let mut s = spec("x", vec![], 2025);
        s.segment = SegmentId::Biofuels;
        assert!(matches!(
            m.register_product(s),
            Err(MarketError::UnknownSegment(SegmentId::Biofuels))
        ));
    }

    #[test]
    fn lone_product_price_composition() {
        let mut m = model();
        let id = m
            .register_product(spec("drought seed", vec![TraitSpec::new("drought", 2.0)], 2025))
            .unwrap();
        // 100 * 1.2 (gene editing) * 1.1 (trait value 2) * 1.0 (europe), no
        // competitors so no discount.
        let price = m.price(id, 2025, Region::Europe).unwrap();
        assert!((price - 132.0).abs() < 1e-9);
    }

    #[test]
    fn adoption_is_zero_before_launch_and_half_max_at_midpoint() {
        let mut m = model();
        let id = m.register_product(spec("s", vec![], 2027)).unwrap();
        assert_eq!(m.adoption_rate(id, 2026, Region::NorthAmerica).unwrap(), 0.0);
        // Row crops + gene editing: max 0.8; NA weight 0.35; midpoint year 5.
        let mid = m.adoption_rate(id, 2032, Region::NorthAmerica).unwrap();
        assert!((mid - 0.8 / 2.0 * 0.35).abs() < 1e-12);
    }

    #[test]
    fn adoption_is_monotone_after_launch() {
        let mut m = model();
        let id = m.register_product(spec("s", vec![], 2025)).unwrap();
        let mut last = 0.0;
        for tick in 2025..2045 {
            let a = m.adoption_rate(id, tick, Region::Asia).unwrap();
            assert!(a >= last);
            last = a;
        }
        assert!(last > 0.0 && last <= 1.0);
    }

    #[test]
    fn adoption_saturates_toward_its_ceiling() {
        // Single-region segment so the full curve is visible. Row crops +
        // gene editing: max 0.8, rate 0.15.
        let mut segment = default_segments().remove(0);
        segment.region_weights = [(Region::Asia, 1.0)].into_iter().collect();
        let mut m = MarketModel::new(2025, vec![segment]).unwrap();
        let id = m.register_product(spec("s", vec![], 2025)).unwrap();
        let late = m.adoption_rate(id, 2045, Region::Asia).unwrap();
        let expected = 0.8 / (1.0 + (-0.15f64 * 15.0).exp());
        assert!((late - expected).abs() < 1e-12);
        // 20 years in, adoption has closed to within a tenth of the ceiling.
        assert!((0.72..0.8).contains(&late));
    }

    #[test]
    fn regulatory_impact_scales_adoption() {
        let mut m = model();
        let id = m.register_product(spec("s", vec![], 2025)).unwrap();
        let before = m.adoption_rate(id, 2030, Region::Europe).unwrap();
        m.set_regulatory_impact(id, Region::Europe, 0.0).unwrap();
        assert_eq!(m.adoption_rate(id, 2030, Region::Europe).unwrap(), 0.0);
        m.set_regulatory_impact(id, Region::Europe, 1.0).unwrap();
        let after = m.adoption_rate(id, 2030, Region::Europe).unwrap();
        assert!((before - after).abs() < 1e-12);
    }

    #[test]
    fn lone_product_takes_full_share() {
        let mut m = model();
        let id = m.register_product(spec("s", vec![], 2025)).unwrap();
        assert_eq!(m.market_share(id, 2030, Region::Asia).unwrap(), 1.0);
    }

    #[test]
    fn shares_sum_to_one() {
        let mut m = model();
        let a = m.register_product(spec("a", vec![TraitSpec::new("y", 3.0)], 2025)).unwrap();
        let b = m.register_product(spec("b", vec![], 2026)).unwrap();
        let mut c_spec = spec("c", vec![TraitSpec::new("z", 1.0)], 2027);
        c_spec.technology = Technology::Transgenic;
        let c = m.register_product(c_spec).unwrap();
        let sum = m.market_share(a, 2032, Region::Asia).unwrap()
            + m.market_share(b, 2032, Region::Asia).unwrap()
            + m.market_share(c, 2032, Region::Asia).unwrap();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_attractiveness_splits_evenly() {
        let mut m = model();
        // Neither product has launched, so both have zero adoption.
        let a = m.register_product(spec("a", vec![], 2030)).unwrap();
        let b = m.register_product(spec("b", vec![], 2031)).unwrap();
        assert_eq!(m.market_share(a, 2025, Region::Asia).unwrap(), 0.5);
        assert_eq!(m.market_share(b, 2025, Region::Asia).unwrap(), 0.5);
    }

    #[test]
    fn competition_discount_stays_bounded() {
        let mut m = model();
        let first = m.register_product(spec("p0", vec![], 2025)).unwrap();
        for i in 1..20 {
            m.register_product(spec(&format!("p{i}"), vec![], 2025)).unwrap();
        }
        let product = m.product(first).unwrap().clone();
        let discount = m.competition_discount(&product);
        assert!((0.0..=MAX_COMPETITION_DISCOUNT).contains(&discount));
        // 19 same-kind competitors saturate the base discount.
        assert!(discount > 0.0);
    }

    #[test]
    fn simulate_tick_aggregates_consistently() {
        let mut m = model();
        m.register_product(spec("a", vec![TraitSpec::new("t", 1.0)], 2025)).unwrap();
        let mut other = spec("b", vec![], 2025);
        other.segment = SegmentId::Biofuels;
        m.register_product(other).unwrap();
        let summary = m.simulate_tick(2030);
        let regional: f64 = summary.regional_sales.values().sum();
        let by_product: f64 = summary.product_sales.values().sum();
        let by_segment: f64 = summary.segment_sales.values().sum();
        assert!((summary.total_sales - regional).abs() < 1e-6);
        assert!((summary.total_sales - by_product).abs() < 1e-6);
        assert!((summary.total_sales - by_segment).abs() < 1e-6);
        assert!(summary.total_sales > 0.0);
        assert!(summary.average_price > 0.0);
    }

    #[test]
    fn simulate_tick_records_series() {
        let mut m = model();
        let id = m.register_product(spec("a", vec![], 2025)).unwrap();
        m.simulate_tick(2030);
        let sample = m.product(id).unwrap().sample(2030, Region::Asia).unwrap();
        assert!(sample.sales > 0.0);
        assert_eq!(m.product(id).unwrap().sample(2029, Region::Asia), None);
    }

    #[test]
    fn event_hooks_mutate_parameters() {
        let mut m = model();
        let before = m
            .regional_market_size(SegmentId::RowCrops, 2035, Region::Europe)
            .unwrap();
        m.apply_growth_change(SegmentId::RowCrops, 0.1);
        let faster = m
            .regional_market_size(SegmentId::RowCrops, 2035, Region::Europe)
            .unwrap();
        assert!(faster > before);
        m.apply_size_multiplier(SegmentId::RowCrops, 0.5);
        let halved = m
            .regional_market_size(SegmentId::RowCrops, 2035, Region::Europe)
            .unwrap();
        assert!((halved - faster * 0.5).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prices_are_nonnegative(value in 0.0f64..50.0, launch in 2025u32..2035) {
            let mut m = model();
            let id = m
                .register_product(spec("p", vec![TraitSpec::new("t", value)], launch))
                .unwrap();
            for region in Region::ALL {
                prop_assert!(m.price(id, 2030, region).unwrap() >= 0.0);
            }
        }

        #[test]
        fn adoption_stays_in_unit_range(launch in 2025u32..2035, tick in 2025u32..2060) {
            let mut m = model();
            let id = m.register_product(spec("p", vec![], launch)).unwrap();
            for region in Region::ALL {
                let a = m.adoption_rate(id, tick, region).unwrap();
                prop_assert!((0.0..=1.0).contains(&a));
            }
        }
    }
}
