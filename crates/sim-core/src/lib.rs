#![deny(warnings)]

//! Core domain models and invariants for the agri-biotech industry simulation.
//!
//! This crate defines the serializable types shared across the simulation
//! (regions, segments, technologies, actor records) together with
//! validation helpers that guarantee basic invariants at construction time,
//! and the seeded random-variate source every subsystem draws from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub mod actor;
pub mod rng;
pub mod technology;

pub use actor::{ActorCore, ActorKind, HistoryEntry};
pub use rng::SimRng;
pub use technology::{TechnologyPipeline, TechnologyState};

/// One simulation tick is one calendar year.
pub type Tick = u32;

/// Unique identifier for an actor in the population.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ActorId(pub u64);

/// Unique identifier for a product registered with the market model.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ProductId(pub u64);

/// Unique identifier for a regulatory application.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prod-{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app-{}", self.0)
    }
}

/// Geographic market and jurisdiction regions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    Europe,
    Asia,
    SouthAmerica,
    Africa,
}

impl Region {
    /// All regions in a stable order.
    pub const ALL: [Region; 5] = [
        Region::NorthAmerica,
        Region::Europe,
        Region::Asia,
        Region::SouthAmerica,
        Region::Africa,
    ];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::NorthAmerica => "north_america",
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::SouthAmerica => "south_america",
            Region::Africa => "africa",
        };
        f.write_str(s)
    }
}

/// Breeding/engineering platform behind a product.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    Conventional,
    GeneEditing,
    Transgenic,
}

impl Technology {
    pub const ALL: [Technology; 3] = [
        Technology::Conventional,
        Technology::GeneEditing,
        Technology::Transgenic,
    ];
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Technology::Conventional => "conventional",
            Technology::GeneEditing => "gene_editing",
            Technology::Transgenic => "transgenic",
        };
        f.write_str(s)
    }
}

/// Kinds of commercial biotech products.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Seed,
    CropProtection,
    Biostimulant,
}

/// Addressable market segments.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SegmentId {
    RowCrops,
    SpecialtyCrops,
    Biofuels,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentId::RowCrops => "row_crops",
            SegmentId::SpecialtyCrops => "specialty_crops",
            SegmentId::Biofuels => "biofuels",
        };
        f.write_str(s)
    }
}

/// Data categories a regulator scores an application dossier on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Safety,
    Efficacy,
    Environmental,
}

/// A commercial trait carried by a product, with its numeric value score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    pub name: String,
    /// Value score (>= 0); feeds price premia and attractiveness.
    pub value: f64,
}

impl TraitSpec {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A targetable market segment with demand characteristics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketSegment {
    pub id: SegmentId,
    /// Segment size in USD at the simulation start tick (> 0).
    pub base_size_usd: f64,
    /// Annual compound growth rate (e.g., 0.02 = 2%).
    pub growth_rate: f64,
    /// Price sensitivity in [0, 1].
    pub price_sensitivity: f64,
    /// Regional share weights; must sum to ~1.
    pub region_weights: BTreeMap<Region, f64>,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(&'static str),
    /// Monetary or size values must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    /// Probability or fraction outside [0, 1].
    #[error("{0} must be within [0, 1]")]
    OutOfUnitRange(&'static str),
    /// Regional weights of a segment must sum to ~1.
    #[error("segment {segment} region weights sum to {sum}, expected ~1")]
    WeightsNotNormalized { segment: SegmentId, sum: f64 },
    /// Review duration parameters must allow a >= 1 year clock.
    #[error("review duration mean must be >= 1 year, got {0}")]
    ReviewMeanTooShort(f64),
    /// Simulation horizon must not be empty.
    #[error("end tick {end} precedes start tick {start}")]
    EmptyHorizon { start: Tick, end: Tick },
}

/// Tolerance applied when checking that region weights sum to 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate a market segment's parameters.
pub fn validate_segment(segment: &MarketSegment) -> Result<(), ValidationError> {
    if !segment.base_size_usd.is_finite() || !segment.growth_rate.is_finite() {
        return Err(ValidationError::NonFinite("segment size/growth"));
    }
    if segment.base_size_usd <= 0.0 {
        return Err(ValidationError::NonPositive("segment base size"));
    }
    if !(0.0..=1.0).contains(&segment.price_sensitivity) {
        return Err(ValidationError::OutOfUnitRange("price sensitivity"));
    }
    let mut sum = 0.0;
    for (_, w) in &segment.region_weights {
        if !w.is_finite() || *w < 0.0 {
            return Err(ValidationError::NonFinite("region weight"));
        }
        sum += w;
    }
    if (sum - 1.0).abs() > 1e-3 {
        return Err(ValidationError::WeightsNotNormalized {
            segment: segment.id,
            sum,
        });
    }
    Ok(())
}

/// Validate a simulation horizon.
pub fn validate_horizon(start: Tick, end: Tick) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::EmptyHorizon { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn segment(weights: &[(Region, f64)]) -> MarketSegment {
        MarketSegment {
            id: SegmentId::RowCrops,
            base_size_usd: 100_000_000_000.0,
            growth_rate: 0.02,
            price_sensitivity: 0.8,
            region_weights: weights.iter().cloned().collect(),
        }
    }

    #[test]
    fn serde_roundtrip_segment() {
        let s = segment(&[(Region::NorthAmerica, 0.6), (Region::Europe, 0.4)]);
        let json = serde_json::to_string(&s).unwrap();
        let back: MarketSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, SegmentId::RowCrops);
        assert_eq!(back.region_weights.len(), 2);
    }

    #[test]
    fn region_serde_uses_snake_case() {
        let json = serde_json::to_string(&Region::NorthAmerica).unwrap();
        assert_eq!(json, "\"north_america\"");
    }

    #[test]
    fn segment_weights_must_normalize() {
        let bad = segment(&[(Region::NorthAmerica, 0.6), (Region::Europe, 0.6)]);
        assert!(matches!(
            validate_segment(&bad),
            Err(ValidationError::WeightsNotNormalized { .. })
        ));
        let good = segment(&[(Region::NorthAmerica, 0.6), (Region::Europe, 0.4)]);
        assert!(validate_segment(&good).is_ok());
    }

    #[test]
    fn horizon_must_not_be_empty() {
        assert!(validate_horizon(2030, 2025).is_err());
        assert!(validate_horizon(2025, 2025).is_ok());
    }

    proptest! {
        #[test]
        fn positive_sizes_validate(size in 1.0f64..1e12, growth in -0.2f64..0.2) {
            let mut s = segment(&[(Region::NorthAmerica, 1.0)]);
            s.base_size_usd = size;
            s.growth_rate = growth;
            prop_assert!(validate_segment(&s).is_ok());
        }

        #[test]
        fn nonpositive_sizes_rejected(size in -1e9f64..=0.0) {
            let mut s = segment(&[(Region::NorthAmerica, 1.0)]);
            s.base_size_usd = size;
            prop_assert!(validate_segment(&s).is_err());
        }
    }
}
