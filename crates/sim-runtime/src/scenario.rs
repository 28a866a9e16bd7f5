//! Prebuilt scenario timelines.
//!
//! A scenario is a named event timeline layered on the baseline world. Every
//! timeline is expressed relative to the run's start tick and clipped to the
//! horizon.

use crate::events::{Event, EventEffect};
use serde::{Deserialize, Serialize};
use sim_core::{Region, SegmentId, Technology, Tick};
use sim_regulatory::PolicyChange;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Baseline,
    RegulatoryHarmonization,
    ClimateCrisis,
    TechBreakthrough,
    MarketDisruption,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Baseline,
        Scenario::RegulatoryHarmonization,
        Scenario::ClimateCrisis,
        Scenario::TechBreakthrough,
        Scenario::MarketDisruption,
    ];

    /// Build this scenario's event timeline, clipped to `[start, end]`.
    pub fn timeline(self, start: Tick, end: Tick) -> Vec<Event> {
        let events = match self {
            Scenario::Baseline => baseline(start),
            Scenario::RegulatoryHarmonization => harmonization(start),
            Scenario::ClimateCrisis => climate_crisis(start),
            Scenario::TechBreakthrough => tech_breakthrough(start),
            Scenario::MarketDisruption => market_disruption(start),
        };
        events
            .into_iter()
            .filter(|event| event.tick >= start && event.tick <= end)
            .collect()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scenario::Baseline => "baseline",
            Scenario::RegulatoryHarmonization => "regulatory_harmonization",
            Scenario::ClimateCrisis => "climate_crisis",
            Scenario::TechBreakthrough => "tech_breakthrough",
            Scenario::MarketDisruption => "market_disruption",
        };
        f.write_str(s)
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(Scenario::Baseline),
            "regulatory_harmonization" => Ok(Scenario::RegulatoryHarmonization),
            "climate_crisis" => Ok(Scenario::ClimateCrisis),
            "tech_breakthrough" => Ok(Scenario::TechBreakthrough),
            "market_disruption" => Ok(Scenario::MarketDisruption),
            other => Err(format!("unknown scenario: {other}")),
        }
    }
}

fn policy(region: Region, base: Option<f64>, mean: Option<f64>) -> EventEffect {
    EventEffect::PolicyChange(PolicyChange {
        region,
        base_approval_probability: base,
        review_years_mean: mean,
        tech_multipliers: None,
    })
}

fn baseline(start: Tick) -> Vec<Event> {
    vec![
        Event::new(
            start + 2,
            "premium demand emerges for sustainable specialty crops",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::SpecialtyCrops,
                growth_rate: 0.06,
            },
        ),
        Event::new(
            start + 3,
            "moderate gene-editing delivery breakthrough",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.1,
            },
        ),
        Event::new(
            start + 4,
            "minor European framework update shortens reviews",
            policy(Region::Europe, None, Some(4.0)),
        ),
        Event::new(
            start + 6,
            "transgenic production cost reduction",
            EventEffect::TechnologyImprovement {
                technology: Technology::Transgenic,
                boost: 0.05,
            },
        ),
    ]
}

fn harmonization(start: Tick) -> Vec<Event> {
    vec![
        Event::new(
            start + 1,
            "North America / Europe regulatory cooperation initiative",
            policy(Region::NorthAmerica, None, Some(2.0)),
        ),
        Event::new(
            start + 1,
            "North America / Europe regulatory cooperation initiative",
            policy(Region::Europe, None, Some(3.5)),
        ),
        Event::new(
            start + 2,
            "cross-border biotech investment surge",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::RowCrops,
                growth_rate: 0.035,
            },
        ),
        Event::new(
            start + 3,
            "global gene-editing standards framework adopted",
            policy(Region::Asia, Some(0.75), None),
        ),
        Event::new(
            start + 3,
            "global gene-editing standards framework adopted",
            policy(Region::Africa, Some(0.7), None),
        ),
        Event::new(
            start + 5,
            "Europe adopts product-based regulation for gene editing",
            policy(Region::Europe, Some(0.75), Some(1.5)),
        ),
    ]
}

fn climate_crisis(start: Tick) -> Vec<Event> {
    vec![
        Event::new(
            start + 1,
            "severe drought across North America and Europe",
            EventEffect::MarketSizeShock {
                segment: SegmentId::RowCrops,
                multiplier: 0.8,
            },
        ),
        Event::new(
            start + 2,
            "resilience funding accelerates biofuel feedstock demand",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::Biofuels,
                growth_rate: 0.08,
            },
        ),
        Event::new(
            start + 2,
            "drought-tolerance trait breakthrough",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.15,
            },
        ),
        Event::new(
            start + 3,
            "extreme heat waves disrupt global crop production",
            EventEffect::MarketSizeShock {
                segment: SegmentId::SpecialtyCrops,
                multiplier: 0.85,
            },
        ),
        Event::new(
            start + 4,
            "emergency approval pathways for climate-resilient crops",
            policy(Region::NorthAmerica, Some(0.85), Some(1.5)),
        ),
        Event::new(
            start + 4,
            "emergency approval pathways for climate-resilient crops",
            policy(Region::Europe, Some(0.7), Some(2.5)),
        ),
        Event::new(
            start + 5,
            "catastrophic flooding in Asia and South America",
            EventEffect::RegionalShock {
                region: Region::Asia,
                multiplier: 1.2,
            },
        ),
    ]
}

fn tech_breakthrough(start: Tick) -> Vec<Event> {
    vec![
        Event::new(
            start + 1,
            "revolutionary gene-editing delivery system",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.3,
            },
        ),
        Event::new(
            start + 2,
            "off-target effect elimination breakthrough",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.08,
            },
        ),
        Event::new(
            start + 2,
            "venture funding surge lifts specialty demand",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::SpecialtyCrops,
                growth_rate: 0.07,
            },
        ),
        Event::new(
            start + 3,
            "regulatory frameworks updated for breakthrough technologies",
            policy(Region::NorthAmerica, None, Some(2.0)),
        ),
        Event::new(
            start + 3,
            "regulatory frameworks updated for breakthrough technologies",
            policy(Region::Asia, None, Some(2.6)),
        ),
        Event::new(
            start + 4,
            "metabolic pathway engineering breakthrough",
            EventEffect::TechnologyImprovement {
                technology: Technology::Transgenic,
                boost: 0.2,
            },
        ),
    ]
}

fn market_disruption(start: Tick) -> Vec<Event> {
    vec![
        Event::new(
            start + 1,
            "major technology company enters the seed market",
            EventEffect::MarketGrowthChange {
                segment: SegmentId::RowCrops,
                growth_rate: 0.04,
            },
        ),
        Event::new(
            start + 2,
            "alternative protein growth cuts crop acreage",
            EventEffect::MarketSizeShock {
                segment: SegmentId::RowCrops,
                multiplier: 0.95,
            },
        ),
        Event::new(
            start + 3,
            "global trade war raises tariffs on agricultural goods",
            EventEffect::RegionalShock {
                region: Region::Asia,
                multiplier: 0.8,
            },
        ),
        Event::new(
            start + 3,
            "global trade war raises tariffs on agricultural goods",
            EventEffect::RegionalShock {
                region: Region::SouthAmerica,
                multiplier: 0.85,
            },
        ),
        Event::new(
            start + 4,
            "key gene-editing patent invalidated",
            EventEffect::TechnologyImprovement {
                technology: Technology::GeneEditing,
                boost: 0.1,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.to_string().parse::<Scenario>(), Ok(scenario));
        }
        assert!("warp_drive".parse::<Scenario>().is_err());
    }

    #[test]
    fn timelines_stay_within_the_horizon() {
        for scenario in Scenario::ALL {
            let events = scenario.timeline(2025, 2035);
            assert!(!events.is_empty());
            assert!(events.iter().all(|e| (2025..=2035).contains(&e.tick)));
        }
    }

    #[test]
    fn short_horizons_clip_late_events() {
        let full = Scenario::Baseline.timeline(2025, 2035).len();
        let clipped = Scenario::Baseline.timeline(2025, 2027).len();
        assert!(clipped < full);
    }
}
