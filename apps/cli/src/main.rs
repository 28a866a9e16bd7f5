#![deny(warnings)]

//! Headless CLI: assemble a scenario, run the decade, report and export.

use anyhow::{Context, Result};
use sim_agents::{CommercialPlayer, MarketParticipant, RegulatorActor, ResearchEntity};
use sim_core::{ActorId, Region, SegmentId, Technology, Tick};
use sim_market::{default_segments, MarketModel};
use sim_regulatory::RegulatoryFramework;
use sim_runtime::{product_rows, Engine, EngineConfig, EventScheduler, Scenario};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    scenario: Scenario,
    seed: u64,
    start: Tick,
    end: Tick,
    out: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut scenario = Scenario::Baseline;
    let mut seed = 42u64;
    let mut start = 2025u32;
    let mut end = 2035u32;
    let mut out: Option<String> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => {
                let value = it.next().context("--scenario needs a value")?;
                scenario = value
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))
                    .with_context(|| {
                        let names: Vec<String> =
                            Scenario::ALL.iter().map(|s| s.to_string()).collect();
                        format!("valid scenarios: {}", names.join(", "))
                    })?;
            }
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()).unwrap_or(seed),
            "--start" => start = it.next().and_then(|s| s.parse().ok()).unwrap_or(start),
            "--end" => end = it.next().and_then(|s| s.parse().ok()).unwrap_or(end),
            "--out" => out = it.next(),
            _ => {}
        }
    }
    Ok(Args {
        scenario,
        seed,
        start,
        end,
        out,
    })
}

/// The default cast: two research entities, three commercial players, two
/// regulators, and two market participants.
fn add_default_actors(engine: &mut Engine) {
    let mut next = 1u64;
    let mut id = || {
        let id = ActorId(next);
        next += 1;
        id
    };
    engine.add_actor(Box::new(ResearchEntity::new(
        id(),
        "GenEdit Labs",
        Region::NorthAmerica,
        Technology::GeneEditing,
        3.0,
        15.0,
    )));
    engine.add_actor(Box::new(ResearchEntity::new(
        id(),
        "AgroScience Institute",
        Region::Europe,
        Technology::Transgenic,
        2.0,
        10.0,
    )));
    engine.add_actor(Box::new(CommercialPlayer::new(
        id(),
        "VerdantSeed",
        Region::NorthAmerica,
        60.0,
        vec![],
    )));
    engine.add_actor(Box::new(CommercialPlayer::new(
        id(),
        "Biocrop",
        Region::Europe,
        45.0,
        vec![],
    )));
    engine.add_actor(Box::new(CommercialPlayer::new(
        id(),
        "TerraGrow",
        Region::SouthAmerica,
        30.0,
        vec![],
    )));
    engine.add_actor(Box::new(RegulatorActor::new(
        id(),
        "NA Biotech Agency",
        Region::NorthAmerica,
        2,
        0.6,
    )));
    engine.add_actor(Box::new(RegulatorActor::new(
        id(),
        "EU Safety Authority",
        Region::Europe,
        2,
        0.8,
    )));
    engine.add_actor(Box::new(MarketParticipant::new(
        id(),
        "Prairie Growers Co-op",
        Region::NorthAmerica,
        SegmentId::RowCrops,
        0.5,
    )));
    engine.add_actor(Box::new(MarketParticipant::new(
        id(),
        "Mekong Producers Alliance",
        Region::Asia,
        SegmentId::SpecialtyCrops,
        0.4,
    )));
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(
        scenario = %args.scenario,
        seed = args.seed,
        start = args.start,
        end = args.end,
        "starting run"
    );

    let market = MarketModel::new(args.start, default_segments())?;
    let regulatory = RegulatoryFramework::with_default_regions();
    let scheduler =
        EventScheduler::from_timeline(args.scenario.timeline(args.start, args.end));
    let mut engine = Engine::new(
        EngineConfig {
            start_tick: args.start,
            end_tick: args.end,
            seed: args.seed,
        },
        market,
        regulatory,
        scheduler,
    )?;
    add_default_actors(&mut engine);

    let (report, market) = engine.run()?;

    println!(
        "Run OK | scenario: {} | ticks: {} | seed: {}",
        args.scenario,
        report.ticks.len(),
        args.seed
    );
    println!(
        "KPI | final market: ${:.2}B | avg price: ${:.2} | products: {} | approvals: {} | rejections: {}",
        report.final_total_sales() / 1e9,
        report
            .ticks
            .last()
            .map(|row| row.average_price)
            .unwrap_or(0.0),
        market.products().count(),
        report.total_approvals(),
        report.total_rejections()
    );

    if let Some(path) = args.out {
        let rows = product_rows(&market);
        let row_count = rows.len();
        let payload = serde_json::json!({
            "report": report,
            "products": rows,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&payload)?)
            .with_context(|| format!("writing results to {path}"))?;
        info!(path = %path, rows = row_count, "results exported");
    }

    Ok(())
}
