//! Per-tick metrics and result export.

use serde::{Deserialize, Serialize};
use sim_core::{ProductId, Region, Tick};
use sim_market::{MarketModel, MarketTickSummary};
use sim_regulatory::RegulatoryTickOutcome;
use std::collections::BTreeMap;

/// One row of the per-tick time series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TickMetrics {
    pub tick: Tick,
    pub total_sales: f64,
    pub average_price: f64,
    pub regional_sales: BTreeMap<Region, f64>,
    pub product_sales: BTreeMap<ProductId, f64>,
    pub reviews_started: usize,
    pub reviews_pending: usize,
    pub approvals: usize,
    pub rejections: usize,
    pub events_applied: usize,
}

/// Collects one [`TickMetrics`] row per simulated tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetricsRecorder {
    rows: Vec<TickMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        tick: Tick,
        market: &MarketTickSummary,
        regulatory: &RegulatoryTickOutcome,
        events_applied: usize,
    ) {
        self.rows.push(TickMetrics {
            tick,
            total_sales: market.total_sales,
            average_price: market.average_price,
            regional_sales: market.regional_sales.clone(),
            product_sales: market.product_sales.clone(),
            reviews_started: regulatory.submitted,
            reviews_pending: regulatory.under_review,
            approvals: regulatory.approved,
            rejections: regulatory.rejected,
            events_applied,
        });
    }

    pub fn rows(&self) -> &[TickMetrics] {
        &self.rows
    }

    pub fn into_report(self, start_tick: Tick, end_tick: Tick, seed: u64) -> RunReport {
        RunReport {
            start_tick,
            end_tick,
            seed,
            ticks: self.rows,
        }
    }
}

/// The complete outcome of one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub seed: u64,
    pub ticks: Vec<TickMetrics>,
}

impl RunReport {
    /// Total market value in the final simulated tick.
    pub fn final_total_sales(&self) -> f64 {
        self.ticks.last().map(|row| row.total_sales).unwrap_or(0.0)
    }

    pub fn total_approvals(&self) -> usize {
        self.ticks.iter().map(|row| row.approvals).sum()
    }

    pub fn total_rejections(&self) -> usize {
        self.ticks.iter().map(|row| row.rejections).sum()
    }
}

/// One exported observation of one product at one tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductTickRow {
    pub tick: Tick,
    pub product: ProductId,
    pub name: String,
    pub total_sales: f64,
    pub regional_sales: BTreeMap<Region, f64>,
    pub average_price: f64,
}

/// Flatten every product's recorded series into export rows, ordered by
/// (product, tick).
pub fn product_rows(market: &MarketModel) -> Vec<ProductTickRow> {
    let mut rows = Vec::new();
    for product in market.products() {
        for (tick, samples) in product.series() {
            let mut regional_sales = BTreeMap::new();
            let mut total_sales = 0.0;
            let mut price_sum = 0.0;
            let mut price_count = 0usize;
            for (region, sample) in samples {
                regional_sales.insert(*region, sample.sales);
                total_sales += sample.sales;
                if sample.price > 0.0 {
                    price_sum += sample.price;
                    price_count += 1;
                }
            }
            rows.push(ProductTickRow {
                tick,
                product: product.id,
                name: product.name.clone(),
                total_sales,
                regional_sales,
                average_price: if price_count > 0 {
                    price_sum / price_count as f64
                } else {
                    0.0
                },
            });
        }
    }
    rows
}
