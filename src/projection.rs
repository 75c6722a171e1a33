//! 12-month forward extrapolation under three scenarios.
//!
//! Growth rates are monthly equivalents of the trailing-12-vs-prior-12
//! comparison: flows (revenue, expense) compare window sums, stocks (assets,
//! liabilities) compare point-in-time values at the window edges. Each
//! scenario compounds its scaled rates from the latest actual month; equity
//! is always derived as projected assets minus projected liabilities.

use crate::metrics::ratio;
use crate::schema::{MonthlyRecord, ScenarioMultipliers};
use log::debug;
use serde::{Deserialize, Serialize};

/// Months projected forward in every scenario.
pub const PROJECTION_HORIZON: usize = 12;

/// Fixed scenario scaling for asset growth (best, worst).
const ASSET_SCENARIO_MULTIPLIERS: (f64, f64) = (1.2, 0.8);
/// Fixed scenario scaling for liability growth (best, worst).
const LIABILITY_SCENARIO_MULTIPLIERS: (f64, f64) = (0.8, 1.2);

/// One synthetic forward month. `month` is a relative label ("+1mo".."+12mo").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: String,
    pub revenue: f64,
    pub expense: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub equity: f64,
}

/// The three scenario tracks. All empty when history is too short.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSeries {
    pub most_likely: Vec<ProjectionPoint>,
    pub best_case: Vec<ProjectionPoint>,
    pub worst_case: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone, Copy)]
struct MonthlyRates {
    revenue: f64,
    expense: f64,
    assets: f64,
    liabilities: f64,
}

/// Projects the series 12 months forward. Requires at least 24 months of
/// history; below that every scenario is empty.
pub fn compute_projections(
    history: &[MonthlyRecord],
    multipliers: &ScenarioMultipliers,
) -> ProjectionSeries {
    if history.len() < 24 {
        debug!(
            "projection skipped: {} months of history, 24 required",
            history.len()
        );
        return ProjectionSeries::default();
    }

    let n = history.len();
    let last = &history[n - 1];

    let last12_revenue: f64 = history[n - 12..].iter().map(|r| r.revenue).sum();
    let prior12_revenue: f64 = history[n - 24..n - 12].iter().map(|r| r.revenue).sum();
    let last12_expense: f64 = history[n - 12..].iter().map(|r| r.expense).sum();
    let prior12_expense: f64 = history[n - 24..n - 12].iter().map(|r| r.expense).sum();

    // Stocks compare the window-edge values, not sums.
    let edge = &history[n - 13];

    let base = MonthlyRates {
        revenue: monthly_rate(last12_revenue, prior12_revenue),
        expense: monthly_rate(last12_expense, prior12_expense),
        assets: monthly_rate(last.total_assets, edge.total_assets),
        liabilities: monthly_rate(last.total_liabilities, edge.total_liabilities),
    };

    let (best_assets, worst_assets) = ASSET_SCENARIO_MULTIPLIERS;
    let (best_liabilities, worst_liabilities) = LIABILITY_SCENARIO_MULTIPLIERS;

    let best = MonthlyRates {
        revenue: base.revenue * multipliers.best_case_rev_multiplier,
        expense: base.expense * multipliers.best_case_exp_multiplier,
        assets: base.assets * best_assets,
        liabilities: base.liabilities * best_liabilities,
    };
    let worst = MonthlyRates {
        revenue: base.revenue * multipliers.worst_case_rev_multiplier,
        expense: base.expense * multipliers.worst_case_exp_multiplier,
        assets: base.assets * worst_assets,
        liabilities: base.liabilities * worst_liabilities,
    };

    ProjectionSeries {
        most_likely: project(last, base),
        best_case: project(last, best),
        worst_case: project(last, worst),
    }
}

/// Monthly-equivalent growth: the 12-vs-prior-12 change divided by 12.
/// A zero prior yields a 0 rate rather than an undefined one.
fn monthly_rate(recent: f64, prior: f64) -> f64 {
    ratio(recent - prior, prior) / 12.0
}

fn project(last: &MonthlyRecord, rates: MonthlyRates) -> Vec<ProjectionPoint> {
    (1..=PROJECTION_HORIZON)
        .map(|step| {
            let power = step as i32;
            let revenue = last.revenue * (1.0 + rates.revenue).powi(power);
            let expense = last.expense * (1.0 + rates.expense).powi(power);
            let total_assets = last.total_assets * (1.0 + rates.assets).powi(power);
            let total_liabilities = last.total_liabilities * (1.0 + rates.liabilities).powi(power);
            ProjectionPoint {
                month: format!("+{}mo", step),
                revenue,
                expense,
                net_income: revenue - expense,
                total_assets,
                total_liabilities,
                equity: total_assets - total_liabilities,
            }
        })
        .collect()
}
