//! Whole-history headline scores.
//!
//! The same score battery also runs per rolling window inside the trend
//! generator; the windowed growth helpers live here so both paths share one
//! definition of "24-month growth" (trailing-12 sum vs prior-12 sum) and
//! "6-month growth" (trailing-3 sum vs prior-3 sum).

use crate::metrics::{
    adjust_rgs_for_recent_growth, asset_development_adjustment, asset_development_base_score,
    asset_development_score, asset_liability_ratio, expense_adjustment, financial_score,
    pct_change, profitability_score, revenue_growth_base_score, sum,
};
use crate::schema::MonthlyRecord;
use serde::{Deserialize, Serialize};

/// Headline score set for the full history. Scores are always numbers (the
/// lenient contract); the growth and ratio inputs are carried as `Option`s
/// so callers can render "N/A" where a window was not computable instead of
/// a misleading 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub financial_score: f64,
    pub profitability_score: f64,
    pub asset_dev_score: f64,
    pub base_rgs: f64,
    pub adjusted_rgs: f64,
    pub expense_adjustment: f64,
    /// Asset-liability ratio for the latest month; None when liabilities are 0.
    pub alr: Option<f64>,
    /// Year-over-year ALR growth; None with under 13 months of history.
    pub alr_growth: Option<f64>,
    pub revenue_growth_24m: Option<f64>,
    pub revenue_growth_6m: Option<f64>,
    pub expense_growth_24m: Option<f64>,
}

/// Growth between the trailing `window` values and the `window` before it,
/// as a percentage. None when fewer than `2 * window` values exist.
pub(crate) fn window_growth(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < 2 * window {
        return None;
    }
    let n = values.len();
    let recent = sum(&values[n - window..]);
    let prior = sum(&values[n - 2 * window..n - window]);
    pct_change(recent, prior)
}

/// Computes the headline scores over the whole history.
///
/// Growth windows that the history cannot fill degrade to 0% growth rather
/// than failing, which lands each score in its zero-growth tier.
pub fn compute_scores(history: &[MonthlyRecord]) -> ScoreSummary {
    let revenue: Vec<f64> = history.iter().map(|r| r.revenue).collect();
    let expense: Vec<f64> = history.iter().map(|r| r.expense).collect();

    let revenue_growth_24m = window_growth(&revenue, 12);
    let revenue_growth_6m = window_growth(&revenue, 3);
    let expense_growth_24m = window_growth(&expense, 12);

    let base_rgs = revenue_growth_base_score(revenue_growth_24m.unwrap_or(0.0));
    let adjusted_rgs = adjust_rgs_for_recent_growth(base_rgs, revenue_growth_6m.unwrap_or(0.0));

    let spread = revenue_growth_24m.unwrap_or(0.0) - expense_growth_24m.unwrap_or(0.0);
    let expense_adj = expense_adjustment(spread);
    let profitability = profitability_score(adjusted_rgs, expense_adj);

    let alr = history
        .last()
        .and_then(|r| asset_liability_ratio(r.total_assets, r.total_liabilities));
    let alr_prior = if history.len() >= 13 {
        let r = &history[history.len() - 13];
        asset_liability_ratio(r.total_assets, r.total_liabilities)
    } else {
        None
    };
    let alr_growth = match (alr, alr_prior) {
        (Some(current), Some(prior)) => pct_change(current, prior),
        _ => None,
    };

    let ads_base = asset_development_base_score(alr.unwrap_or(0.0));
    let ads_adj = asset_development_adjustment(alr_growth.unwrap_or(0.0));
    let asset_dev = asset_development_score(ads_base, ads_adj);

    ScoreSummary {
        financial_score: financial_score(profitability, asset_dev),
        profitability_score: profitability,
        asset_dev_score: asset_dev,
        base_rgs,
        adjusted_rgs,
        expense_adjustment: expense_adj,
        alr,
        alr_growth,
        revenue_growth_24m,
        revenue_growth_6m,
        expense_growth_24m,
    }
}
