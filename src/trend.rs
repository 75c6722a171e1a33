//! Per-month ratio and score snapshots over rolling windows.
//!
//! Once 13 months of history exist, every index from 12 onward gets a
//! [`TrendPoint`]: the score battery recomputed over the trailing 12-month
//! window (and the prior 12 months where available) plus the full ratio set.
//! The whole table is recomputed on every call; callers that render
//! frequently should memoize on input identity.
//!
//! Coverage ratios are built from estimated interest/COGS/depreciation
//! fractions rather than explicit input fields, because most uploads do not
//! separate them. The figures are approximations and should be labeled as
//! such wherever they are displayed.

use crate::metrics::{
    adjust_rgs_for_recent_growth, asset_development_adjustment, asset_development_base_score,
    asset_development_score, asset_liability_ratio, expense_adjustment, financial_score,
    pct_change, profitability_score, ratio, revenue_growth_base_score, sum,
};
use crate::schema::{EstimationConfig, MonthlyRecord};
use crate::scores::window_growth;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// One month's full derived snapshot. All ratios substitute 0 for an
/// undefined quotient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: String,

    // Scores over the trailing window
    pub base_rgs: f64,
    pub adjusted_rgs: f64,
    pub expense_adjustment: f64,
    pub profitability_score: f64,
    pub alr: f64,
    pub alr_growth: f64,
    pub asset_dev_score: f64,
    pub financial_score: f64,

    // Liquidity
    pub current_ratio: f64,
    pub quick_ratio: f64,

    // Activity
    pub inventory_turnover: f64,
    pub inventory_days: f64,
    pub receivables_turnover: f64,
    pub receivables_days: f64,
    pub payables_turnover: f64,
    pub payables_days: f64,
    pub sales_to_working_capital: f64,

    // Coverage (estimated)
    pub interest_coverage: f64,
    pub debt_service_coverage: f64,
    pub cash_flow_to_debt: f64,

    // Leverage
    pub debt_to_net_worth: f64,
    pub fixed_assets_to_net_worth: f64,
    pub debt_ratio: f64,

    // Operating
    pub asset_turnover: f64,
    pub return_on_equity: f64,
    pub return_on_assets: f64,
    pub ebitda_margin: f64,
    pub ebit_margin: f64,
}

/// Computes the trend table with the default estimation fractions.
pub fn compute_trend(history: &[MonthlyRecord]) -> Vec<TrendPoint> {
    compute_trend_with(history, &EstimationConfig::default())
}

/// Computes one [`TrendPoint`] per index from 12 to the end of the history.
/// Returns an empty table below 13 months.
pub fn compute_trend_with(
    history: &[MonthlyRecord],
    estimates: &EstimationConfig,
) -> Vec<TrendPoint> {
    let mut points = Vec::new();
    if history.len() < 13 {
        return points;
    }

    for i in 12..history.len() {
        points.push(trend_point_at(history, i, estimates));
    }
    points
}

fn trend_point_at(history: &[MonthlyRecord], i: usize, estimates: &EstimationConfig) -> TrendPoint {
    let record = &history[i];
    let window = &history[i - 11..=i];

    let revenue_window: Vec<f64> = window.iter().map(|r| r.revenue).collect();
    let expense_window: Vec<f64> = window.iter().map(|r| r.expense).collect();
    let revenue12 = sum(&revenue_window);
    let expense12 = sum(&expense_window);

    // 24-month growth needs the prior 12 months before the window.
    let (revenue_growth, expense_growth) = if i >= 23 {
        let prior = &history[i - 23..=i - 12];
        let prior_revenue: f64 = sum(&prior.iter().map(|r| r.revenue).collect::<Vec<f64>>());
        let prior_expense: f64 = sum(&prior.iter().map(|r| r.expense).collect::<Vec<f64>>());
        (
            pct_change(revenue12, prior_revenue),
            pct_change(expense12, prior_expense),
        )
    } else {
        (None, None)
    };

    // 6-month growth stays inside the trailing window.
    let revenue_growth6 = window_growth(&revenue_window, 3);

    let base_rgs = revenue_growth_base_score(revenue_growth.unwrap_or(0.0));
    let adjusted_rgs = adjust_rgs_for_recent_growth(base_rgs, revenue_growth6.unwrap_or(0.0));
    let spread = revenue_growth.unwrap_or(0.0) - expense_growth.unwrap_or(0.0);
    let expense_adj = expense_adjustment(spread);
    let profitability = profitability_score(adjusted_rgs, expense_adj);

    let alr = asset_liability_ratio(record.total_assets, record.total_liabilities);
    let year_ago = &history[i - 12];
    let alr_prior = asset_liability_ratio(year_ago.total_assets, year_ago.total_liabilities);
    let alr_growth = match (alr, alr_prior) {
        (Some(current), Some(prior)) => pct_change(current, prior),
        _ => None,
    };

    let ads_base = asset_development_base_score(alr.unwrap_or(0.0));
    let ads_adj = asset_development_adjustment(alr_growth.unwrap_or(0.0));
    let asset_dev = asset_development_score(ads_base, ads_adj);

    let net_income12 = revenue12 - expense12;
    let cogs_estimate = expense12 * estimates.cogs_fraction_of_expense;
    let interest_estimate = expense12 * estimates.interest_fraction_of_expense;
    let depreciation_estimate = revenue12 * estimates.depreciation_fraction_of_revenue;
    let ebit = net_income12 + interest_estimate;
    let ebitda = ebit + depreciation_estimate;

    let inventory_turnover = ratio(cogs_estimate, record.inventory);
    let receivables_turnover = ratio(revenue12, record.accounts_receivable);
    let payables_turnover = ratio(cogs_estimate, record.accounts_payable);

    TrendPoint {
        month: record.month.clone(),

        base_rgs,
        adjusted_rgs,
        expense_adjustment: expense_adj,
        profitability_score: profitability,
        alr: alr.unwrap_or(0.0),
        alr_growth: alr_growth.unwrap_or(0.0),
        asset_dev_score: asset_dev,
        financial_score: financial_score(profitability, asset_dev),

        current_ratio: ratio(record.total_current_assets, record.total_current_liabilities),
        quick_ratio: ratio(
            record.cash + record.accounts_receivable,
            record.total_current_liabilities,
        ),

        inventory_turnover,
        inventory_days: ratio(DAYS_PER_YEAR, inventory_turnover),
        receivables_turnover,
        receivables_days: ratio(DAYS_PER_YEAR, receivables_turnover),
        payables_turnover,
        payables_days: ratio(DAYS_PER_YEAR, payables_turnover),
        sales_to_working_capital: ratio(revenue12, record.working_capital()),

        interest_coverage: ratio(ebit, interest_estimate),
        debt_service_coverage: ratio(ebitda, interest_estimate + record.current_portion_ltd),
        cash_flow_to_debt: ratio(net_income12 + depreciation_estimate, record.total_liabilities),

        debt_to_net_worth: ratio(record.total_liabilities, record.total_equity),
        fixed_assets_to_net_worth: ratio(record.fixed_assets, record.total_equity),
        debt_ratio: ratio(record.total_liabilities, record.total_assets),

        asset_turnover: ratio(revenue12, record.total_assets),
        return_on_equity: ratio(net_income12, record.total_equity) * 100.0,
        return_on_assets: ratio(net_income12, record.total_assets) * 100.0,
        ebitda_margin: ratio(ebitda, revenue12) * 100.0,
        ebit_margin: ratio(ebit, revenue12) * 100.0,
    }
}
