//! Valuation and cash-flow estimates derived from the monthly series.
//!
//! Uploads carry no subledger detail for depreciation, interest, owner
//! compensation, or capital expenditure, so everything here is an estimation
//! model built from configurable revenue/expense fractions and balance-sheet
//! deltas. Results are approximations and must be presented to users as such.

use crate::metrics::sum;
use crate::schema::{EstimationConfig, MonthlyRecord};
use crate::scores::window_growth;
use serde::{Deserialize, Serialize};

const DCF_YEARS: u32 = 5;

/// Trailing-twelve-month earnings figures and the three valuation estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSummary {
    pub ttm_revenue: f64,
    pub ttm_expense: f64,
    pub ttm_net_income: f64,
    pub estimated_depreciation: f64,
    pub estimated_interest: f64,
    pub ttm_ebitda: f64,
    pub owner_comp_addback: f64,
    pub ttm_sde: f64,
    pub sde_valuation: f64,
    pub ebitda_valuation: f64,
    pub dcf_valuation: f64,
}

/// One month of the reconstructed cash-flow statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowPoint {
    pub month: String,
    pub net_income: f64,
    pub estimated_depreciation: f64,
    /// Change in working capital (ΔAR + ΔInventory − ΔAP).
    pub working_capital_change: f64,
    pub operating: f64,
    /// CapEx estimated as the fixed-asset delta plus depreciation added back.
    pub estimated_capex: f64,
    pub investing: f64,
    pub financing: f64,
    pub free_cash_flow: f64,
}

/// Computes valuations with the default estimation fractions.
pub fn compute_valuation(
    history: &[MonthlyRecord],
    sde_multiplier: f64,
    ebitda_multiplier: f64,
) -> ValuationSummary {
    compute_valuation_with(
        history,
        sde_multiplier,
        ebitda_multiplier,
        &EstimationConfig::default(),
    )
}

/// SDE, EBITDA, and DCF valuations from the trailing twelve months (or as
/// many months as exist, below twelve).
pub fn compute_valuation_with(
    history: &[MonthlyRecord],
    sde_multiplier: f64,
    ebitda_multiplier: f64,
    estimates: &EstimationConfig,
) -> ValuationSummary {
    let ttm = trailing_window(history, 12);
    let ttm_revenue = sum(&ttm.iter().map(|r| r.revenue).collect::<Vec<f64>>());
    let ttm_expense = sum(&ttm.iter().map(|r| r.expense).collect::<Vec<f64>>());
    let ttm_net_income = ttm_revenue - ttm_expense;

    let estimated_depreciation = ttm_revenue * estimates.depreciation_fraction_of_revenue;
    let estimated_interest = ttm_revenue * estimates.interest_fraction_of_revenue;
    let ttm_ebitda = ttm_net_income + estimated_depreciation + estimated_interest;
    let owner_comp_addback = ttm_revenue * estimates.owner_comp_fraction_of_revenue;
    let ttm_sde = ttm_ebitda + owner_comp_addback;

    let revenue: Vec<f64> = history.iter().map(|r| r.revenue).collect();
    let annual_growth = window_growth(&revenue, 12).unwrap_or(0.0) / 100.0;

    ValuationSummary {
        ttm_revenue,
        ttm_expense,
        ttm_net_income,
        estimated_depreciation,
        estimated_interest,
        ttm_ebitda,
        owner_comp_addback,
        ttm_sde,
        sde_valuation: ttm_sde * sde_multiplier,
        ebitda_valuation: ttm_ebitda * ebitda_multiplier,
        dcf_valuation: discounted_cash_flow(ttm_net_income, annual_growth, estimates),
    }
}

/// Five years of grown net income discounted at the configured rate, plus a
/// Gordon-growth terminal value discounted back from year five.
fn discounted_cash_flow(net_income: f64, growth: f64, estimates: &EstimationConfig) -> f64 {
    let discount = estimates.discount_rate;
    let terminal_growth = estimates.terminal_growth_rate;

    let mut value = 0.0;
    for year in 1..=DCF_YEARS {
        let cash_flow = net_income * (1.0 + growth).powi(year as i32);
        value += cash_flow / (1.0 + discount).powi(year as i32);
    }

    let final_cash_flow = net_income * (1.0 + growth).powi(DCF_YEARS as i32);
    let terminal = final_cash_flow * (1.0 + terminal_growth) / (discount - terminal_growth);
    value + terminal / (1.0 + discount).powi(DCF_YEARS as i32)
}

/// Reconstructs the cash-flow statement for the trailing twelve months with
/// the default estimation fractions.
pub fn compute_cash_flow(history: &[MonthlyRecord]) -> Vec<CashFlowPoint> {
    compute_cash_flow_with(history, &EstimationConfig::default())
}

/// One point per trailing month (needs the preceding month for deltas, so at
/// least two months of history).
pub fn compute_cash_flow_with(
    history: &[MonthlyRecord],
    estimates: &EstimationConfig,
) -> Vec<CashFlowPoint> {
    if history.len() < 2 {
        return Vec::new();
    }

    let start = history.len().saturating_sub(12).max(1);

    (start..history.len())
        .map(|i| {
            let record = &history[i];
            let prior = &history[i - 1];

            let net_income = record.net_income();
            let depreciation = record.revenue * estimates.depreciation_fraction_of_revenue;

            let working_capital_change = (record.accounts_receivable - prior.accounts_receivable)
                + (record.inventory - prior.inventory)
                - (record.accounts_payable - prior.accounts_payable);
            let operating = net_income + depreciation - working_capital_change;

            let estimated_capex = (record.fixed_assets - prior.fixed_assets) + depreciation;
            let investing = -estimated_capex;

            let financing = (record.long_term_debt - prior.long_term_debt)
                + ((record.total_equity - prior.total_equity) - net_income);

            CashFlowPoint {
                month: record.month.clone(),
                net_income,
                estimated_depreciation: depreciation,
                working_capital_change,
                operating,
                estimated_capex,
                investing,
                financing,
                free_cash_flow: operating - estimated_capex.max(0.0),
            }
        })
        .collect()
}

fn trailing_window(history: &[MonthlyRecord], months: usize) -> &[MonthlyRecord] {
    let start = history.len().saturating_sub(months);
    &history[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::month_key_from_parts;

    fn history_with(revenue: f64, expense: f64, months: usize) -> Vec<MonthlyRecord> {
        (0..months)
            .map(|i| {
                let mut r = MonthlyRecord::new(month_key_from_parts(
                    2022 + (i / 12) as i32,
                    (i % 12) as u32 + 1,
                ));
                r.revenue = revenue / 12.0;
                r.expense = expense / 12.0;
                r
            })
            .collect()
    }

    #[test]
    fn test_worked_valuation_example() {
        // TTM revenue $1.2M, expense $1.0M: NI 200k, Dep 60k, Int 24k,
        // EBITDA 284k, OwnerComp 180k, SDE 464k, SDE x 2.5 = $1.16M.
        let history = history_with(1_200_000.0, 1_000_000.0, 12);
        let valuation = compute_valuation(&history, 2.5, 4.0);

        assert!((valuation.ttm_revenue - 1_200_000.0).abs() < 1e-6);
        assert!((valuation.ttm_net_income - 200_000.0).abs() < 1e-6);
        assert!((valuation.estimated_depreciation - 60_000.0).abs() < 1e-6);
        assert!((valuation.estimated_interest - 24_000.0).abs() < 1e-6);
        assert!((valuation.ttm_ebitda - 284_000.0).abs() < 1e-6);
        assert!((valuation.owner_comp_addback - 180_000.0).abs() < 1e-6);
        assert!((valuation.ttm_sde - 464_000.0).abs() < 1e-6);
        assert!((valuation.sde_valuation - 1_160_000.0).abs() < 1e-3);
        assert!((valuation.ebitda_valuation - 1_136_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_dcf_with_flat_growth() {
        // 24 flat months: growth 0, so DCF is NI annuity at 10% plus the
        // 2% Gordon terminal value.
        let history = history_with(1_200_000.0, 1_000_000.0, 24);
        let valuation = compute_valuation(&history, 2.5, 4.0);

        let ni = 200_000.0;
        let mut expected = 0.0;
        for year in 1..=5 {
            expected += ni / 1.10_f64.powi(year);
        }
        let terminal = ni * 1.02 / (0.10 - 0.02);
        expected += terminal / 1.10_f64.powi(5);

        assert!((valuation.dcf_valuation - expected).abs() < 1e-3);
    }

    #[test]
    fn test_dcf_uses_historical_growth() {
        let flat = history_with(1_200_000.0, 1_000_000.0, 24);
        let mut growing = flat.clone();
        for (i, r) in growing.iter_mut().enumerate() {
            r.revenue = 80_000.0 * 1.03_f64.powi(i as i32);
        }
        let flat_dcf = compute_valuation(&flat, 2.5, 4.0).dcf_valuation;
        let growing_dcf = compute_valuation(&growing, 2.5, 4.0).dcf_valuation;
        assert!(growing_dcf > flat_dcf);
    }

    #[test]
    fn test_short_history_uses_what_exists() {
        let history = history_with(1_200_000.0, 1_000_000.0, 6);
        let valuation = compute_valuation(&history, 2.5, 4.0);
        // Six months of revenue at 100k each.
        assert!((valuation.ttm_revenue - 600_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_cash_flow_reconstruction() {
        let mut history = history_with(1_200_000.0, 1_000_000.0, 13);
        for (i, r) in history.iter_mut().enumerate() {
            let step = i as f64;
            r.accounts_receivable = 50_000.0 + 1_000.0 * step;
            r.inventory = 80_000.0 + 500.0 * step;
            r.accounts_payable = 40_000.0 + 250.0 * step;
            r.fixed_assets = 300_000.0 + 2_000.0 * step;
            r.long_term_debt = 150_000.0 - 1_000.0 * step;
            r.total_equity = 200_000.0 + 3_000.0 * step;
        }

        let cash_flow = compute_cash_flow(&history);
        assert_eq!(cash_flow.len(), 12);

        let point = &cash_flow[0];
        let net_income = 100_000.0 - 1_000_000.0 / 12.0;
        let depreciation = 100_000.0 * 0.05;
        // ΔAR 1000 + ΔInv 500 − ΔAP 250 = 1250.
        assert!((point.working_capital_change - 1_250.0).abs() < 1e-6);
        assert!((point.operating - (net_income + depreciation - 1_250.0)).abs() < 1e-6);
        // CapEx = ΔFixed 2000 + dep 5000 = 7000.
        assert!((point.estimated_capex - 7_000.0).abs() < 1e-6);
        assert!((point.investing + 7_000.0).abs() < 1e-6);
        // Financing = ΔLTD (−1000) + (ΔEquity 3000 − NI).
        assert!((point.financing - (-1_000.0 + 3_000.0 - net_income)).abs() < 1e-6);
        assert!((point.free_cash_flow - (point.operating - 7_000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_cash_flow_needs_two_months() {
        let history = history_with(1_200_000.0, 1_000_000.0, 1);
        assert!(compute_cash_flow(&history).is_empty());
    }

    #[test]
    fn test_negative_capex_does_not_reduce_fcf() {
        let mut history = history_with(1_200_000.0, 1_000_000.0, 2);
        history[0].fixed_assets = 400_000.0;
        history[1].fixed_assets = 300_000.0; // big disposal
        let cash_flow = compute_cash_flow(&history);
        let point = &cash_flow[0];
        assert!(point.estimated_capex < 0.0);
        // FCF subtracts only positive CapEx.
        assert!((point.free_cash_flow - point.operating).abs() < 1e-6);
    }
}
