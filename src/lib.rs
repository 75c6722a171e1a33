//! # Financial Analytics Engine
//!
//! A deterministic library for turning uploaded monthly financial statements
//! into derived scores, ratio trends, forward projections, and valuation
//! estimates.
//!
//! ## Core Concepts
//!
//! - **Raw Rows**: Arbitrary column-name → cell-value records, exactly as the
//!   spreadsheet-parsing layer hands them over
//! - **Field Mapping**: Best-effort assignment of uploaded headers to ~45
//!   canonical statement fields via normalized substring matching
//! - **Monthly Records**: The canonical series — one record per calendar
//!   month, duplicate-month rows summed, sorted ascending
//! - **Scores**: A tiered, windowed battery (Revenue Growth Score, expense
//!   adjustment, Asset Development Score, composite Financial Score)
//! - **Estimates**: Coverage ratios, valuations, and the reconstructed cash
//!   flow are estimation models driven by configurable fractions, not
//!   subledger data
//!
//! Every function is a pure transformation of its inputs. Nothing is cached
//! between calls; callers that recompute per render should memoize on input
//! identity.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_analytics_engine::*;
//!
//! let mapping = map_columns(&headers);
//! let history = normalize_rows(&rows, &mapping)?;
//!
//! let input = AnalysisInput::new(history);
//! let report = run_analysis(&input)?;
//! println!("financial score: {}", report.scores.financial_score);
//! ```

pub mod error;
pub mod mapping;
pub mod metrics;
pub mod normalize;
pub mod projection;
pub mod schema;
pub mod scores;
pub mod trend;
pub mod utils;
pub mod valuation;

pub use error::{AnalyticsError, Result};
pub use mapping::{map_columns, mapping_report, normalize_header, MappingReport};
pub use normalize::{normalize_rows, parse_date_cell};
pub use projection::{compute_projections, ProjectionPoint, ProjectionSeries};
pub use schema::*;
pub use scores::{compute_scores, ScoreSummary};
pub use trend::{compute_trend, compute_trend_with, TrendPoint};
pub use valuation::{
    compute_cash_flow, compute_cash_flow_with, compute_valuation, compute_valuation_with,
    CashFlowPoint, ValuationSummary,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything one analysis run needs, gathered into an immutable input so the
/// engine never depends on ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisInput {
    pub history: Vec<MonthlyRecord>,
    pub multipliers: ScenarioMultipliers,
    pub sde_multiplier: f64,
    pub ebitda_multiplier: f64,
    pub estimates: EstimationConfig,
}

impl Default for AnalysisInput {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            multipliers: ScenarioMultipliers::default(),
            sde_multiplier: 2.5,
            ebitda_multiplier: 4.0,
            estimates: EstimationConfig::default(),
        }
    }
}

impl AnalysisInput {
    pub fn new(history: Vec<MonthlyRecord>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }
}

/// The full derived output for one history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub scores: ScoreSummary,
    pub trend: Vec<TrendPoint>,
    pub projections: ProjectionSeries,
    pub valuation: ValuationSummary,
    pub cash_flow: Vec<CashFlowPoint>,
    /// Human-readable notes on windows the history could not fill. The
    /// numeric outputs above still carry lenient fallback values.
    pub warnings: Vec<String>,
}

pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Runs the whole pipeline over an already-normalized history.
    pub fn run(input: &AnalysisInput) -> Result<AnalysisReport> {
        validate_input(input)?;

        info!(
            "running analysis over {} months of history",
            input.history.len()
        );

        let warnings = collect_warnings(&input.history);
        for warning in &warnings {
            debug!("analysis warning: {}", warning);
        }

        let scores = compute_scores(&input.history);
        let trend = compute_trend_with(&input.history, &input.estimates);
        let projections = compute_projections(&input.history, &input.multipliers);
        let valuation = compute_valuation_with(
            &input.history,
            input.sde_multiplier,
            input.ebitda_multiplier,
            &input.estimates,
        );
        let cash_flow = compute_cash_flow_with(&input.history, &input.estimates);

        Ok(AnalysisReport {
            scores,
            trend,
            projections,
            valuation,
            cash_flow,
            warnings,
        })
    }
}

/// Convenience wrapper over [`AnalyticsEngine::run`].
pub fn run_analysis(input: &AnalysisInput) -> Result<AnalysisReport> {
    AnalyticsEngine::run(input)
}

fn validate_input(input: &AnalysisInput) -> Result<()> {
    input.multipliers.validate()?;
    input.estimates.validate()?;

    let multiples = [
        ("sdeMultiplier", input.sde_multiplier),
        ("ebitdaMultiplier", input.ebitda_multiplier),
    ];
    for (name, value) in multiples {
        if !value.is_finite() || value < 0.0 {
            return Err(AnalyticsError::InvalidValuationMultiple { name, value });
        }
    }
    Ok(())
}

fn collect_warnings(history: &[MonthlyRecord]) -> Vec<String> {
    let mut warnings = Vec::new();
    let months = history.len();

    if months < 12 {
        warnings.push(format!(
            "Only {} months of history; trailing-twelve-month figures cover the available months only",
            months
        ));
    }
    if months < 13 {
        warnings.push(format!(
            "Only {} months of history; the trend table needs 13 and is empty",
            months
        ));
    }
    if months < 24 {
        warnings.push(format!(
            "Only {} months of history; 24-month growth defaults to 0% and projections are empty",
            months
        ));
    }
    if let Some(last) = history.last() {
        if last.total_liabilities == 0.0 {
            warnings.push(
                "Latest month has zero total liabilities; the asset-liability ratio is undefined"
                    .to_string(),
            );
        }
    }
    warnings
}
