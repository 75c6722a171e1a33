//! Pure scoring and ratio primitives.
//!
//! Every tier ladder is an ordered const table evaluated top-down with
//! inclusive lower bounds; the first matching band wins. The ordering is the
//! contract: bands overlap at their boundaries only because evaluation stops
//! at the first match, so reordering a table changes scores.

pub const SCORE_FLOOR: f64 = 10.0;
pub const SCORE_CEILING: f64 = 100.0;

/// Sums a slice, treating non-finite entries as 0.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().filter(|v| v.is_finite()).sum()
}

/// Percentage change from `prior` to `current`. Undefined (`None`) when the
/// prior value is 0 or either input is non-finite.
pub fn pct_change(current: f64, prior: f64) -> Option<f64> {
    if !current.is_finite() || !prior.is_finite() || prior == 0.0 {
        return None;
    }
    Some((current / prior - 1.0) * 100.0)
}

/// Clamps a score into the canonical [10, 100] band. NaN collapses to the
/// floor.
pub fn clamp_score(value: f64) -> f64 {
    value.max(SCORE_FLOOR).min(SCORE_CEILING)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Division that substitutes 0 for an undefined quotient. The ratio battery
/// in the trend generator guards every denominator with this.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// One band of a score ladder: applies when the input is >= `min`.
#[derive(Debug, Clone, Copy)]
struct Tier {
    min: f64,
    score: f64,
}

fn lookup(tiers: &[Tier], value: f64, fallback: f64) -> f64 {
    tiers
        .iter()
        .find(|t| value >= t.min)
        .map(|t| t.score)
        .unwrap_or(fallback)
}

const REVENUE_GROWTH_TIERS: &[Tier] = &[
    Tier { min: 25.0, score: 100.0 },
    Tier { min: 15.0, score: 80.0 },
    Tier { min: 5.0, score: 60.0 },
    Tier { min: 0.0, score: 50.0 },
    Tier { min: -5.0, score: 40.0 },
    Tier { min: -15.0, score: 20.0 },
];

/// Base Revenue Growth Score from 24-month growth (trailing 12 vs prior 12).
pub fn revenue_growth_base_score(growth_pct: f64) -> f64 {
    lookup(REVENUE_GROWTH_TIERS, growth_pct, SCORE_FLOOR)
}

/// How a recent-growth band modifies the base RGS.
#[derive(Debug, Clone, Copy)]
enum Blend {
    /// Flat bonus on top of the base.
    Add(f64),
    /// Moves the base toward the ceiling by the given share of the gap.
    TowardCeiling(f64),
    /// Multiplies the base down.
    Scale(f64),
}

impl Blend {
    fn apply(self, base: f64) -> f64 {
        match self {
            Blend::Add(bonus) => base + bonus,
            Blend::TowardCeiling(share) => base + (SCORE_CEILING - base) * share,
            Blend::Scale(factor) => base * factor,
        }
    }
}

const RECENT_GROWTH_TIERS: &[(f64, Blend)] = &[
    (25.0, Blend::Add(50.0)),
    (15.0, Blend::TowardCeiling(0.8)),
    (5.0, Blend::TowardCeiling(0.6)),
    (0.0, Blend::TowardCeiling(0.4)),
    (-5.0, Blend::Scale(0.9)),
    (-15.0, Blend::Scale(0.7)),
    (-25.0, Blend::Scale(0.5)),
];

const RECENT_GROWTH_FLOOR_BLEND: Blend = Blend::Scale(0.3);

/// Adjusts the base RGS by the 6-month growth figure (trailing 3 vs prior 3
/// months), then clamps to [10, 100]. Recent acceleration blends the score
/// toward 100; recent decline scales it down.
pub fn adjust_rgs_for_recent_growth(base_rgs: f64, growth6_pct: f64) -> f64 {
    let blend = RECENT_GROWTH_TIERS
        .iter()
        .find(|(min, _)| growth6_pct >= *min)
        .map(|(_, blend)| *blend)
        .unwrap_or(RECENT_GROWTH_FLOOR_BLEND);
    clamp_score(blend.apply(base_rgs))
}

/// Score adjustment from the spread between 24-month revenue growth and
/// 24-month expense growth. A company growing revenue faster than expenses
/// earns a bonus; the reverse earns a penalty.
pub fn expense_adjustment(growth_spread_pct: f64) -> f64 {
    if growth_spread_pct > 10.0 {
        30.0
    } else if growth_spread_pct >= 0.0 {
        10.0
    } else if growth_spread_pct >= -5.0 {
        -10.0
    } else {
        -30.0
    }
}

pub fn profitability_score(adjusted_rgs: f64, expense_adj: f64) -> f64 {
    clamp_score(adjusted_rgs + expense_adj)
}

/// Asset-to-liability ratio. Undefined when liabilities are 0 (the caller
/// decides how to present a debt-free month).
pub fn asset_liability_ratio(total_assets: f64, total_liabilities: f64) -> Option<f64> {
    if !total_assets.is_finite() || !total_liabilities.is_finite() || total_liabilities == 0.0 {
        return None;
    }
    Some(total_assets / total_liabilities)
}

const ASSET_DEVELOPMENT_TIERS: &[Tier] = &[
    Tier { min: 1.5, score: 100.0 },
    Tier { min: 1.2, score: 90.0 },
    Tier { min: 0.8, score: 70.0 },
    Tier { min: 0.6, score: 50.0 },
    Tier { min: 0.4, score: 30.0 },
];

/// Base Asset Development Score from the current asset-liability ratio.
pub fn asset_development_base_score(alr: f64) -> f64 {
    lookup(ASSET_DEVELOPMENT_TIERS, alr, SCORE_FLOOR)
}

const ALR_GROWTH_TIERS: &[Tier] = &[
    Tier { min: 50.0, score: 20.0 },
    Tier { min: 30.0, score: 15.0 },
    Tier { min: 15.0, score: 10.0 },
    Tier { min: 5.0, score: 5.0 },
    Tier { min: -5.0, score: 0.0 },
    Tier { min: -15.0, score: -5.0 },
    Tier { min: -30.0, score: -10.0 },
    Tier { min: -50.0, score: -15.0 },
];

/// Adjustment from year-over-year ALR growth.
pub fn asset_development_adjustment(alr_growth_pct: f64) -> f64 {
    lookup(ALR_GROWTH_TIERS, alr_growth_pct, -20.0)
}

pub fn asset_development_score(base: f64, adjustment: f64) -> f64 {
    clamp_score(base + adjustment)
}

/// The headline composite: the mean of the profitability and asset
/// development scores.
pub fn financial_score(profitability: f64, asset_development: f64) -> f64 {
    (profitability + asset_development) / 2.0
}
