use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("No source column is mapped to the date field")]
    MissingDateColumn,

    #[error("Invalid scenario multiplier {name}: {value} (must be finite and greater than zero)")]
    InvalidMultiplier { name: &'static str, value: f64 },

    #[error("Invalid valuation multiple {name}: {value} (must be finite and non-negative)")]
    InvalidValuationMultiple { name: &'static str, value: f64 },

    #[error("Invalid estimation fraction {name}: {value} (must be between 0.0 and 1.0)")]
    InvalidEstimationFraction { name: &'static str, value: f64 },

    #[error("Discount rate {discount_rate} must be greater than terminal growth rate {terminal_growth}")]
    InvalidDiscountRate {
        discount_rate: f64,
        terminal_growth: f64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
