use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AnalyticsError, Result};

/// A single spreadsheet cell as delivered by the upload/parsing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Null,
}

/// One uploaded record: an arbitrary mapping of column name to cell value.
/// Rows have no fixed shape; the [`FieldMapping`] decides which columns matter.
pub type RawRow = BTreeMap<String, CellValue>;

/// The canonical statement fields an upload can be mapped onto.
///
/// `Date` is the only mandatory field; every other field defaults to 0 when
/// its column is absent or unparseable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Date,
    Revenue,
    OtherIncome,
    Expense,
    Cash,
    AccountsReceivable,
    Inventory,
    OtherCurrentAssets,
    TotalCurrentAssets,
    FixedAssets,
    AccumulatedDepreciation,
    OtherAssets,
    TotalAssets,
    AccountsPayable,
    CreditLine,
    CurrentPortionLtd,
    OtherCurrentLiabilities,
    TotalCurrentLiabilities,
    LongTermDebt,
    OtherLiabilities,
    TotalLiabilities,
    PaidInCapital,
    RetainedEarnings,
    OwnerDraws,
    TotalEquity,
    TotalLiabilitiesAndEquity,
    CogsMaterials,
    CogsLabor,
    CogsSubcontractors,
    CogsOther,
    TotalCogs,
    OpexSalaries,
    OpexPayrollTaxes,
    OpexRent,
    OpexUtilities,
    OpexMarketing,
    OpexInsurance,
    OpexProfessionalFees,
    OpexOffice,
    OpexTravel,
    OpexOther,
    TotalOpex,
    OwnerSalary,
    OwnerBenefits,
    InterestExpense,
    Depreciation,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 46] = [
        CanonicalField::Date,
        CanonicalField::Revenue,
        CanonicalField::OtherIncome,
        CanonicalField::Expense,
        CanonicalField::Cash,
        CanonicalField::AccountsReceivable,
        CanonicalField::Inventory,
        CanonicalField::OtherCurrentAssets,
        CanonicalField::TotalCurrentAssets,
        CanonicalField::FixedAssets,
        CanonicalField::AccumulatedDepreciation,
        CanonicalField::OtherAssets,
        CanonicalField::TotalAssets,
        CanonicalField::AccountsPayable,
        CanonicalField::CreditLine,
        CanonicalField::CurrentPortionLtd,
        CanonicalField::OtherCurrentLiabilities,
        CanonicalField::TotalCurrentLiabilities,
        CanonicalField::LongTermDebt,
        CanonicalField::OtherLiabilities,
        CanonicalField::TotalLiabilities,
        CanonicalField::PaidInCapital,
        CanonicalField::RetainedEarnings,
        CanonicalField::OwnerDraws,
        CanonicalField::TotalEquity,
        CanonicalField::TotalLiabilitiesAndEquity,
        CanonicalField::CogsMaterials,
        CanonicalField::CogsLabor,
        CanonicalField::CogsSubcontractors,
        CanonicalField::CogsOther,
        CanonicalField::TotalCogs,
        CanonicalField::OpexSalaries,
        CanonicalField::OpexPayrollTaxes,
        CanonicalField::OpexRent,
        CanonicalField::OpexUtilities,
        CanonicalField::OpexMarketing,
        CanonicalField::OpexInsurance,
        CanonicalField::OpexProfessionalFees,
        CanonicalField::OpexOffice,
        CanonicalField::OpexTravel,
        CanonicalField::OpexOther,
        CanonicalField::TotalOpex,
        CanonicalField::OwnerSalary,
        CanonicalField::OwnerBenefits,
        CanonicalField::InterestExpense,
        CanonicalField::Depreciation,
    ];
}

/// Best-effort assignment of canonical fields to uploaded column names.
///
/// Produced by [`crate::mapping::map_columns`], but the web layer may also
/// persist a user-corrected mapping and feed it back in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FieldMapping {
    #[schemars(
        description = "Assignment of canonical field names to source column headers. Fields with no recognizable column are simply absent and default to zero during normalization."
    )]
    pub columns: BTreeMap<CanonicalField, String>,
}

impl FieldMapping {
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: CanonicalField, column: impl Into<String>) {
        self.columns.insert(field, column.into());
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.columns.iter().map(|(f, c)| (*f, c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The date column, or an error if none was matched. Normalization is
    /// impossible without it.
    pub fn require_date_column(&self) -> Result<&str> {
        self.column(CanonicalField::Date)
            .ok_or(AnalyticsError::MissingDateColumn)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FieldMapping)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

/// The canonical unit of history: all raw rows falling in one calendar
/// month, summed field-wise. Every numeric field defaults to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyRecord {
    #[schemars(description = "Calendar month in YYYY-MM format")]
    pub month: String,

    pub revenue: f64,
    pub other_income: f64,
    pub expense: f64,

    pub cash: f64,
    pub accounts_receivable: f64,
    pub inventory: f64,
    pub other_current_assets: f64,
    pub total_current_assets: f64,
    pub fixed_assets: f64,
    pub accumulated_depreciation: f64,
    pub other_assets: f64,
    pub total_assets: f64,

    pub accounts_payable: f64,
    pub credit_line: f64,
    pub current_portion_ltd: f64,
    pub other_current_liabilities: f64,
    pub total_current_liabilities: f64,
    pub long_term_debt: f64,
    pub other_liabilities: f64,
    pub total_liabilities: f64,

    pub paid_in_capital: f64,
    pub retained_earnings: f64,
    pub owner_draws: f64,
    pub total_equity: f64,
    pub total_liabilities_and_equity: f64,

    pub cogs_materials: f64,
    pub cogs_labor: f64,
    pub cogs_subcontractors: f64,
    pub cogs_other: f64,
    pub total_cogs: f64,

    pub opex_salaries: f64,
    pub opex_payroll_taxes: f64,
    pub opex_rent: f64,
    pub opex_utilities: f64,
    pub opex_marketing: f64,
    pub opex_insurance: f64,
    pub opex_professional_fees: f64,
    pub opex_office: f64,
    pub opex_travel: f64,
    pub opex_other: f64,
    pub total_opex: f64,

    pub owner_salary: f64,
    pub owner_benefits: f64,
    pub interest_expense: f64,
    pub depreciation: f64,
}

impl MonthlyRecord {
    pub fn new(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            ..Self::default()
        }
    }

    pub fn net_income(&self) -> f64 {
        self.revenue - self.expense
    }

    pub fn working_capital(&self) -> f64 {
        self.total_current_assets - self.total_current_liabilities
    }

    /// Mutable access to the numeric field backing a canonical field.
    /// `Date` has no numeric slot and returns `None`.
    pub fn field_mut(&mut self, field: CanonicalField) -> Option<&mut f64> {
        use CanonicalField::*;
        let slot = match field {
            Date => return None,
            Revenue => &mut self.revenue,
            OtherIncome => &mut self.other_income,
            Expense => &mut self.expense,
            Cash => &mut self.cash,
            AccountsReceivable => &mut self.accounts_receivable,
            Inventory => &mut self.inventory,
            OtherCurrentAssets => &mut self.other_current_assets,
            TotalCurrentAssets => &mut self.total_current_assets,
            FixedAssets => &mut self.fixed_assets,
            AccumulatedDepreciation => &mut self.accumulated_depreciation,
            OtherAssets => &mut self.other_assets,
            TotalAssets => &mut self.total_assets,
            AccountsPayable => &mut self.accounts_payable,
            CreditLine => &mut self.credit_line,
            CurrentPortionLtd => &mut self.current_portion_ltd,
            OtherCurrentLiabilities => &mut self.other_current_liabilities,
            TotalCurrentLiabilities => &mut self.total_current_liabilities,
            LongTermDebt => &mut self.long_term_debt,
            OtherLiabilities => &mut self.other_liabilities,
            TotalLiabilities => &mut self.total_liabilities,
            PaidInCapital => &mut self.paid_in_capital,
            RetainedEarnings => &mut self.retained_earnings,
            OwnerDraws => &mut self.owner_draws,
            TotalEquity => &mut self.total_equity,
            TotalLiabilitiesAndEquity => &mut self.total_liabilities_and_equity,
            CogsMaterials => &mut self.cogs_materials,
            CogsLabor => &mut self.cogs_labor,
            CogsSubcontractors => &mut self.cogs_subcontractors,
            CogsOther => &mut self.cogs_other,
            TotalCogs => &mut self.total_cogs,
            OpexSalaries => &mut self.opex_salaries,
            OpexPayrollTaxes => &mut self.opex_payroll_taxes,
            OpexRent => &mut self.opex_rent,
            OpexUtilities => &mut self.opex_utilities,
            OpexMarketing => &mut self.opex_marketing,
            OpexInsurance => &mut self.opex_insurance,
            OpexProfessionalFees => &mut self.opex_professional_fees,
            OpexOffice => &mut self.opex_office,
            OpexTravel => &mut self.opex_travel,
            OpexOther => &mut self.opex_other,
            TotalOpex => &mut self.total_opex,
            OwnerSalary => &mut self.owner_salary,
            OwnerBenefits => &mut self.owner_benefits,
            InterestExpense => &mut self.interest_expense,
            Depreciation => &mut self.depreciation,
        };
        Some(slot)
    }
}

/// Caller-supplied scaling applied to base growth rates when projecting the
/// best and worst scenarios. Persisted by the hosting application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioMultipliers {
    #[schemars(description = "Scales the revenue growth rate in the best case. Should be greater than 1.")]
    pub best_case_rev_multiplier: f64,

    #[schemars(description = "Scales the expense growth rate in the best case. Should be less than 1.")]
    pub best_case_exp_multiplier: f64,

    #[schemars(description = "Scales the revenue growth rate in the worst case. Should be less than 1.")]
    pub worst_case_rev_multiplier: f64,

    #[schemars(description = "Scales the expense growth rate in the worst case. Should be greater than 1.")]
    pub worst_case_exp_multiplier: f64,
}

impl Default for ScenarioMultipliers {
    fn default() -> Self {
        Self {
            best_case_rev_multiplier: 1.2,
            best_case_exp_multiplier: 0.9,
            worst_case_rev_multiplier: 0.8,
            worst_case_exp_multiplier: 1.1,
        }
    }
}

impl ScenarioMultipliers {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("bestCaseRevMultiplier", self.best_case_rev_multiplier),
            ("bestCaseExpMultiplier", self.best_case_exp_multiplier),
            ("worstCaseRevMultiplier", self.worst_case_rev_multiplier),
            ("worstCaseExpMultiplier", self.worst_case_exp_multiplier),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalyticsError::InvalidMultiplier { name, value });
            }
        }
        Ok(())
    }
}

/// The estimation heuristics used where uploads do not carry real subledger
/// detail (interest, COGS, depreciation, owner compensation). These are
/// configuration rather than hard-coded constants; the defaults reflect the
/// product's established assumptions. All derived figures are approximate
/// and should be presented as estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimationConfig {
    #[schemars(description = "Fraction of trailing-12-month expense treated as cost of goods sold in activity ratios")]
    pub cogs_fraction_of_expense: f64,

    #[schemars(description = "Fraction of trailing-12-month expense treated as interest in coverage ratios")]
    pub interest_fraction_of_expense: f64,

    #[schemars(description = "Fraction of trailing-12-month revenue treated as depreciation")]
    pub depreciation_fraction_of_revenue: f64,

    #[schemars(description = "Fraction of trailing-12-month revenue treated as interest in the valuation add-back")]
    pub interest_fraction_of_revenue: f64,

    #[schemars(description = "Fraction of trailing-12-month revenue added back as owner compensation when deriving SDE")]
    pub owner_comp_fraction_of_revenue: f64,

    #[schemars(description = "Annual discount rate applied in the 5-year DCF")]
    pub discount_rate: f64,

    #[schemars(description = "Perpetual growth rate used for the Gordon terminal value")]
    pub terminal_growth_rate: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            cogs_fraction_of_expense: 0.60,
            interest_fraction_of_expense: 0.05,
            depreciation_fraction_of_revenue: 0.05,
            interest_fraction_of_revenue: 0.02,
            owner_comp_fraction_of_revenue: 0.15,
            discount_rate: 0.10,
            terminal_growth_rate: 0.02,
        }
    }
}

impl EstimationConfig {
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("cogsFractionOfExpense", self.cogs_fraction_of_expense),
            ("interestFractionOfExpense", self.interest_fraction_of_expense),
            (
                "depreciationFractionOfRevenue",
                self.depreciation_fraction_of_revenue,
            ),
            ("interestFractionOfRevenue", self.interest_fraction_of_revenue),
            (
                "ownerCompFractionOfRevenue",
                self.owner_comp_fraction_of_revenue,
            ),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AnalyticsError::InvalidEstimationFraction { name, value });
            }
        }
        if !self.discount_rate.is_finite()
            || !self.terminal_growth_rate.is_finite()
            || self.discount_rate <= self.terminal_growth_rate
        {
            return Err(AnalyticsError::InvalidDiscountRate {
                discount_rate: self.discount_rate,
                terminal_growth: self.terminal_growth_rate,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_a_slot_except_date() {
        let mut record = MonthlyRecord::new("2024-01");
        for field in CanonicalField::ALL {
            if field == CanonicalField::Date {
                assert!(record.field_mut(field).is_none());
            } else {
                assert!(
                    record.field_mut(field).is_some(),
                    "{:?} has no backing field",
                    field
                );
            }
        }
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let mut record = MonthlyRecord::new("2024-03");
        record.revenue = 1500.0;
        record.total_assets = 9000.0;

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"month\":\"2024-03\""));
        assert!(json.contains("\"totalAssets\":9000.0"));

        let back: MonthlyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_cell_value_deserialization() {
        let cells: Vec<CellValue> =
            serde_json::from_str(r#"[42.5, "2024-03-01", "March", null]"#).unwrap();
        assert_eq!(cells[0], CellValue::Number(42.5));
        assert_eq!(
            cells[1],
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(cells[2], CellValue::Text("March".to_string()));
        assert_eq!(cells[3], CellValue::Null);
    }

    #[test]
    fn test_mapping_schema_generation() {
        let schema = FieldMapping::schema_as_json().unwrap();
        assert!(schema.contains("columns"));
        assert!(schema.contains("canonical field"));
    }

    #[test]
    fn test_multiplier_validation() {
        assert!(ScenarioMultipliers::default().validate().is_ok());

        let bad = ScenarioMultipliers {
            best_case_rev_multiplier: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let nan = ScenarioMultipliers {
            worst_case_exp_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_estimation_validation() {
        assert!(EstimationConfig::default().validate().is_ok());

        let bad = EstimationConfig {
            cogs_fraction_of_expense: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let inverted = EstimationConfig {
            discount_rate: 0.02,
            terminal_growth_rate: 0.10,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
