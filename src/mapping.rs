//! Best-effort assignment of uploaded column headers to canonical fields.
//!
//! Headers are normalized (lowercased, non-alphanumerics stripped) and tested
//! against an ordered list of substring matchers per field. Matcher order is
//! the tie-break when patterns overlap: for each field, patterns are tried in
//! order, and the first column containing the pattern wins. Later columns
//! never override an already-matched field.

use crate::schema::{CanonicalField, FieldMapping};
use serde::Serialize;

/// Lowercases a header and strips everything that is not an ASCII letter or
/// digit, so "Total Current Assets ($)" and "total_current_assets" normalize
/// to the same key.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Ordered substring matchers for each canonical field, most specific first.
/// The order within each list is load-bearing: overlapping patterns (e.g.
/// "totalliabilities" inside "totalliabilitiesandequity") resolve by which
/// pattern is tried first, not by which is longest.
fn matchers(field: CanonicalField) -> &'static [&'static str] {
    use CanonicalField::*;
    match field {
        Date => &["date", "month", "period"],
        Revenue => &[
            "totalrevenue",
            "grossrevenue",
            "salesrevenue",
            "revenue",
            "totalsales",
            "grossreceipts",
            "totalincome",
            "sales",
        ],
        OtherIncome => &["otherincome", "interestincome", "miscellaneousincome", "miscincome"],
        Expense => &[
            "totalexpenses",
            "totalexpense",
            "totalcosts",
            "expenses",
            "expense",
        ],
        Cash => &[
            "cashandcashequivalents",
            "cashequivalents",
            "cashatbank",
            "cashonhand",
            "cash",
        ],
        AccountsReceivable => &[
            "accountsreceivable",
            "tradereceivables",
            "receivables",
            "receivable",
            "tradedebtors",
            "debtors",
        ],
        Inventory => &["inventories", "inventory", "stockonhand"],
        OtherCurrentAssets => &["othercurrentassets", "othershorttermassets"],
        TotalCurrentAssets => &["totalcurrentassets", "currentassets"],
        FixedAssets => &[
            "fixedassets",
            "propertyplantandequipment",
            "propertyplantequipment",
            "netppe",
            "ppe",
        ],
        AccumulatedDepreciation => &["accumulateddepreciation", "accumdepreciation", "accumdep"],
        OtherAssets => &["otherassets", "otherlongtermassets", "othernoncurrentassets"],
        TotalAssets => &["totalassets", "assetstotal"],
        AccountsPayable => &[
            "accountspayable",
            "tradepayables",
            "tradecreditors",
            "payable",
            "creditors",
        ],
        CreditLine => &["lineofcredit", "creditline", "revolvingcredit", "revolver"],
        CurrentPortionLtd => &[
            "currentportionoflongtermdebt",
            "currentportionlongtermdebt",
            "currentportionltd",
            "currentmaturities",
        ],
        OtherCurrentLiabilities => &[
            "othercurrentliabilities",
            "accruedliabilities",
            "accruedexpenses",
        ],
        TotalCurrentLiabilities => &["totalcurrentliabilities", "currentliabilities"],
        LongTermDebt => &[
            "longtermdebt",
            "longtermloans",
            "longtermliabilities",
            "notespayable",
        ],
        OtherLiabilities => &[
            "otherliabilities",
            "othernoncurrentliabilities",
            "otherlongtermliabilities",
        ],
        TotalLiabilities => &["totalliabilities", "liabilitiestotal"],
        PaidInCapital => &[
            "paidincapital",
            "contributedcapital",
            "sharecapital",
            "commonstock",
            "ownersinvestment",
        ],
        RetainedEarnings => &["retainedearnings", "accumulatedprofits", "accumulateddeficit"],
        OwnerDraws => &["ownersdraws", "ownerdraws", "ownerdraw", "drawings", "distributions"],
        TotalEquity => &[
            "totalequity",
            "totalownersequity",
            "ownersequity",
            "shareholdersequity",
            "stockholdersequity",
            "networth",
            "equity",
        ],
        TotalLiabilitiesAndEquity => &[
            "totalliabilitiesandequity",
            "totalliabilitiesequity",
            "liabilitiesandequity",
        ],
        CogsMaterials => &["costofmaterials", "rawmaterials", "materials"],
        CogsLabor => &["directlabor", "directlabour", "costoflabor", "labour", "labor"],
        CogsSubcontractors => &["subcontract"],
        CogsOther => &["othercostofgoodssold", "othercogs", "otherdirectcosts"],
        TotalCogs => &[
            "totalcostofgoodssold",
            "costofgoodssold",
            "totalcogs",
            "cogs",
            "costofsales",
        ],
        OpexSalaries => &["salariesandwages", "salaries", "wages"],
        OpexPayrollTaxes => &["payrolltaxes", "payrolltax", "employmenttaxes"],
        OpexRent => &["rentandlease", "rentexpense", "officerent", "rentals"],
        OpexUtilities => &["utilit"],
        OpexMarketing => &[
            "advertisingandmarketing",
            "marketing",
            "advertising",
            "promotion",
        ],
        OpexInsurance => &["insurance"],
        OpexProfessionalFees => &[
            "professionalfees",
            "legalandaccounting",
            "legalandprofessional",
            "accountingfees",
            "legalfees",
        ],
        OpexOffice => &["officeexpenses", "officeexpense", "officesupplies", "supplies"],
        OpexTravel => &[
            "travelandentertainment",
            "travelexpense",
            "travel",
            "mealsandentertainment",
        ],
        OpexOther => &[
            "otheroperatingexpenses",
            "otherexpenses",
            "otherexpense",
            "miscellaneousexpenses",
            "miscexpenses",
            "miscellaneous",
        ],
        TotalOpex => &[
            "totaloperatingexpenses",
            "operatingexpenses",
            "totalopex",
            "opex",
        ],
        OwnerSalary => &[
            "ownerssalary",
            "ownersalary",
            "ownerscompensation",
            "ownercompensation",
            "officercompensation",
        ],
        OwnerBenefits => &["ownersbenefits", "ownerbenefits", "ownerperks", "ownerinsurance"],
        InterestExpense => &["interestexpense", "interestpaid"],
        Depreciation => &[
            "depreciationandamortization",
            "depreciationexpense",
            "depreciation",
            "amortization",
        ],
    }
}

/// Maps uploaded column headers to canonical fields.
///
/// No numeric validation happens here; a matched column may still hold
/// garbage, which the normalizer later coerces to 0.
pub fn map_columns(headers: &[String]) -> FieldMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let mut mapping = FieldMapping::default();
    for field in CanonicalField::ALL {
        'patterns: for pattern in matchers(field) {
            for (idx, norm) in normalized.iter().enumerate() {
                if !norm.is_empty() && norm.contains(pattern) {
                    mapping.set(field, headers[idx].clone());
                    break 'patterns;
                }
            }
        }
    }
    mapping
}

/// Summary of what a mapping did and did not recognize, for display in the
/// upload review screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReport {
    pub matched: usize,
    pub unmapped_fields: Vec<CanonicalField>,
    pub unrecognized_columns: Vec<String>,
}

pub fn mapping_report(headers: &[String], mapping: &FieldMapping) -> MappingReport {
    let unmapped_fields: Vec<CanonicalField> = CanonicalField::ALL
        .iter()
        .copied()
        .filter(|f| !mapping.contains(*f))
        .collect();

    let unrecognized_columns: Vec<String> = headers
        .iter()
        .filter(|h| !mapping.iter().any(|(_, column)| column == h.as_str()))
        .cloned()
        .collect();

    MappingReport {
        matched: mapping.len(),
        unmapped_fields,
        unrecognized_columns,
    }
}
