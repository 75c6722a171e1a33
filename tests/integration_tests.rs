use anyhow::Result;
use financial_analytics_engine::*;

/// Parses an uploaded CSV the way the spreadsheet layer would: every cell
/// arrives as text and the engine does all coercion.
fn load_csv(data: &str) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), CellValue::Text(cell.to_string())))
            .collect();
        rows.push(row);
    }
    Ok((headers, rows))
}

/// 26 months of a steadily growing services business, with the messy header
/// spellings real uploads have.
fn growing_business_csv() -> String {
    let mut csv = String::from(
        "Period,Total Revenue ($),Total Expenses,Cash at Bank,Accounts Receivable,Inventory,\
         Total Current Assets,Fixed Assets,Total Assets,Accounts Payable,\
         Total Current Liabilities,Long-Term Debt,Total Liabilities,Total Equity\n",
    );
    for i in 0..26 {
        let year = 2022 + i / 12;
        let month = i % 12 + 1;
        let growth = 1.02_f64.powi(i);
        let revenue = 100_000.0 * growth;
        let expense = 80_000.0;
        let assets = 500_000.0 + 3_000.0 * i as f64;
        let liabilities = 250_000.0;
        csv.push_str(&format!(
            "{:04}-{:02},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}\n",
            year,
            month,
            revenue,
            expense,
            40_000.0,
            60_000.0,
            90_000.0,
            200_000.0,
            assets - 200_000.0,
            assets,
            50_000.0,
            100_000.0,
            150_000.0,
            liabilities,
            assets - liabilities,
        ));
    }
    csv
}

#[test]
fn test_full_pipeline_from_csv_upload() -> Result<()> {
    let csv = growing_business_csv();
    let (headers, rows) = load_csv(&csv)?;

    let mapping = map_columns(&headers);
    assert_eq!(mapping.column(CanonicalField::Date), Some("Period"));
    assert_eq!(
        mapping.column(CanonicalField::Revenue),
        Some("Total Revenue ($)")
    );
    assert_eq!(
        mapping.column(CanonicalField::LongTermDebt),
        Some("Long-Term Debt")
    );

    let history = normalize_rows(&rows, &mapping)?;
    assert_eq!(history.len(), 26);
    assert_eq!(history[0].month, "2022-01");
    assert_eq!(history[25].month, "2024-02");

    let report = run_analysis(&AnalysisInput::new(history))?;

    assert_eq!(report.trend.len(), 14);
    assert_eq!(report.projections.most_likely.len(), 12);
    assert_eq!(report.cash_flow.len(), 12);
    assert!(report.warnings.is_empty());

    // Growing revenue against flat expenses: a healthy scorecard.
    assert!(report.scores.financial_score > 50.0);
    assert!(report.scores.revenue_growth_24m.unwrap() > 0.0);

    // Scenario ordering holds at the end of the horizon.
    let last = 11;
    assert!(
        report.projections.best_case[last].revenue
            >= report.projections.most_likely[last].revenue
    );
    assert!(
        report.projections.most_likely[last].revenue
            >= report.projections.worst_case[last].revenue
    );

    // Valuations come out positive for a profitable business.
    assert!(report.valuation.ttm_sde > 0.0);
    assert!(report.valuation.sde_valuation > report.valuation.ttm_sde);
    assert!(report.valuation.dcf_valuation > 0.0);
    Ok(())
}

#[test]
fn test_mixed_date_formats_duplicates_and_garbage() -> Result<()> {
    let csv = "\
Month,Revenue,Total Expenses
3/2024,1000,800
2024-03-15,500,100
2024-04,2000,900
total,99999,99999
,42,42
2024-05-01,3000,1000
";
    let (headers, rows) = load_csv(csv)?;
    let mapping = map_columns(&headers);
    let history = normalize_rows(&rows, &mapping)?;

    // The "total" footer row and the dateless row are dropped; the two March
    // rows are summed as partial-period contributions.
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].month, "2024-03");
    assert_eq!(history[0].revenue, 1500.0);
    assert_eq!(history[0].expense, 900.0);
    assert_eq!(history[1].month, "2024-04");
    assert_eq!(history[2].month, "2024-05");
    Ok(())
}

#[test]
fn test_unparseable_numbers_default_to_zero() -> Result<()> {
    let csv = "\
Month,Revenue,Total Expenses
2024-01,n/a,500
2024-02,1000,
";
    let (headers, rows) = load_csv(csv)?;
    let mapping = map_columns(&headers);
    let history = normalize_rows(&rows, &mapping)?;

    assert_eq!(history[0].revenue, 0.0);
    assert_eq!(history[0].expense, 500.0);
    assert_eq!(history[1].revenue, 1000.0);
    assert_eq!(history[1].expense, 0.0);
    Ok(())
}

#[test]
fn test_upload_without_date_column_is_rejected() -> Result<()> {
    let csv = "\
Revenue,Total Expenses
1000,800
";
    let (headers, rows) = load_csv(csv)?;
    let mapping = map_columns(&headers);
    assert!(!mapping.contains(CanonicalField::Date));

    let result = normalize_rows(&rows, &mapping);
    assert!(matches!(result, Err(AnalyticsError::MissingDateColumn)));
    Ok(())
}

#[test]
fn test_report_round_trips_through_json() -> Result<()> {
    let (headers, rows) = load_csv(&growing_business_csv())?;
    let mapping = map_columns(&headers);
    let history = normalize_rows(&rows, &mapping)?;
    let report = run_analysis(&AnalysisInput::new(history))?;

    let json = serde_json::to_string(&report)?;
    let back: AnalysisReport = serde_json::from_str(&json)?;
    assert_eq!(back.trend.len(), report.trend.len());
    assert_eq!(
        back.scores.financial_score.to_bits(),
        report.scores.financial_score.to_bits()
    );
    Ok(())
}

#[test]
fn test_results_are_reproducible() -> Result<()> {
    let (headers, rows) = load_csv(&growing_business_csv())?;
    let mapping = map_columns(&headers);
    let history = normalize_rows(&rows, &mapping)?;

    let first = run_analysis(&AnalysisInput::new(history.clone()))?;
    let second = run_analysis(&AnalysisInput::new(history))?;

    // Bit-for-bit identical on every run: the engine carries no state.
    assert_eq!(
        first.scores.financial_score.to_bits(),
        second.scores.financial_score.to_bits()
    );
    assert_eq!(first.trend, second.trend);
    assert_eq!(first.projections, second.projections);
    assert_eq!(first.cash_flow, second.cash_flow);
    Ok(())
}

#[test]
fn test_custom_estimation_config_flows_through() -> Result<()> {
    let (headers, rows) = load_csv(&growing_business_csv())?;
    let mapping = map_columns(&headers);
    let history = normalize_rows(&rows, &mapping)?;

    let mut input = AnalysisInput::new(history);
    input.estimates.depreciation_fraction_of_revenue = 0.10;
    let heavier = run_analysis(&input)?;

    input.estimates.depreciation_fraction_of_revenue = 0.05;
    let lighter = run_analysis(&input)?;

    assert!(heavier.valuation.estimated_depreciation > lighter.valuation.estimated_depreciation);
    assert!(heavier.valuation.ttm_ebitda > lighter.valuation.ttm_ebitda);
    Ok(())
}
