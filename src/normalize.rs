//! Converts raw uploaded rows into the canonical monthly series.
//!
//! Policies here are deliberate and load-bearing for every downstream
//! calculation:
//!
//! - Rows whose date cannot be parsed are dropped, not rejected.
//! - Missing or unparseable numeric cells coerce to 0.
//! - Multiple rows falling in the same calendar month are SUMMED field-wise:
//!   duplicate-period rows are treated as partial-period contributions, so a
//!   genuinely duplicated upload doubles its figures.
//! - Output is sorted ascending by month with at most one record per month.

use crate::error::Result;
use crate::schema::{CanonicalField, CellValue, FieldMapping, MonthlyRecord, RawRow};
use crate::utils::{month_key, serial_to_date};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Normalizes raw rows into an ascending monthly series.
///
/// Fails only when the mapping has no date column; every other data problem
/// degrades to a dropped row or a zero value.
pub fn normalize_rows(rows: &[RawRow], mapping: &FieldMapping) -> Result<Vec<MonthlyRecord>> {
    let date_column = mapping.require_date_column()?;

    let mut months: BTreeMap<String, MonthlyRecord> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let date = match row.get(date_column).and_then(parse_date_cell) {
            Some(date) => date,
            None => {
                debug!("dropping row {}: missing or unparseable date", idx);
                continue;
            }
        };

        let key = month_key(date);
        let record = months
            .entry(key.clone())
            .or_insert_with(|| MonthlyRecord::new(key));

        for (field, column) in mapping.iter() {
            if field == CanonicalField::Date {
                continue;
            }
            let value = row.get(column).map(numeric_value).unwrap_or(0.0);
            if let Some(slot) = record.field_mut(field) {
                *slot += value;
            }
        }
    }

    Ok(months.into_values().collect())
}

/// Parses a date cell. Accepts a native date, a spreadsheet serial number,
/// an ISO-style string, or `M/YYYY` (first of that month).
pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        CellValue::Null => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }

    // "YYYY-MM" month form
    if let Some((year, month)) = trimmed.split_once('-') {
        if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                return Some(date);
            }
        }
    }

    // "M/YYYY" form, interpreted as the first of that month
    if let Some((month, year)) = trimmed.split_once('/') {
        if let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                return Some(date);
            }
        }
    }

    None
}

/// Coerces a cell to a number the way the product always has: anything that
/// does not parse to a finite value becomes 0.
pub fn numeric_value(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) => 0.0,
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => 0.0,
            }
        }
        CellValue::Date(_) | CellValue::Null => 0.0,
    }
}
