use chrono::{Datelike, Days, NaiveDate};

/// Day zero of the spreadsheet serial-date convention (Excel/1900 system,
/// including the phantom leap day, which lands the epoch on 1899-12-30).
pub fn sheet_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Converts a spreadsheet serial number to a calendar date. Fractional
/// parts (time of day) are truncated. Returns `None` for serials that are
/// negative, non-finite, or land outside chrono's representable range.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    sheet_epoch().checked_add_days(Days::new(serial.trunc() as u64))
}

/// Formats a date as its `YYYY-MM` month key.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn month_key_from_parts(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parses a `YYYY-MM` month key back into (year, month).
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Returns the month key `delta` months after (or before, if negative) the
/// given (year, month).
pub fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + (month as i32 - 1) + delta;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}
