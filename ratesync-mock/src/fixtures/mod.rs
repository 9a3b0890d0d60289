//! Deterministic fixture data.

use chrono::NaiveDate;
use rust_decimal::Decimal;

pub mod fx;
pub mod treasury;

/// Calendar date shorthand for fixtures.
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Decimal from its canonical string form.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn values(row: &[&str]) -> Vec<Option<Decimal>> {
    row.iter()
        .map(|v| if v.is_empty() { None } else { Some(dec(v)) })
        .collect()
}
