use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};

pub fn parse_date(field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date '{}'", field))
}

pub fn parse_decimal(field: &str, field_name: &str) -> Result<Decimal> {
    field
        .parse::<Decimal>()
        .with_context(|| format!("Failed to parse {} '{}'", field_name, field))
}

/// Share counts are whole numbers; "100.0" is accepted, "100.5" is not.
pub fn parse_quantity(field: &str) -> Result<i64> {
    if let Ok(quantity) = field.parse::<i64>() {
        return Ok(quantity);
    }

    let decimal = parse_decimal(field, "quantity")?;
    if !decimal.fract().is_zero() {
        bail!("Quantity '{}' is not a whole number of shares", field);
    }
    decimal
        .to_i64()
        .with_context(|| format!("Quantity '{}' is out of range", field))
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path '{}'", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
