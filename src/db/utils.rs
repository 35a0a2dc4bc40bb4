use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use sqlx::{Row, sqlite::SqliteRow};

use crate::models::{Charges, Holding, RealizedPnl, TradeSide, Transaction};

pub fn parse_i64_from_row(row: &SqliteRow, column: &str) -> Result<i64> {
    row.try_get::<i64, _>(column)
        .with_context(|| format!("Failed to parse i64 from column '{}'", column))
}

pub fn parse_string_from_row(row: &SqliteRow, column: &str) -> Result<String> {
    row.try_get::<String, _>(column)
        .with_context(|| format!("Failed to parse String from column '{}'", column))
}

/// Decimals are stored as TEXT so they round-trip exactly.
pub fn parse_decimal_from_row(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let value = parse_string_from_row(row, column)?;
    Decimal::from_str(&value)
        .with_context(|| format!("Failed to parse Decimal '{}' from column '{}'", value, column))
}

pub fn parse_date_from_row(row: &SqliteRow, column: &str) -> Result<NaiveDate> {
    row.try_get::<NaiveDate, _>(column)
        .with_context(|| format!("Failed to parse date from column '{}'", column))
}

pub fn parse_datetime_from_row(row: &SqliteRow, column: &str) -> Result<DateTime<Local>> {
    let timestamp: i64 = row
        .try_get(column)
        .with_context(|| format!("Failed to parse timestamp from column '{}'", column))?;
    Local.timestamp_opt(timestamp, 0).single().with_context(|| {
        format!(
            "Failed to convert timestamp to DateTime for column '{}'",
            column
        )
    })
}

pub fn parse_side_from_row(row: &SqliteRow, column: &str) -> Result<TradeSide> {
    let side = parse_string_from_row(row, column)?;
    TradeSide::from_str(&side)
        .with_context(|| format!("Failed to parse side '{}' from column '{}'", side, column))
}

pub fn parse_transaction(row: SqliteRow) -> Result<Transaction> {
    let id = parse_i64_from_row(&row, "id")?;
    let date = parse_date_from_row(&row, "transaction_date")?;
    let symbol = parse_string_from_row(&row, "symbol")?;
    let side = parse_side_from_row(&row, "side")?;
    let quantity = parse_i64_from_row(&row, "quantity")?;
    let rate = parse_decimal_from_row(&row, "rate")?;
    let amount = parse_decimal_from_row(&row, "amount")?;

    let commission = parse_decimal_from_row(&row, "commission")?;
    let tax = parse_decimal_from_row(&row, "tax")?;
    let depository_fee = parse_decimal_from_row(&row, "depository_fee")?;
    let total_charges = parse_decimal_from_row(&row, "total_charges")?;
    let charges = Charges::new(commission, tax, depository_fee, total_charges);

    let net_amount = parse_decimal_from_row(&row, "net_amount")?;
    let created_at = parse_datetime_from_row(&row, "created_at")?;
    let updated_at = parse_datetime_from_row(&row, "updated_at")?;

    Ok(Transaction::new(
        id, date, symbol, side, quantity, rate, amount, charges, net_amount, created_at,
        updated_at,
    ))
}

pub fn parse_holding(row: SqliteRow) -> Result<Holding> {
    Ok(Holding::new(
        parse_string_from_row(&row, "symbol")?,
        parse_i64_from_row(&row, "available_quantity")?,
        parse_decimal_from_row(&row, "avg_cost_per_share")?,
        parse_decimal_from_row(&row, "total_invested_amount")?,
        parse_i64_from_row(&row, "total_shares_bought")?,
        parse_i64_from_row(&row, "total_shares_sold")?,
        parse_decimal_from_row(&row, "total_realized_pnl")?,
        parse_datetime_from_row(&row, "updated_at")?,
    ))
}

pub fn parse_realized_pnl(row: SqliteRow) -> Result<RealizedPnl> {
    Ok(RealizedPnl::new(
        Some(parse_i64_from_row(&row, "id")?),
        parse_i64_from_row(&row, "transaction_id")?,
        parse_string_from_row(&row, "symbol")?,
        parse_date_from_row(&row, "sell_date")?,
        parse_i64_from_row(&row, "quantity_sold")?,
        parse_decimal_from_row(&row, "sell_rate")?,
        parse_decimal_from_row(&row, "avg_cost_basis")?,
        parse_decimal_from_row(&row, "gross_proceeds")?,
        parse_decimal_from_row(&row, "net_proceeds")?,
        parse_decimal_from_row(&row, "cost_basis")?,
        parse_decimal_from_row(&row, "realized_pnl")?,
        parse_decimal_from_row(&row, "pnl_percentage")?,
        parse_datetime_from_row(&row, "created_at")?,
    ))
}
