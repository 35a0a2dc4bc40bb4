use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use sqlx::Sqlite;

use crate::models::{Charges, Holding, NewTransaction, RealizedPnl};

/// Inserts a trade with its frozen charges and returns the new id.
pub async fn insert_transaction(
    transaction: &NewTransaction,
    amount: &Decimal,
    charges: &Charges,
    net_amount: &Decimal,
    now: &DateTime<Local>,
    tx: &mut sqlx::Transaction<'_, Sqlite>,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO transactions
        (
            transaction_date,
            symbol,
            side,
            quantity,
            rate,
            amount,
            commission,
            tax,
            depository_fee,
            total_charges,
            net_amount,
            created_at,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(transaction.date())
    .bind(transaction.symbol())
    .bind(transaction.side().to_str())
    .bind(transaction.quantity())
    .bind(transaction.rate().to_string())
    .bind(amount.to_string())
    .bind(charges.commission().to_string())
    .bind(charges.tax().to_string())
    .bind(charges.depository_fee().to_string())
    .bind(charges.total().to_string())
    .bind(net_amount.to_string())
    .bind(now.timestamp())
    .bind(now.timestamp())
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Failed to insert {} transaction", transaction.symbol()))?
    .last_insert_rowid();

    Ok(id)
}

/// Rewrites every user-editable column of an existing trade; `created_at` is kept.
pub async fn update_transaction(
    id: i64,
    transaction: &NewTransaction,
    amount: &Decimal,
    charges: &Charges,
    net_amount: &Decimal,
    now: &DateTime<Local>,
    tx: &mut sqlx::Transaction<'_, Sqlite>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE transactions
        SET transaction_date = ?,
            symbol = ?,
            side = ?,
            quantity = ?,
            rate = ?,
            amount = ?,
            commission = ?,
            tax = ?,
            depository_fee = ?,
            total_charges = ?,
            net_amount = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(transaction.date())
    .bind(transaction.symbol())
    .bind(transaction.side().to_str())
    .bind(transaction.quantity())
    .bind(transaction.rate().to_string())
    .bind(amount.to_string())
    .bind(charges.commission().to_string())
    .bind(charges.tax().to_string())
    .bind(charges.depository_fee().to_string())
    .bind(charges.total().to_string())
    .bind(net_amount.to_string())
    .bind(now.timestamp())
    .bind(id)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Failed to update transaction {}", id))?;

    Ok(())
}

pub async fn delete_transaction(id: i64, tx: &mut sqlx::Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query("DELETE FROM realized_pnl WHERE transaction_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to delete realized P/L of transaction {}", id))?;

    sqlx::query("DELETE FROM transactions WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to delete transaction {}", id))?;

    Ok(())
}

pub async fn upsert_holding(holding: &Holding, tx: &mut sqlx::Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO holdings
        (
            symbol,
            available_quantity,
            avg_cost_per_share,
            total_invested_amount,
            total_shares_bought,
            total_shares_sold,
            total_realized_pnl,
            updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(symbol) DO UPDATE SET
            available_quantity = excluded.available_quantity,
            avg_cost_per_share = excluded.avg_cost_per_share,
            total_invested_amount = excluded.total_invested_amount,
            total_shares_bought = excluded.total_shares_bought,
            total_shares_sold = excluded.total_shares_sold,
            total_realized_pnl = excluded.total_realized_pnl,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(holding.symbol())
    .bind(holding.available_quantity())
    .bind(holding.avg_cost_per_share().to_string())
    .bind(holding.total_invested_amount().to_string())
    .bind(holding.total_shares_bought())
    .bind(holding.total_shares_sold())
    .bind(holding.total_realized_pnl().to_string())
    .bind(holding.updated_at().timestamp())
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Failed to save holding for {}", holding.symbol()))?;

    Ok(())
}

pub async fn insert_realized_pnl(
    realized: &RealizedPnl,
    tx: &mut sqlx::Transaction<'_, Sqlite>,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO realized_pnl
        (
            transaction_id,
            symbol,
            sell_date,
            quantity_sold,
            sell_rate,
            avg_cost_basis,
            gross_proceeds,
            net_proceeds,
            cost_basis,
            realized_pnl,
            pnl_percentage,
            created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(realized.transaction_id())
    .bind(realized.symbol())
    .bind(realized.sell_date())
    .bind(realized.quantity_sold())
    .bind(realized.sell_rate().to_string())
    .bind(realized.avg_cost_basis().to_string())
    .bind(realized.gross_proceeds().to_string())
    .bind(realized.net_proceeds().to_string())
    .bind(realized.cost_basis().to_string())
    .bind(realized.realized_pnl().to_string())
    .bind(realized.pnl_percentage().to_string())
    .bind(realized.created_at().timestamp())
    .execute(&mut **tx)
    .await
    .with_context(|| {
        format!(
            "Failed to insert realized P/L for transaction {}",
            realized.transaction_id()
        )
    })?
    .last_insert_rowid();

    Ok(id)
}

/// Drops the derived state of a symbol ahead of a replay.
pub async fn clear_symbol_state(symbol: &str, tx: &mut sqlx::Transaction<'_, Sqlite>) -> Result<()> {
    sqlx::query("DELETE FROM realized_pnl WHERE symbol = ?")
        .bind(symbol)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to clear realized P/L for {}", symbol))?;

    sqlx::query("DELETE FROM holdings WHERE symbol = ?")
        .bind(symbol)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to clear holding for {}", symbol))?;

    Ok(())
}
