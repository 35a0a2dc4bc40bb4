use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult};

pub async fn connect(database_path: &Path) -> Result<SqlitePool> {
    let db_connect_options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let connection = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(db_connect_options)
        .await
        .with_context(|| format!("Failed to open database at {}", database_path.display()))?;

    create_tables(&connection).await?;

    Ok(connection)
}

pub async fn create_tables(connection: &SqlitePool) -> Result<()> {
    create_transactions(connection)
        .await
        .context("Failed to create transactions table")?;
    create_holdings(connection)
        .await
        .context("Failed to create holdings table")?;
    create_realized_pnl(connection)
        .await
        .context("Failed to create realized_pnl table")?;
    create_indexes(connection)
        .await
        .context("Failed to create indexes")?;
    Ok(())
}

pub async fn create_transactions(
    connection: &SqlitePool,
) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_date TEXT NOT NULL,
            symbol TEXT NOT NULL,
            side TEXT NOT NULL CHECK (side IN ('BUY', 'SELL')),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            rate TEXT NOT NULL,
            amount TEXT NOT NULL,
            commission TEXT NOT NULL,
            tax TEXT NOT NULL,
            depository_fee TEXT NOT NULL,
            total_charges TEXT NOT NULL,
            net_amount TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(connection)
    .await
}

pub async fn create_holdings(connection: &SqlitePool) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS holdings (
            symbol TEXT PRIMARY KEY,
            available_quantity INTEGER NOT NULL CHECK (available_quantity >= 0),
            avg_cost_per_share TEXT NOT NULL,
            total_invested_amount TEXT NOT NULL,
            total_shares_bought INTEGER NOT NULL,
            total_shares_sold INTEGER NOT NULL,
            total_realized_pnl TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(connection)
    .await
}

pub async fn create_realized_pnl(
    connection: &SqlitePool,
) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS realized_pnl (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_id INTEGER NOT NULL UNIQUE
                REFERENCES transactions(id) ON DELETE CASCADE,
            symbol TEXT NOT NULL,
            sell_date TEXT NOT NULL,
            quantity_sold INTEGER NOT NULL,
            sell_rate TEXT NOT NULL,
            avg_cost_basis TEXT NOT NULL,
            gross_proceeds TEXT NOT NULL,
            net_proceeds TEXT NOT NULL,
            cost_basis TEXT NOT NULL,
            realized_pnl TEXT NOT NULL,
            pnl_percentage TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(connection)
    .await
}

pub async fn create_indexes(connection: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_transactions_symbol_date
            ON transactions (symbol, transaction_date, id)
        "#,
    )
    .execute(connection)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_realized_pnl_symbol_date
            ON realized_pnl (symbol, sell_date)
        "#,
    )
    .execute(connection)
    .await?;

    Ok(())
}
