use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tokio_stream::StreamExt;

use super::utils::{parse_holding, parse_i64_from_row, parse_realized_pnl, parse_transaction};
use crate::models::{Holding, RealizedPnl, RealizedPnlFilter, Transaction, TransactionFilter};

const TRANSACTION_COLUMNS: &str = r#"
    SELECT id, transaction_date, symbol, side, quantity, rate, amount,
           commission, tax, depository_fee, total_charges, net_amount,
           created_at, updated_at
    FROM transactions
"#;

pub async fn fetch_transaction(conn: &mut SqliteConnection, id: i64) -> Result<Option<Transaction>> {
    let mut builder = QueryBuilder::<Sqlite>::new(TRANSACTION_COLUMNS);
    builder.push(" WHERE id = ").push_bind(id);

    let row = builder
        .build()
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("Failed to fetch transaction {}", id))?;

    row.map(parse_transaction).transpose()
}

/// The symbol's full history in replay order.
pub async fn fetch_symbol_history(
    conn: &mut SqliteConnection,
    symbol: &str,
) -> Result<Vec<Transaction>> {
    let mut builder = QueryBuilder::<Sqlite>::new(TRANSACTION_COLUMNS);
    builder
        .push(" WHERE symbol = ")
        .push_bind(symbol)
        .push(" ORDER BY transaction_date ASC, id ASC");

    let query = builder.build();
    let mut rows = query.fetch(&mut *conn);
    let mut transactions = Vec::new();
    while let Some(row) = rows.next().await {
        let row = row.with_context(|| format!("Failed to read history for {}", symbol))?;
        transactions.push(parse_transaction(row)?);
    }

    Ok(transactions)
}

pub async fn fetch_all_transactions(conn: &mut SqliteConnection) -> Result<Vec<Transaction>> {
    let mut builder = QueryBuilder::<Sqlite>::new(TRANSACTION_COLUMNS);
    builder.push(" ORDER BY transaction_date ASC, id ASC");

    builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch transactions")?
        .into_iter()
        .map(parse_transaction)
        .collect()
}

fn push_transaction_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &TransactionFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(symbol) = &filter.symbol {
        builder.push(" AND symbol = ").push_bind(symbol.clone());
    }
    if let Some(side) = &filter.side {
        builder.push(" AND side = ").push_bind(side.to_string());
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND transaction_date >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND transaction_date <= ").push_bind(date_to);
    }
}

/// One page of matching transactions, newest first, plus the total match count.
pub async fn search_transactions(
    conn: &mut SqliteConnection,
    filter: &TransactionFilter,
) -> Result<(Vec<Transaction>, i64)> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM transactions");
    push_transaction_filter(&mut count, filter);
    let total_row = count
        .build()
        .fetch_one(&mut *conn)
        .await
        .context("Failed to count transactions")?;
    let total = parse_i64_from_row(&total_row, "total")?;

    let mut builder = QueryBuilder::<Sqlite>::new(TRANSACTION_COLUMNS);
    push_transaction_filter(&mut builder, filter);
    builder
        .push(" ORDER BY transaction_date DESC, id DESC LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset());

    let transactions = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .context("Failed to search transactions")?
        .into_iter()
        .map(parse_transaction)
        .collect::<Result<Vec<_>>>()?;

    Ok((transactions, total))
}

pub async fn fetch_holding(conn: &mut SqliteConnection, symbol: &str) -> Result<Option<Holding>> {
    let row = sqlx::query(
        r#"
        SELECT symbol, available_quantity, avg_cost_per_share, total_invested_amount,
               total_shares_bought, total_shares_sold, total_realized_pnl, updated_at
        FROM holdings
        WHERE symbol = ?
        "#,
    )
    .bind(symbol)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to fetch holding for {}", symbol))?;

    row.map(parse_holding).transpose()
}

pub async fn fetch_holdings(conn: &mut SqliteConnection) -> Result<Vec<Holding>> {
    sqlx::query(
        r#"
        SELECT symbol, available_quantity, avg_cost_per_share, total_invested_amount,
               total_shares_bought, total_shares_sold, total_realized_pnl, updated_at
        FROM holdings
        ORDER BY symbol ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .context("Failed to fetch holdings")?
    .into_iter()
    .map(parse_holding)
    .collect()
}

pub async fn fetch_symbols(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT symbol FROM transactions
        UNION
        SELECT symbol FROM holdings
        ORDER BY symbol ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .context("Failed to fetch symbols")
}

/// Matching realized records, newest sale first.
pub async fn search_realized_pnl(
    conn: &mut SqliteConnection,
    filter: &RealizedPnlFilter,
) -> Result<Vec<RealizedPnl>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT id, transaction_id, symbol, sell_date, quantity_sold, sell_rate,
               avg_cost_basis, gross_proceeds, net_proceeds, cost_basis,
               realized_pnl, pnl_percentage, created_at
        FROM realized_pnl
        WHERE 1 = 1
        "#,
    );
    if let Some(symbol) = &filter.symbol {
        builder.push(" AND symbol = ").push_bind(symbol.clone());
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND sell_date >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND sell_date <= ").push_bind(date_to);
    }
    builder.push(" ORDER BY sell_date DESC, transaction_id DESC");

    builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch realized P/L")?
        .into_iter()
        .map(parse_realized_pnl)
        .collect()
}
