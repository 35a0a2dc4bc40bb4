use std::{path::Path, sync::Arc};

use chrono::{DateTime, Local, Timelike};
use csv::Reader;
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use super::{
    calc::ChargeSchedule,
    clock::Clock,
    ledger::Ledger,
    locks::SymbolLocks,
    replay::{Replay, replay, sort_chronologically},
    reports,
    utils::{parse_date, parse_decimal, parse_quantity},
};
use crate::{
    db::{read, write},
    error::{PortfolioError, Result},
    models::{
        Charges, Holding, MonthlyPnl, NewTransaction, Page, PortfolioSummary, RealizedPnl,
        RealizedPnlFilter, ScriptDetails, ScriptPnl, TradePreview, TradeSide, Transaction,
        TransactionFilter, YearlyPnl, normalize_symbol,
    },
};

/// Entry point for everything that reads or changes the book. Owns the
/// store; every write runs in one SQLite transaction under the symbol's lock.
pub struct Portfolio {
    pool: SqlitePool,
    ledger: Ledger,
    schedule: ChargeSchedule,
    clock: Arc<dyn Clock>,
    locks: SymbolLocks,
}

impl Portfolio {
    pub fn new(pool: SqlitePool, ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            ledger,
            schedule: ChargeSchedule::default(),
            clock,
            locks: SymbolLocks::default(),
        }
    }

    pub fn with_charge_schedule(self, schedule: ChargeSchedule) -> Self {
        Self { schedule, ..self }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn charge_schedule(&self) -> &ChargeSchedule {
        &self.schedule
    }

    fn now(&self) -> DateTime<Local> {
        let now = self.clock.now();
        // The store keeps whole seconds.
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn price(&self, input: &NewTransaction) -> Result<(Decimal, Charges, Decimal)> {
        self.schedule
            .price(*input.side(), *input.quantity(), *input.rate())
    }

    /// Write transactions take SQLite's write lock up front, so a writer on
    /// another symbol waits out the busy timeout instead of failing on the
    /// read-to-write upgrade.
    async fn begin_write(&self) -> Result<sqlx::Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Validates and prices a trade without booking it.
    pub fn preview_transaction(&self, input: NewTransaction) -> Result<TradePreview> {
        let input = input.validate(self.clock.today())?;
        let (amount, charges, net_amount) = self.price(&input)?;
        Ok(TradePreview::new(
            *input.date(),
            input.symbol().clone(),
            *input.side(),
            *input.quantity(),
            *input.rate(),
            amount,
            charges,
            net_amount,
        ))
    }

    pub async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction> {
        let input = input.validate(self.clock.today())?;
        let _guard = self.locks.lock(input.symbol()).await;
        let now = self.now();
        let (amount, charges, net_amount) = self.price(&input)?;

        let mut tx = self.begin_write().await?;

        let history = read::fetch_symbol_history(&mut tx, input.symbol()).await?;
        let back_dated = history.last().is_some_and(|last| input.date() < last.date());
        if back_dated && *input.side() == TradeSide::Sell {
            let prior: Vec<Transaction> = history
                .into_iter()
                .take_while(|t| t.date() <= input.date())
                .collect();
            let available = replay(&prior, &self.ledger, now)?
                .holding()
                .as_ref()
                .map(|h| *h.available_quantity())
                .unwrap_or(0);
            if available < *input.quantity() {
                return Err(PortfolioError::InsufficientQuantity {
                    symbol: input.symbol().clone(),
                    available,
                    requested: *input.quantity(),
                });
            }
        }

        let id =
            write::insert_transaction(&input, &amount, &charges, &net_amount, &now, &mut tx).await?;
        let transaction = Transaction::new(
            id,
            *input.date(),
            input.symbol().clone(),
            *input.side(),
            *input.quantity(),
            *input.rate(),
            amount,
            charges,
            net_amount,
            now,
            now,
        );

        if back_dated {
            debug!(id, symbol = %input.symbol(), "back-dated entry, replaying symbol");
            self.rebuild_in(&mut tx, input.symbol(), now).await?;
        } else {
            let holding = read::fetch_holding(&mut tx, input.symbol()).await?;
            let (holding, realized) = self.ledger.apply(holding.as_ref(), &transaction, now)?;
            write::upsert_holding(&holding, &mut tx).await?;
            if let Some(realized) = realized {
                write::insert_realized_pnl(&realized, &mut tx).await?;
            }
        }

        tx.commit().await?;

        info!(
            id,
            symbol = %transaction.symbol(),
            side = %transaction.side(),
            quantity = transaction.quantity(),
            rate = %transaction.rate(),
            "transaction recorded"
        );
        Ok(transaction)
    }

    pub async fn update_transaction(&self, id: i64, input: NewTransaction) -> Result<Transaction> {
        let input = input.validate(self.clock.today())?;
        let (_guards, existing) = self.lock_transaction(id, Some(input.symbol())).await?;
        let now = self.now();
        let (amount, charges, net_amount) = self.price(&input)?;

        let mut tx = self.begin_write().await?;
        write::update_transaction(id, &input, &amount, &charges, &net_amount, &now, &mut tx)
            .await?;

        self.rebuild_in(&mut tx, existing.symbol(), now).await?;
        if input.symbol() != existing.symbol() {
            self.rebuild_in(&mut tx, input.symbol(), now).await?;
        }

        let updated = read::fetch_transaction(&mut tx, id)
            .await?
            .ok_or_else(|| PortfolioError::not_found(format!("Transaction {}", id)))?;
        tx.commit().await?;

        info!(id, symbol = %updated.symbol(), "transaction edited");
        Ok(updated)
    }

    /// Removes a trade (and its realized record) and replays what's left of
    /// its symbol. A history that no longer adds up aborts the delete.
    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        let (_guards, existing) = self.lock_transaction(id, None).await?;
        let now = self.now();

        let mut tx = self.begin_write().await?;
        write::delete_transaction(id, &mut tx).await?;
        self.rebuild_in(&mut tx, existing.symbol(), now).await?;
        tx.commit().await?;

        info!(id, symbol = %existing.symbol(), "transaction deleted");
        Ok(())
    }

    pub async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let mut conn = self.pool.acquire().await?;
        read::fetch_transaction(&mut conn, id)
            .await?
            .ok_or_else(|| PortfolioError::not_found(format!("Transaction {}", id)))
    }

    pub async fn list_transactions(&self, filter: TransactionFilter) -> Result<Page<Transaction>> {
        filter.validate()?;
        let filter = TransactionFilter {
            symbol: filter.symbol.as_deref().map(normalize_symbol).transpose()?,
            ..filter
        };

        let mut conn = self.pool.acquire().await?;
        let (transactions, total) = read::search_transactions(&mut conn, &filter).await?;
        Ok(Page::new(transactions, total, filter.page, filter.limit))
    }

    pub async fn get_holding(&self, symbol: &str) -> Result<Holding> {
        let symbol = normalize_symbol(symbol)?;
        let mut conn = self.pool.acquire().await?;
        read::fetch_holding(&mut conn, &symbol)
            .await?
            .ok_or_else(|| PortfolioError::not_found(format!("Holding {}", symbol)))
    }

    pub async fn get_holdings(&self) -> Result<Vec<Holding>> {
        let mut conn = self.pool.acquire().await?;
        Ok(read::fetch_holdings(&mut conn).await?)
    }

    pub async fn get_portfolio_summary(&self) -> Result<PortfolioSummary> {
        let mut conn = self.pool.acquire().await?;
        let holdings = read::fetch_holdings(&mut conn).await?;
        let transactions = read::fetch_all_transactions(&mut conn).await?;
        Ok(reports::summarize(holdings, &transactions))
    }

    pub async fn list_realized_pnl(&self, filter: RealizedPnlFilter) -> Result<Vec<RealizedPnl>> {
        filter.validate()?;
        let filter = RealizedPnlFilter {
            symbol: filter.symbol.as_deref().map(normalize_symbol).transpose()?,
            ..filter
        };

        let mut conn = self.pool.acquire().await?;
        Ok(read::search_realized_pnl(&mut conn, &filter).await?)
    }

    pub async fn script_details(&self, symbol: &str) -> Result<ScriptDetails> {
        let symbol = normalize_symbol(symbol)?;
        let mut conn = self.pool.acquire().await?;

        let holding = read::fetch_holding(&mut conn, &symbol)
            .await?
            .ok_or_else(|| PortfolioError::not_found(format!("Holding {}", symbol)))?;
        let mut transactions = read::fetch_symbol_history(&mut conn, &symbol).await?;
        transactions.reverse();
        let realized = read::search_realized_pnl(
            &mut conn,
            &RealizedPnlFilter {
                symbol: Some(symbol),
                ..RealizedPnlFilter::default()
            },
        )
        .await?;

        Ok(ScriptDetails::new(holding, transactions, realized))
    }

    pub async fn monthly_pnl(&self, year: Option<i32>) -> Result<Vec<MonthlyPnl>> {
        let records = self.list_realized_pnl(RealizedPnlFilter::default()).await?;
        Ok(reports::monthly_pnl(&records, year))
    }

    pub async fn yearly_pnl(&self) -> Result<Vec<YearlyPnl>> {
        let records = self.list_realized_pnl(RealizedPnlFilter::default()).await?;
        let mut conn = self.pool.acquire().await?;
        let transactions = read::fetch_all_transactions(&mut conn).await?;
        Ok(reports::yearly_pnl(&records, &transactions))
    }

    pub async fn script_wise_pnl(&self) -> Result<Vec<ScriptPnl>> {
        let mut conn = self.pool.acquire().await?;
        let holdings = read::fetch_holdings(&mut conn).await?;
        let transactions = read::fetch_all_transactions(&mut conn).await?;
        Ok(reports::script_wise_pnl(&holdings, &transactions))
    }

    /// Discards and re-derives the holding and realized records of `symbol`.
    pub async fn rebuild(&self, symbol: &str) -> Result<Replay> {
        let symbol = normalize_symbol(symbol)?;
        let _guard = self.locks.lock(&symbol).await;
        let now = self.now();

        let mut tx = self.begin_write().await?;
        let replayed = self.rebuild_in(&mut tx, &symbol, now).await?;
        tx.commit().await?;

        info!(symbol = %symbol, sales = replayed.realized().len(), "symbol rebuilt");
        Ok(replayed)
    }

    /// Rebuilds every symbol that has history or a holding; stops at the
    /// first one whose history is inconsistent.
    pub async fn rebuild_all(&self) -> Result<usize> {
        let symbols = {
            let mut conn = self.pool.acquire().await?;
            read::fetch_symbols(&mut conn).await?
        };
        for symbol in &symbols {
            self.rebuild(symbol).await?;
        }
        Ok(symbols.len())
    }

    /// Books every row of a `date,side,symbol,quantity,rate` CSV file, in
    /// file order, each as its own transaction.
    pub async fn import_transactions(&self, path: &Path) -> Result<Vec<Transaction>> {
        let mut reader = Reader::from_path(path).map_err(|err| {
            PortfolioError::validation(format!("Failed to open CSV file {}: {}", path.display(), err))
        })?;

        let mut imported = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let row = row_idx + 1;
            let rec = record.map_err(|err| {
                PortfolioError::validation(format!("Failed to read CSV record at row {}: {}", row, err))
            })?;

            if rec.len() < 5 {
                return Err(PortfolioError::validation(format!(
                    "Invalid CSV format at row {}: expected 5 columns, found {}",
                    row,
                    rec.len()
                )));
            }

            let side = match rec[1].trim().parse::<TradeSide>() {
                Ok(side) => side,
                Err(_) => {
                    warn!(row, side = &rec[1], "skipping row with unknown side");
                    continue;
                }
            };

            let input = parse_row(&rec, side)
                .map_err(|err| PortfolioError::validation(format!("Row {}: {:#}", row, err)))?;

            match self.create_transaction(input).await {
                Ok(transaction) => imported.push(transaction),
                Err(err) => {
                    error!(row, error = %err, "import stopped");
                    return Err(err);
                }
            }
        }

        info!(count = imported.len(), path = %path.display(), "transactions imported");
        Ok(imported)
    }

    async fn rebuild_in(
        &self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        symbol: &str,
        now: DateTime<Local>,
    ) -> Result<Replay> {
        let mut history = read::fetch_symbol_history(&mut **tx, symbol).await?;
        sort_chronologically(&mut history);

        let replayed = replay(&history, &self.ledger, now).inspect_err(|err| {
            error!(symbol, error = %err, "replay failed, keeping previous state");
        })?;

        write::clear_symbol_state(symbol, tx).await?;
        if let Some(holding) = replayed.holding() {
            write::upsert_holding(holding, tx).await?;
        }
        let mut persisted = Vec::with_capacity(replayed.realized().len());
        for record in replayed.realized() {
            let id = write::insert_realized_pnl(record, tx).await?;
            persisted.push(record.clone().with_id(id));
        }

        let (holding, _) = replayed.into_parts();
        Ok(Replay::new(holding, persisted))
    }

    /// Locks the symbol a stored trade belongs to (plus `also`), re-checking
    /// that an edit didn't move the trade while we waited.
    async fn lock_transaction(
        &self,
        id: i64,
        also: Option<&str>,
    ) -> Result<(Vec<OwnedMutexGuard<()>>, Transaction)> {
        loop {
            let current = self.get_transaction(id).await?;
            let mut symbols = vec![current.symbol().as_str()];
            symbols.extend(also);
            let guards = self.locks.lock_all(&symbols).await;

            let locked = self.get_transaction(id).await?;
            if locked.symbol() == current.symbol() {
                return Ok((guards, locked));
            }
        }
    }
}

fn parse_row(rec: &csv::StringRecord, side: TradeSide) -> anyhow::Result<NewTransaction> {
    Ok(NewTransaction::new(
        parse_date(rec[0].trim())?,
        rec[2].trim().to_string(),
        side,
        parse_quantity(rec[3].trim())?,
        parse_decimal(rec[4].trim(), "rate")?,
    ))
}
