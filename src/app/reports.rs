use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;

use super::calc::round_rate;
use crate::models::{
    Holding, MonthlyPnl, PortfolioSummary, RealizedPnl, ScriptPnl, TradeSide, Transaction,
    YearlyPnl,
};

/// Cash recovered from sales: the SELL side's net amounts.
pub fn total_recovered<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    transactions
        .into_iter()
        .filter(|t| *t.side() == TradeSide::Sell)
        .map(|t| *t.net_amount())
        .sum()
}

pub fn summarize(holdings: Vec<Holding>, transactions: &[Transaction]) -> PortfolioSummary {
    let total_invested = holdings.iter().map(|h| *h.total_invested_amount()).sum();
    let total_realized_pnl = holdings.iter().map(|h| *h.total_realized_pnl()).sum();
    let total_shares_held = holdings.iter().map(|h| *h.available_quantity()).sum();
    let active_symbol_count = holdings.iter().filter(|h| h.is_active()).count();

    PortfolioSummary::new(
        holdings,
        total_invested,
        total_recovered(transactions),
        total_realized_pnl,
        total_shares_held,
        active_symbol_count,
    )
}

/// Realized P/L bucketed by calendar month of the sale, oldest first.
pub fn monthly_pnl(records: &[RealizedPnl], year: Option<i32>) -> Vec<MonthlyPnl> {
    let mut months: BTreeMap<(i32, u32), Vec<&RealizedPnl>> = BTreeMap::new();
    for record in records {
        let date = record.sell_date();
        if year.is_some_and(|year| date.year() != year) {
            continue;
        }
        months
            .entry((date.year(), date.month()))
            .or_default()
            .push(record);
    }

    months
        .into_iter()
        .map(|((year, month), records)| {
            let pnls = records.iter().map(|r| *r.realized_pnl());
            let total_profit = pnls.clone().filter(|p| *p > Decimal::ZERO).sum();
            let total_loss = pnls.clone().filter(|p| *p < Decimal::ZERO).sum();
            MonthlyPnl::new(
                year,
                month,
                pnls.sum(),
                total_profit,
                total_loss,
                records.len(),
            )
        })
        .collect()
}

/// Yearly roll-up, newest year first. Charges count every trade dated in
/// the year, buys included.
pub fn yearly_pnl(records: &[RealizedPnl], transactions: &[Transaction]) -> Vec<YearlyPnl> {
    let mut charges: BTreeMap<i32, Decimal> = BTreeMap::new();
    for transaction in transactions {
        *charges.entry(transaction.date().year()).or_default() += *transaction.charges().total();
    }

    let mut years: BTreeMap<i32, Vec<MonthlyPnl>> = BTreeMap::new();
    for month in monthly_pnl(records, None) {
        years.entry(*month.year()).or_default().push(month);
    }
    for year in charges.keys() {
        years.entry(*year).or_default();
    }

    years
        .into_iter()
        .rev()
        .map(|(year, months)| {
            let total_pnl = months.iter().map(|m| *m.total_pnl()).sum();
            let sale_count = months.iter().map(|m| *m.sale_count()).sum();
            let total_charges = charges.get(&year).copied().unwrap_or_default();
            YearlyPnl::new(year, total_pnl, sale_count, total_charges, months)
        })
        .collect()
}

/// Per-symbol trading statistics. Average rates are plain means over trades.
pub fn script_wise_pnl(holdings: &[Holding], transactions: &[Transaction]) -> Vec<ScriptPnl> {
    holdings
        .iter()
        .map(|holding| {
            let trades: Vec<&Transaction> = transactions
                .iter()
                .filter(|t| t.symbol() == holding.symbol())
                .collect();

            ScriptPnl::new(
                holding.symbol().clone(),
                *holding.total_realized_pnl(),
                holding.total_shares_bought() + holding.total_shares_sold(),
                *holding.total_invested_amount(),
                total_recovered(trades.iter().copied()),
                mean_rate(&trades, TradeSide::Buy),
                mean_rate(&trades, TradeSide::Sell),
                *holding.available_quantity(),
                *holding.avg_cost_per_share(),
            )
        })
        .collect()
}

fn mean_rate(trades: &[&Transaction], side: TradeSide) -> Decimal {
    let rates: Vec<Decimal> = trades
        .iter()
        .filter(|t| *t.side() == side)
        .map(|t| *t.rate())
        .collect();
    if rates.is_empty() {
        return Decimal::ZERO;
    }
    round_rate(rates.iter().sum::<Decimal>() / Decimal::from(rates.len()))
}
