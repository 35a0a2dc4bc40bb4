use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Holding, RealizedPnl, Transaction};

#[derive(Clone, Debug, Default, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct PortfolioSummary {
    holdings: Vec<Holding>,
    total_invested: Decimal,
    total_recovered: Decimal,
    total_realized_pnl: Decimal,
    total_shares_held: i64,
    active_symbol_count: usize,
}

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct ScriptDetails {
    holding: Holding,
    transactions: Vec<Transaction>,
    realized: Vec<RealizedPnl>,
}

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct MonthlyPnl {
    year: i32,
    month: u32,
    total_pnl: Decimal,
    total_profit: Decimal,
    total_loss: Decimal,
    sale_count: usize,
}

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct YearlyPnl {
    year: i32,
    total_pnl: Decimal,
    sale_count: usize,
    total_charges: Decimal,
    months: Vec<MonthlyPnl>,
}

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct ScriptPnl {
    symbol: String,
    total_pnl: Decimal,
    total_quantity_traded: i64,
    total_invested: Decimal,
    total_recovered: Decimal,
    avg_buy_rate: Decimal,
    avg_sell_rate: Decimal,
    available_quantity: i64,
    avg_cost_per_share: Decimal,
}
