use chrono::{DateTime, Local};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running position in one symbol. Derived from the transaction history,
/// never edited directly.
#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct Holding {
    symbol: String,
    available_quantity: i64,
    avg_cost_per_share: Decimal,
    total_invested_amount: Decimal,
    total_shares_bought: i64,
    total_shares_sold: i64,
    total_realized_pnl: Decimal,
    updated_at: DateTime<Local>,
}

impl Holding {
    pub fn is_active(&self) -> bool {
        self.available_quantity > 0
    }
}
