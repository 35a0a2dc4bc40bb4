use chrono::{DateTime, Local, NaiveDate};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gain or loss booked by one SELL against the average cost at that moment.
///
/// `id` is `None` until the record has been written to the store.
#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct RealizedPnl {
    id: Option<i64>,
    transaction_id: i64,
    symbol: String,
    sell_date: NaiveDate,
    quantity_sold: i64,
    sell_rate: Decimal,
    avg_cost_basis: Decimal,
    gross_proceeds: Decimal,
    net_proceeds: Decimal,
    cost_basis: Decimal,
    realized_pnl: Decimal,
    pnl_percentage: Decimal,
    created_at: DateTime<Local>,
}

impl RealizedPnl {
    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}
