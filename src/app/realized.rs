use derive_getters::Getters;
use rust_decimal::Decimal;

use super::calc::percentage_of;
use crate::models::Charges;

/// Proceeds and gain of one sale, before it is tied to a transaction.
#[derive(Clone, Debug, Eq, Getters, PartialEq)]
pub struct SaleOutcome {
    gross_proceeds: Decimal,
    net_proceeds: Decimal,
    cost_basis: Decimal,
    realized_pnl: Decimal,
    pnl_percentage: Decimal,
}

/// `avg_cost_basis` must be the holding's average before this sale touches
/// it. `None` when the figures overflow.
pub fn record_sale(
    quantity_sold: i64,
    sell_rate: Decimal,
    avg_cost_basis: Decimal,
    sell_charges: &Charges,
) -> Option<SaleOutcome> {
    let shares = Decimal::from(quantity_sold);
    let gross_proceeds = shares.checked_mul(sell_rate)?;
    let net_proceeds = gross_proceeds.checked_sub(*sell_charges.total())?;
    let cost_basis = shares.checked_mul(avg_cost_basis)?;
    let realized_pnl = net_proceeds.checked_sub(cost_basis)?;

    Some(SaleOutcome {
        gross_proceeds,
        net_proceeds,
        cost_basis,
        realized_pnl,
        pnl_percentage: percentage_of(realized_pnl, cost_basis)?,
    })
}
