use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::{
    error::{PortfolioError, Result},
    models::{Charges, TradeSide},
};

/// PSX brokerage schedule. Commission is tiered on the share price: above
/// `commission_rate_threshold` the broker takes a percentage of the trade
/// value, at or below it a flat amount per share.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChargeSchedule {
    pub commission_rate_threshold: Decimal,
    pub commission_percent: Decimal,
    pub commission_per_share: Decimal,
    pub tax_on_commission: Decimal,
    pub depository_fee_per_share: Decimal,
}

impl Default for ChargeSchedule {
    fn default() -> Self {
        Self {
            commission_rate_threshold: dec!(33.33),
            commission_percent: dec!(0.0015),
            commission_per_share: dec!(0.05),
            tax_on_commission: dec!(0.15),
            depository_fee_per_share: dec!(0.005),
        }
    }
}

impl ChargeSchedule {
    /// `None` when a charge doesn't fit in a `Decimal`.
    pub fn compute_charges(
        &self,
        rate: Decimal,
        amount: Decimal,
        quantity: i64,
    ) -> Option<Charges> {
        let shares = Decimal::from(quantity);

        let commission = if rate > self.commission_rate_threshold {
            amount.checked_mul(self.commission_percent)?
        } else {
            shares.checked_mul(self.commission_per_share)?
        };
        let commission = round_money(commission);
        let tax = round_money(commission.checked_mul(self.tax_on_commission)?);
        let depository_fee = round_money(shares.checked_mul(self.depository_fee_per_share)?);
        let total = commission.checked_add(tax)?.checked_add(depository_fee)?;

        Some(Charges::new(commission, tax, depository_fee, total))
    }

    /// Gross amount, charges and cash movement of a trade. Buyers pay the
    /// charges on top, sellers have them deducted.
    pub fn price(
        &self,
        side: TradeSide,
        quantity: i64,
        rate: Decimal,
    ) -> Result<(Decimal, Charges, Decimal)> {
        let priced = Decimal::from(quantity).checked_mul(rate).and_then(|amount| {
            let charges = self.compute_charges(rate, amount, quantity)?;
            let net_amount = match side {
                TradeSide::Buy => amount.checked_add(*charges.total())?,
                TradeSide::Sell => amount.checked_sub(*charges.total())?,
            };
            Some((amount, charges, net_amount))
        });

        priced.ok_or_else(|| {
            PortfolioError::validation(format!(
                "{} {} shares at {} is too large to price",
                side, quantity, rate
            ))
        })
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Weighted average after adding `quantity` shares that cost `net_amount` in
/// total. `None` on overflow.
pub fn new_average_cost(
    current_quantity: i64,
    current_avg_cost: Decimal,
    quantity: i64,
    net_amount: Decimal,
) -> Option<Decimal> {
    let total_quantity = Decimal::from(current_quantity.checked_add(quantity)?);
    if total_quantity.is_zero() {
        return Some(Decimal::ZERO);
    }
    let total_cost = Decimal::from(current_quantity)
        .checked_mul(current_avg_cost)?
        .checked_add(net_amount)?;
    total_cost.checked_div(total_quantity).map(round_rate)
}

pub fn percentage_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?.checked_mul(dec!(100)).map(round_rate)
}
