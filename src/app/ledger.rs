use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::{calc::new_average_cost, realized::record_sale};
use crate::{
    error::{PortfolioError, Result},
    models::{Holding, RealizedPnl, TradeSide, Transaction},
};

/// What happens to `total_invested_amount` when shares are sold.
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, PartialEq,
    Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum InvestedAmountPolicy {
    /// Keep the lifetime total of every BUY's net amount.
    #[default]
    Retain,
    /// Release the sold shares' cost basis, leaving the capital still at work.
    Proportional,
}

/// Applies single transactions to a symbol's holding. Pure; the caller
/// decides what gets persisted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ledger {
    policy: InvestedAmountPolicy,
}

impl Ledger {
    pub fn new(policy: InvestedAmountPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InvestedAmountPolicy {
        self.policy
    }

    pub fn apply(
        &self,
        holding: Option<&Holding>,
        transaction: &Transaction,
        now: DateTime<Local>,
    ) -> Result<(Holding, Option<RealizedPnl>)> {
        match transaction.side() {
            TradeSide::Buy => Ok((self.apply_buy(holding, transaction, now)?, None)),
            TradeSide::Sell => {
                let (holding, realized) = self.apply_sell(holding, transaction, now)?;
                Ok((holding, Some(realized)))
            }
        }
    }

    pub fn apply_buy(
        &self,
        holding: Option<&Holding>,
        transaction: &Transaction,
        now: DateTime<Local>,
    ) -> Result<Holding> {
        let quantity = *transaction.quantity();
        let net_amount = *transaction.net_amount();

        let holding = match holding {
            None => Holding::new(
                transaction.symbol().clone(),
                quantity,
                new_average_cost(0, Decimal::ZERO, quantity, net_amount)
                    .ok_or_else(|| overflow(transaction))?,
                net_amount,
                quantity,
                0,
                Decimal::ZERO,
                now,
            ),
            Some(existing) => Holding::new(
                existing.symbol().clone(),
                existing
                    .available_quantity()
                    .checked_add(quantity)
                    .ok_or_else(|| overflow(transaction))?,
                new_average_cost(
                    *existing.available_quantity(),
                    *existing.avg_cost_per_share(),
                    quantity,
                    net_amount,
                )
                .ok_or_else(|| overflow(transaction))?,
                existing
                    .total_invested_amount()
                    .checked_add(net_amount)
                    .ok_or_else(|| overflow(transaction))?,
                existing
                    .total_shares_bought()
                    .checked_add(quantity)
                    .ok_or_else(|| overflow(transaction))?,
                *existing.total_shares_sold(),
                *existing.total_realized_pnl(),
                now,
            ),
        };

        Ok(holding)
    }

    /// Fails with `InsufficientQuantity` without touching anything when the
    /// holding can't cover the sale.
    pub fn apply_sell(
        &self,
        holding: Option<&Holding>,
        transaction: &Transaction,
        now: DateTime<Local>,
    ) -> Result<(Holding, RealizedPnl)> {
        let quantity = *transaction.quantity();
        let available = holding.map(|h| *h.available_quantity()).unwrap_or(0);

        let existing = match holding {
            Some(existing) if available >= quantity => existing,
            _ => {
                return Err(PortfolioError::InsufficientQuantity {
                    symbol: transaction.symbol().clone(),
                    available,
                    requested: quantity,
                });
            }
        };

        let avg_cost = *existing.avg_cost_per_share();
        let outcome = record_sale(quantity, *transaction.rate(), avg_cost, transaction.charges())
            .ok_or_else(|| overflow(transaction))?;

        let remaining = available - quantity;
        let invested = match self.policy {
            InvestedAmountPolicy::Retain => *existing.total_invested_amount(),
            InvestedAmountPolicy::Proportional if remaining == 0 => Decimal::ZERO,
            InvestedAmountPolicy::Proportional => {
                (existing.total_invested_amount() - outcome.cost_basis()).max(Decimal::ZERO)
            }
        };

        let updated = Holding::new(
            existing.symbol().clone(),
            remaining,
            avg_cost,
            invested,
            *existing.total_shares_bought(),
            existing
                .total_shares_sold()
                .checked_add(quantity)
                .ok_or_else(|| overflow(transaction))?,
            existing
                .total_realized_pnl()
                .checked_add(*outcome.realized_pnl())
                .ok_or_else(|| overflow(transaction))?,
            now,
        );

        let realized = RealizedPnl::new(
            None,
            *transaction.id(),
            transaction.symbol().clone(),
            *transaction.date(),
            quantity,
            *transaction.rate(),
            avg_cost,
            *outcome.gross_proceeds(),
            *outcome.net_proceeds(),
            *outcome.cost_basis(),
            *outcome.realized_pnl(),
            *outcome.pnl_percentage(),
            now,
        );

        Ok((updated, realized))
    }
}

fn overflow(transaction: &Transaction) -> PortfolioError {
    PortfolioError::validation(format!(
        "{} of {} {} shares overflows the holding's totals",
        transaction.side(),
        transaction.quantity(),
        transaction.symbol()
    ))
}
