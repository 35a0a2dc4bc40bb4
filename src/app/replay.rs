use chrono::{DateTime, Local};
use derive_getters::Getters;
use derive_new::new;
use tracing::debug;

use super::ledger::Ledger;
use crate::{
    error::{PortfolioError, Result},
    models::{Holding, RealizedPnl, Transaction},
};

/// Derived state for one symbol, rebuilt from its history.
#[derive(Clone, Debug, Default, Eq, Getters, PartialEq, new)]
pub struct Replay {
    holding: Option<Holding>,
    realized: Vec<RealizedPnl>,
}

impl Replay {
    pub fn into_parts(self) -> (Option<Holding>, Vec<RealizedPnl>) {
        (self.holding, self.realized)
    }
}

/// Orders history the way replay consumes it: by trade date, then by id.
pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date().cmp(b.date()).then_with(|| a.id().cmp(b.id())));
}

/// Folds `transactions` (already in chronological order) over an empty
/// holding. A sale the history can't cover, or a total that overflows, is
/// reported as a consistency failure naming the offending transaction.
pub fn replay(transactions: &[Transaction], ledger: &Ledger, now: DateTime<Local>) -> Result<Replay> {
    transactions
        .iter()
        .try_fold(Replay::default(), |mut state, transaction| {
            debug!(
                id = transaction.id(),
                symbol = %transaction.symbol(),
                side = %transaction.side(),
                quantity = transaction.quantity(),
                "replaying transaction"
            );

            let (holding, realized) = ledger
                .apply(state.holding.as_ref(), transaction, now)
                .map_err(|err| match err {
                    PortfolioError::InsufficientQuantity {
                        symbol,
                        available,
                        requested,
                    } => PortfolioError::Consistency {
                        symbol,
                        transaction_id: *transaction.id(),
                        message: format!(
                            "SELL of {} on {} exceeds the {} shares held at that point",
                            requested,
                            transaction.date(),
                            available
                        ),
                    },
                    PortfolioError::Validation(message) => PortfolioError::Consistency {
                        symbol: transaction.symbol().clone(),
                        transaction_id: *transaction.id(),
                        message,
                    },
                    other => other,
                })?;

            state.holding = Some(holding);
            state.realized.extend(realized);
            Ok(state)
        })
}
