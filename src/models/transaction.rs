use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate};
use derive_getters::Getters;
use derive_new::new;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::Charges;
use crate::error::{PortfolioError, Result};

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{1,10}$").expect("symbol pattern is valid"));

const MAX_RATE_SCALE: u32 = 4;

/// Largest single trade the ledger accepts. Keeps amounts and running totals
/// well inside `Decimal` and `i64` range.
pub const MAX_QUANTITY: i64 = 1_000_000_000;
pub const MAX_RATE: Decimal = dec!(1_000_000);

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct Transaction {
    id: i64,
    date: NaiveDate,
    symbol: String,
    side: TradeSide,
    quantity: i64,
    rate: Decimal,
    amount: Decimal,
    charges: Charges,
    net_amount: Decimal,
    created_at: DateTime<Local>,
    updated_at: DateTime<Local>,
}

#[derive(
    AsRefStr, Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn to_str(&self) -> &str {
        self.as_ref()
    }
}

/// A trade as entered by the user, before charges are applied.
#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct NewTransaction {
    date: NaiveDate,
    symbol: String,
    side: TradeSide,
    quantity: i64,
    rate: Decimal,
}

/// What a trade would cost or return, priced but not booked.
#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct TradePreview {
    date: NaiveDate,
    symbol: String,
    side: TradeSide,
    quantity: i64,
    rate: Decimal,
    amount: Decimal,
    charges: Charges,
    net_amount: Decimal,
}

impl NewTransaction {
    /// Normalizes the symbol and rejects anything the ledger can't book.
    pub fn validate(self, today: NaiveDate) -> Result<NewTransaction> {
        let symbol = normalize_symbol(&self.symbol)?;

        if self.date > today {
            return Err(PortfolioError::validation(format!(
                "Transaction date {} is in the future",
                self.date
            )));
        }

        if self.quantity <= 0 {
            return Err(PortfolioError::validation(format!(
                "Quantity must be a positive number of shares, got {}",
                self.quantity
            )));
        }

        if self.quantity > MAX_QUANTITY {
            return Err(PortfolioError::validation(format!(
                "Quantity {} exceeds the limit of {} shares per trade",
                self.quantity, MAX_QUANTITY
            )));
        }

        if self.rate <= Decimal::ZERO {
            return Err(PortfolioError::validation(format!(
                "Rate must be positive, got {}",
                self.rate
            )));
        }

        if self.rate > MAX_RATE {
            return Err(PortfolioError::validation(format!(
                "Rate {} exceeds the limit of {} per share",
                self.rate, MAX_RATE
            )));
        }

        let rate = self.rate.normalize();
        if rate.scale() > MAX_RATE_SCALE {
            return Err(PortfolioError::validation(format!(
                "Rate {} has more than {} decimal places",
                self.rate, MAX_RATE_SCALE
            )));
        }

        Ok(NewTransaction { symbol, rate, ..self })
    }
}

pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if !SYMBOL_PATTERN.is_match(&symbol) {
        return Err(PortfolioError::validation(format!(
            "Symbol '{}' must be 1-10 letters or digits",
            symbol
        )));
    }
    Ok(symbol)
}
