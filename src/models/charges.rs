use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker commission, sales tax on the commission and CDC fee for one trade.
#[derive(Clone, Debug, Default, Deserialize, Eq, Getters, PartialEq, Serialize, new)]
pub struct Charges {
    commission: Decimal,
    tax: Decimal,
    depository_fee: Decimal,
    total: Decimal,
}
