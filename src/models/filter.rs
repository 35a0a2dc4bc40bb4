use chrono::NaiveDate;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use super::TradeSide;
use crate::error::{PortfolioError, Result};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

/// Transaction query. Unset fields don't filter; `page` is 1-based.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransactionFilter {
    pub symbol: Option<String>,
    pub side: Option<TradeSide>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: i64,
    pub limit: i64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            symbol: None,
            side: None,
            date_from: None,
            date_to: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TransactionFilter {
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(PortfolioError::validation(format!(
                "Page must be at least 1, got {}",
                self.page
            )));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(PortfolioError::validation(format!(
                "Limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        check_range(self.date_from, self.date_to)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RealizedPnlFilter {
    pub symbol: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl RealizedPnlFilter {
    pub fn validate(&self) -> Result<()> {
        check_range(self.date_from, self.date_to)
    }
}

fn check_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(PortfolioError::validation(format!(
            "Date range starts ({}) after it ends ({})",
            from, to
        ))),
        _ => Ok(()),
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Getters, PartialEq, Serialize)]
pub struct Page<T> {
    data: Vec<T>,
    total: i64,
    page: i64,
    limit: i64,
    pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            data,
            total,
            page,
            limit,
            pages,
        }
    }
}
