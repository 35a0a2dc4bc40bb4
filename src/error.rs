use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient quantity for {symbol}. Available: {available}, Requested: {requested}")]
    InsufficientQuantity {
        symbol: String,
        available: i64,
        requested: i64,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Inconsistent history for {symbol} at transaction {transaction_id}: {message}")]
    Consistency {
        symbol: String,
        transaction_id: i64,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PortfolioError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortfolioError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        PortfolioError::NotFound(what.into())
    }
}
