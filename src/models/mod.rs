pub mod charges;
pub mod filter;
pub mod holding;
pub mod realized_pnl;
pub mod report;
pub mod transaction;

pub use charges::Charges;
pub use filter::{Page, RealizedPnlFilter, TransactionFilter};
pub use holding::Holding;
pub use realized_pnl::RealizedPnl;
pub use report::{MonthlyPnl, PortfolioSummary, ScriptDetails, ScriptPnl, YearlyPnl};
pub use transaction::{
    MAX_QUANTITY, MAX_RATE, NewTransaction, TradePreview, TradeSide, Transaction,
    normalize_symbol,
};
