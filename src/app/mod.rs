pub mod app;
pub mod calc;
pub mod clock;
pub mod ledger;
pub mod locks;
pub mod portfolio;
pub mod realized;
pub mod replay;
pub mod reports;
pub mod ui;
pub mod utils;

pub use app::App;
pub use calc::ChargeSchedule;
pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger::{InvestedAmountPolicy, Ledger};
pub use portfolio::Portfolio;
pub use replay::Replay;
