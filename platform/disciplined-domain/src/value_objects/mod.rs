pub mod daily_pnl;
pub mod drawdown_point;
pub mod equity_point;
pub mod side;
pub mod trade;
