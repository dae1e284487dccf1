use crate::reporting;
use disciplined_domain::repositories::trades::TradeSource;
use disciplined_domain::value_objects::trade::Trade;
use std::path::PathBuf;
use tracing::debug;

/// Trade table on disk in the `timestamp,symbol,side,volume,open_price,close_price,profit`
/// layout. A previous export is accepted as-is.
#[derive(Debug, Clone)]
pub struct CsvTradeSource {
    path: PathBuf,
}

impl CsvTradeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TradeSource for CsvTradeSource {
    fn describe(&self) -> String {
        format!("csv({})", self.path.display())
    }

    fn load_trades(&self) -> Result<Vec<Trade>, String> {
        if !self.path.exists() {
            return Err(format!("trades file not found: {}", self.path.display()));
        }
        let trades = reporting::read_trades_csv(&self.path)?;
        debug!(path = %self.path.display(), rows = trades.len(), "csv trades read");
        Ok(trades)
    }
}
