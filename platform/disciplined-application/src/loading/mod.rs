use disciplined_domain::repositories::trades::TradeSource;
use disciplined_domain::services::validation::validate_trade;
use disciplined_domain::value_objects::trade::Trade;
use std::time::Instant;
use tracing::{info, info_span};

/// Loads a trade set and re-validates every record before it reaches the engine.
pub fn load_trades(source: &dyn TradeSource) -> Result<Vec<Trade>, String> {
    let description = source.describe();
    let _span = info_span!("load_trades", source = %description).entered();
    let start = Instant::now();

    let trades = source
        .load_trades()
        .map_err(|err| format!("failed to load trades from {description}: {err}"))?;
    for (idx, trade) in trades.iter().enumerate() {
        validate_trade(trade).map_err(|err| {
            format!(
                "{description}: invalid trade #{} ({}): {err}",
                idx + 1,
                trade.symbol
            )
        })?;
    }

    metrics::histogram!("disciplined.source.load_ms")
        .record(start.elapsed().as_secs_f64() * 1000.0);
    metrics::gauge!("disciplined.source.trades_loaded").set(trades.len() as f64);
    info!(trades = trades.len(), "trades loaded");
    Ok(trades)
}
