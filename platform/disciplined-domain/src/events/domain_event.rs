use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    TradeSetChanged {
        source: String,
        fingerprint: String,
        trades: usize,
    },
    MetricsRecomputed {
        fingerprint: String,
        total_trades: usize,
        elapsed_us: u64,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TradeSetChanged { .. } => "trade_set_changed",
            DomainEvent::MetricsRecomputed { .. } => "metrics_recomputed",
        }
    }
}
