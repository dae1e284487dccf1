use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub cumulative_profit: f64,
}
