use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub timestamp: DateTime<Utc>,
    pub peak_to_date: f64,
    /// Distance below `peak_to_date`; never negative.
    pub drawdown: f64,
}
