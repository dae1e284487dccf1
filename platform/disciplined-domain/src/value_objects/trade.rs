use crate::value_objects::side::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed trade. `profit` drives every metric; `close_price` is display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub volume: f64,
    pub open_price: f64,
    pub close_price: f64,
    pub profit: f64,
}
