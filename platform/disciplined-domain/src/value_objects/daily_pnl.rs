use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: f64,
}
