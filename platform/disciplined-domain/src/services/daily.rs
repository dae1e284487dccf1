use crate::entities::metrics::sort_by_close_time;
use crate::value_objects::daily_pnl::DailyPnl;
use crate::value_objects::trade::Trade;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Profit summed per UTC close date, densified over the full date range.
///
/// Days without trades are present with a zero PNL so calendar views can
/// index the table directly. An empty trade set yields an empty table.
pub fn daily_pnl(trades: &[Trade]) -> Vec<DailyPnl> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for trade in sort_by_close_time(trades) {
        *by_date.entry(trade.timestamp.date_naive()).or_insert(0.0) += trade.profit;
    }

    let (Some(first), Some(last)) = (
        by_date.keys().next().copied(),
        by_date.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DailyPnl {
            date,
            pnl: by_date.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}
