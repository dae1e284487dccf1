use chrono::NaiveDate;
use disciplined_domain::entities::metrics::compute_metrics;
use disciplined_domain::services::daily::daily_pnl;
use disciplined_domain::services::validation::{validate_raw_trade, RawTrade};
use disciplined_domain::value_objects::trade::Trade;

fn raw(ts: &str, side: &str, volume: &str, profit: &str) -> RawTrade {
    RawTrade {
        timestamp: Some(ts.to_string()),
        symbol: Some("EURUSD".to_string()),
        side: Some(side.to_string()),
        volume: Some(volume.to_string()),
        open_price: Some("1.08000".to_string()),
        close_price: None,
        profit: Some(profit.to_string()),
    }
}

fn journal() -> Vec<Trade> {
    [
        raw("2024-05-03T16:00:00Z", "SELL", "1.0", "200"),
        raw("2024-05-01T09:00:00Z", "BUY", "0.5", "100"),
        raw("2024-05-01T17:30:00Z", "BUY", "0.25", "-50"),
    ]
    .iter()
    .map(|record| validate_raw_trade(record).expect("valid record"))
    .collect()
}

#[test]
fn validated_journal_flows_through_engine() {
    let trades = journal();
    // Derived close prices: 1.08 - 200/100_000, 1.08 + 100/50_000, 1.08 - 50/25_000.
    let closes: Vec<f64> = trades.iter().map(|t| t.close_price).collect();
    assert_eq!(closes, vec![1.078, 1.082, 1.078]);

    let report = compute_metrics(&trades);
    assert_eq!(report.summary.total_pnl, 250.0);
    assert_eq!(report.summary.max_drawdown, 50.0);
    let equity: Vec<f64> = report
        .equity_curve
        .iter()
        .map(|p| p.cumulative_profit)
        .collect();
    assert_eq!(equity, vec![100.0, 50.0, 250.0]);

    let daily = daily_pnl(&trades);
    let rows: Vec<(NaiveDate, f64)> = daily.iter().map(|row| (row.date, row.pnl)).collect();
    assert_eq!(
        rows,
        vec![
            (NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 50.0),
            (NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 0.0),
            (NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(), 200.0),
        ]
    );
}

#[test]
fn profit_not_close_price_drives_metrics() {
    let mut trades = journal();
    for trade in &mut trades {
        trade.close_price = 99.0;
    }
    assert_eq!(compute_metrics(&trades), compute_metrics(&journal()));
}
