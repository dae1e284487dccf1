use crate::value_objects::drawdown_point::DrawdownPoint;
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade::Trade;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_pnl: f64,
    pub total_trades: usize,
    /// Percentage of trades with positive profit, in `[0, 100]`.
    pub win_rate: f64,
    pub average_gain: f64,
    pub average_loss: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    pub summary: MetricsSummary,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: Vec<DrawdownPoint>,
}

/// Stable sort by close time; trades sharing a timestamp keep their input order.
pub fn sort_by_close_time(trades: &[Trade]) -> Vec<&Trade> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|trade| trade.timestamp);
    sorted
}

pub fn compute_metrics(trades: &[Trade]) -> MetricsReport {
    let sorted = sort_by_close_time(trades);
    let total_trades = sorted.len();
    if total_trades == 0 {
        return MetricsReport::default();
    }

    let mut equity_curve = Vec::with_capacity(total_trades);
    let mut drawdown = Vec::with_capacity(total_trades);

    let mut cumulative = 0.0f64;
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0f64;
    let mut wins = 0usize;
    let mut gains = 0.0f64;
    let mut losers = 0usize;
    let mut losses = 0.0f64;

    for trade in sorted {
        cumulative += trade.profit;
        if trade.profit > 0.0 {
            wins += 1;
            gains += trade.profit;
        } else if trade.profit < 0.0 {
            losers += 1;
            losses += trade.profit;
        }

        peak = peak.max(cumulative);
        let current = peak - cumulative;
        max_drawdown = max_drawdown.max(current);

        equity_curve.push(EquityPoint {
            timestamp: trade.timestamp,
            cumulative_profit: cumulative,
        });
        drawdown.push(DrawdownPoint {
            timestamp: trade.timestamp,
            peak_to_date: peak,
            drawdown: current,
        });
    }

    let summary = MetricsSummary {
        total_pnl: cumulative,
        total_trades,
        win_rate: 100.0 * wins as f64 / total_trades as f64,
        average_gain: mean(gains, wins),
        average_loss: mean(losses, losers),
        max_drawdown,
    };

    MetricsReport {
        summary,
        equity_curve,
        drawdown,
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
