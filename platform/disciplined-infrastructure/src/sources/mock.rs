use chrono::{DateTime, Duration, Utc};
use disciplined_domain::repositories::trades::TradeSource;
use disciplined_domain::services::pricing::{
    round_to, with_derived_close_price, PIP_DIVISOR, PRICE_DECIMALS,
};
use disciplined_domain::value_objects::side::Side;
use disciplined_domain::value_objects::trade::Trade;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_BASE_PRICE: f64 = 1.1;
const PRICE_JITTER: f64 = 0.01;
const MIN_VOLUME: f64 = 0.01;
const MAX_VOLUME: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MockTradeParams {
    pub seed: u64,
    pub trades: usize,
    pub start: DateTime<Utc>,
    pub days: u32,
    pub symbols: Vec<String>,
    pub min_profit: f64,
    pub max_profit: f64,
}

impl MockTradeParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.days == 0 {
            return Err("mock.days must be > 0".to_string());
        }
        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err("mock.symbols must contain at least one symbol".to_string());
        }
        if !self.min_profit.is_finite() || !self.max_profit.is_finite() {
            return Err("mock.min_profit and mock.max_profit must be finite".to_string());
        }
        if self.min_profit > self.max_profit {
            return Err(format!(
                "mock.min_profit ({}) must be <= mock.max_profit ({})",
                self.min_profit, self.max_profit
            ));
        }
        Ok(())
    }
}

fn base_price(symbol: &str) -> f64 {
    match symbol {
        "EURUSD" => 1.085,
        "GBPUSD" => 1.265,
        "USDJPY" => 148.5,
        "XAUUSD" => 2030.0,
        _ => DEFAULT_BASE_PRICE,
    }
}

/// Smallest two-decimal volume whose profit moves price by at most half of `open_price`,
/// so the derived close price stays positive whatever the profit range.
fn volume_floor(profit: f64, open_price: f64) -> f64 {
    let exact = profit.abs() / (open_price * 0.5 * PIP_DIVISOR);
    (exact * 100.0).ceil() / 100.0
}

/// Deterministic synthetic trade set; the same params always yield the same trades.
pub fn generate_trades(params: &MockTradeParams) -> Result<Vec<Trade>, String> {
    params.validate()?;
    let symbols: Vec<&str> = params
        .symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let span_secs = i64::from(params.days) * 86_400;
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut trades = Vec::with_capacity(params.trades);
    for _ in 0..params.trades {
        let offset = rng.gen_range(0..span_secs);
        let symbol = symbols[rng.gen_range(0..symbols.len())];
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let drawn_volume = round_to(rng.gen_range(MIN_VOLUME..=MAX_VOLUME), 2).max(MIN_VOLUME);
        let jitter = rng.gen_range(-PRICE_JITTER..=PRICE_JITTER);
        let open_price = round_to(base_price(symbol) * (1.0 + jitter), PRICE_DECIMALS);
        let profit = round_to(rng.gen_range(params.min_profit..=params.max_profit), 2);
        let volume = drawn_volume.max(volume_floor(profit, open_price));

        let trade = Trade {
            timestamp: params.start + Duration::seconds(offset),
            symbol: symbol.to_string(),
            side,
            volume,
            open_price,
            close_price: open_price,
            profit,
        };
        trades.push(with_derived_close_price(&trade).map_err(|err| err.to_string())?);
    }
    trades.sort_by_key(|trade| trade.timestamp);
    Ok(trades)
}

#[derive(Debug, Clone)]
pub struct MockTradeSource {
    params: MockTradeParams,
}

impl MockTradeSource {
    pub fn new(params: MockTradeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MockTradeParams {
        &self.params
    }
}

impl TradeSource for MockTradeSource {
    fn describe(&self) -> String {
        format!(
            "mock(seed={}, trades={})",
            self.params.seed, self.params.trades
        )
    }

    fn load_trades(&self) -> Result<Vec<Trade>, String> {
        generate_trades(&self.params)
    }
}
