use crate::services::validation::TradeValidationError;
use crate::value_objects::side::Side;
use crate::value_objects::trade::Trade;

/// Account-currency value of one full price unit per lot.
pub const PIP_DIVISOR: f64 = 100_000.0;
pub const PRICE_DECIMALS: i32 = 5;

/// Close price implied by `profit` under the fixed pip convention.
///
/// Illustrative only: the result is cosmetic and never feeds back into metrics.
pub fn derive_close_price(
    side: Side,
    volume: f64,
    open_price: f64,
    profit: f64,
) -> Result<f64, TradeValidationError> {
    if !volume.is_finite() {
        return Err(TradeValidationError::InvalidNumber {
            field: "volume",
            value: volume.to_string(),
        });
    }
    if volume <= 0.0 {
        return Err(TradeValidationError::NonPositive {
            field: "volume",
            value: volume,
        });
    }

    let delta = profit.abs() / (volume * PIP_DIVISOR);
    let moves_up = match side {
        Side::Buy => profit >= 0.0,
        Side::Sell => profit < 0.0,
    };
    let close = if moves_up {
        open_price + delta
    } else {
        open_price - delta
    };
    Ok(round_to(close, PRICE_DECIMALS))
}

/// Returns a copy of `trade` with its close price re-derived from profit.
pub fn with_derived_close_price(trade: &Trade) -> Result<Trade, TradeValidationError> {
    let close_price =
        derive_close_price(trade.side, trade.volume, trade.open_price, trade.profit)?;
    Ok(Trade {
        close_price,
        ..trade.clone()
    })
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::{derive_close_price, round_to, with_derived_close_price};
    use crate::services::validation::TradeValidationError;
    use crate::value_objects::side::Side;
    use crate::value_objects::trade::Trade;
    use chrono::{TimeZone, Utc};

    #[test]
    fn direction_follows_side_and_profit_sign() {
        // delta = 50 / (1 * 100_000) = 0.0005
        assert_eq!(derive_close_price(Side::Buy, 1.0, 1.1, 50.0), Ok(1.1005));
        assert_eq!(derive_close_price(Side::Buy, 1.0, 1.1, -50.0), Ok(1.0995));
        assert_eq!(derive_close_price(Side::Sell, 1.0, 1.1, 50.0), Ok(1.0995));
        assert_eq!(derive_close_price(Side::Sell, 1.0, 1.1, -50.0), Ok(1.1005));
    }

    #[test]
    fn zero_profit_keeps_open_price() {
        assert_eq!(derive_close_price(Side::Sell, 0.3, 1.23456, 0.0), Ok(1.23456));
    }

    #[test]
    fn rounds_to_five_decimals() {
        // delta = 1 / (3 * 100_000) = 0.0000033..
        assert_eq!(derive_close_price(Side::Buy, 3.0, 1.0, 1.0), Ok(1.0));
        assert_eq!(round_to(1.234_567_8, 5), 1.23457);
    }

    #[test]
    fn zero_volume_is_rejected() {
        assert_eq!(
            derive_close_price(Side::Buy, 0.0, 1.1, 10.0),
            Err(TradeValidationError::NonPositive {
                field: "volume",
                value: 0.0
            })
        );
    }

    #[test]
    fn derivation_returns_new_record_and_keeps_profit() {
        let original = Trade {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            symbol: "GBPUSD".to_string(),
            side: Side::Sell,
            volume: 2.0,
            open_price: 1.25,
            close_price: 9.99,
            profit: -200.0,
        };
        let derived = with_derived_close_price(&original).expect("derive");
        assert_eq!(derived.close_price, 1.251);
        assert_eq!(derived.profit, original.profit);
        assert_eq!(original.close_price, 9.99);
    }
}
