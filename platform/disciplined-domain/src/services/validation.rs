use crate::services::pricing::with_derived_close_price;
use crate::value_objects::side::Side;
use crate::value_objects::trade::Trade;
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` is not a finite number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field `{field}` must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("field `side` must be BUY or SELL (got '{value}')")]
    InvalidSide { value: String },
    #[error("field `timestamp` is not RFC 3339, 'YYYY-MM-DD HH:MM:SS' or epoch seconds: '{value}'")]
    InvalidTimestamp { value: String },
}

/// Untyped trade record as it arrives from a file or form, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrade {
    pub timestamp: Option<String>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub volume: Option<String>,
    pub open_price: Option<String>,
    pub close_price: Option<String>,
    pub profit: Option<String>,
}

/// Validates a raw record. A blank `close_price` is derived from profit.
pub fn validate_raw_trade(raw: &RawTrade) -> Result<Trade, TradeValidationError> {
    let timestamp = parse_timestamp(required("timestamp", raw.timestamp.as_deref())?)?;
    let symbol = required("symbol", raw.symbol.as_deref())?.to_string();
    let side_raw = required("side", raw.side.as_deref())?;
    let side = Side::parse(side_raw).ok_or_else(|| TradeValidationError::InvalidSide {
        value: side_raw.to_string(),
    })?;
    let volume = positive("volume", parse_number("volume", raw.volume.as_deref())?)?;
    let open_price = positive(
        "open_price",
        parse_number("open_price", raw.open_price.as_deref())?,
    )?;
    let profit = parse_number("profit", raw.profit.as_deref())?;

    let close_price = match non_blank(raw.close_price.as_deref()) {
        Some(value) => Some(positive(
            "close_price",
            parse_number("close_price", Some(value))?,
        )?),
        None => None,
    };

    let trade = Trade {
        timestamp,
        symbol,
        side,
        volume,
        open_price,
        close_price: close_price.unwrap_or(open_price),
        profit,
    };

    match close_price {
        Some(_) => Ok(trade),
        None => {
            let derived = with_derived_close_price(&trade)?;
            positive("close_price", derived.close_price)?;
            Ok(derived)
        }
    }
}

/// Re-checks an already typed trade, for sources that build `Trade` directly.
pub fn validate_trade(trade: &Trade) -> Result<(), TradeValidationError> {
    if trade.symbol.trim().is_empty() {
        return Err(TradeValidationError::MissingField { field: "symbol" });
    }
    positive("volume", finite("volume", trade.volume)?)?;
    positive("open_price", finite("open_price", trade.open_price)?)?;
    positive("close_price", finite("close_price", trade.close_price)?)?;
    finite("profit", trade.profit)?;
    Ok(())
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TradeValidationError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    trimmed
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| TradeValidationError::InvalidTimestamp {
            value: value.to_string(),
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, TradeValidationError> {
    non_blank(value).ok_or(TradeValidationError::MissingField { field })
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<f64, TradeValidationError> {
    let raw = required(field, value)?;
    let parsed: f64 = raw.parse().map_err(|_| TradeValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    finite(field, parsed)
}

fn finite(field: &'static str, value: f64) -> Result<f64, TradeValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TradeValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, TradeValidationError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(TradeValidationError::NonPositive { field, value })
    }
}
