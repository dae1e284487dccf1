use crate::loading::load_trades;
use chrono::{DateTime, Utc};
use disciplined_domain::entities::metrics::{compute_metrics, sort_by_close_time, MetricsReport};
use disciplined_domain::events::domain_event::DomainEvent;
use disciplined_domain::repositories::trades::TradeSource;
use disciplined_domain::services::daily::daily_pnl;
use disciplined_domain::value_objects::daily_pnl::DailyPnl;
use disciplined_domain::value_objects::trade::Trade;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

const FINGERPRINT_CHARS: usize = 16;

/// Everything the dashboard and exporters render for one trade set.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub fingerprint: String,
    pub source: String,
    /// Sorted by close time; index-aligned with the report's series.
    pub trades: Vec<Trade>,
    pub report: MetricsReport,
    pub daily: Vec<DailyPnl>,
}

impl DashboardSnapshot {
    pub fn compute(source: &str, trades: &[Trade]) -> Result<Self, String> {
        let sorted: Vec<Trade> = sort_by_close_time(trades).into_iter().cloned().collect();
        let fingerprint = fingerprint_sorted(&sorted)?;
        Ok(Self::from_sorted(source, fingerprint, sorted))
    }

    fn from_sorted(source: &str, fingerprint: String, sorted: Vec<Trade>) -> Self {
        let report = compute_metrics(&sorted);
        let daily = daily_pnl(&sorted);
        Self {
            fingerprint,
            source: source.to_string(),
            trades: sorted,
            report,
            daily,
        }
    }

    /// First and last close time, if any trades.
    pub fn period(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.trades.first()?.timestamp, self.trades.last()?.timestamp))
    }
}

/// Short SHA-256 over the canonical JSON of the time-sorted trades.
pub fn fingerprint_trades(trades: &[Trade]) -> Result<String, String> {
    fingerprint_json(&sort_by_close_time(trades))
}

fn fingerprint_sorted(sorted: &[Trade]) -> Result<String, String> {
    fingerprint_json(sorted)
}

fn fingerprint_json<T: Serialize + ?Sized>(trades: &T) -> Result<String, String> {
    let canonical = serde_json::to_vec(trades)
        .map_err(|err| format!("failed to serialize trades for fingerprint: {err}"))?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let bytes = hasher.finalize();
    Ok(to_hex_short(&bytes[..], FINGERPRINT_CHARS))
}

fn to_hex_short(bytes: &[u8], chars: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(chars);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        if out.len() >= chars {
            break;
        }
        out.push(HEX[(b & 0x0f) as usize] as char);
        if out.len() >= chars {
            break;
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub snapshot: Arc<DashboardSnapshot>,
    pub events: Vec<DomainEvent>,
    pub recomputed: bool,
}

/// Single-slot memo of the last computed snapshot, keyed by fingerprint.
#[derive(Debug, Default)]
pub struct DashboardCache {
    current: Option<Arc<DashboardSnapshot>>,
    hits: u64,
    misses: u64,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        self.current.clone()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn on_trade_set_changed(
        &mut self,
        source: &str,
        trades: &[Trade],
    ) -> Result<CacheOutcome, String> {
        let _span = info_span!("trade_set_changed", source = %source, trades = trades.len())
            .entered();
        let sorted: Vec<Trade> = sort_by_close_time(trades).into_iter().cloned().collect();
        let fingerprint = fingerprint_sorted(&sorted)?;

        let mut events = vec![DomainEvent::TradeSetChanged {
            source: source.to_string(),
            fingerprint: fingerprint.clone(),
            trades: sorted.len(),
        }];

        if let Some(current) = self.current.clone() {
            if current.fingerprint == fingerprint {
                self.hits += 1;
                metrics::counter!("disciplined.dashboard.cache_hits").increment(1);
                debug!(fingerprint = %fingerprint, "dashboard cache hit");
                let snapshot = if current.source == source {
                    current
                } else {
                    let relabeled = Arc::new(DashboardSnapshot {
                        source: source.to_string(),
                        ..DashboardSnapshot::clone(&current)
                    });
                    self.current = Some(Arc::clone(&relabeled));
                    relabeled
                };
                return Ok(CacheOutcome {
                    snapshot,
                    events,
                    recomputed: false,
                });
            }
        }

        let start = Instant::now();
        let snapshot = Arc::new(DashboardSnapshot::from_sorted(source, fingerprint, sorted));
        let elapsed = start.elapsed();
        self.misses += 1;
        metrics::counter!("disciplined.dashboard.cache_misses").increment(1);
        metrics::histogram!("disciplined.dashboard.recompute_ms")
            .record(elapsed.as_secs_f64() * 1000.0);
        info!(
            fingerprint = %snapshot.fingerprint,
            trades = snapshot.report.summary.total_trades,
            total_pnl = snapshot.report.summary.total_pnl,
            elapsed_us = elapsed.as_micros() as u64,
            "dashboard metrics recomputed"
        );

        events.push(DomainEvent::MetricsRecomputed {
            fingerprint: snapshot.fingerprint.clone(),
            total_trades: snapshot.report.summary.total_trades,
            elapsed_us: elapsed.as_micros() as u64,
        });
        self.current = Some(Arc::clone(&snapshot));
        Ok(CacheOutcome {
            snapshot,
            events,
            recomputed: true,
        })
    }
}

/// Loads the source and publishes the result to the cache.
pub fn refresh_dashboard(
    cache: &mut DashboardCache,
    source: &dyn TradeSource,
) -> Result<CacheOutcome, String> {
    let trades = load_trades(source)?;
    cache.on_trade_set_changed(&source.describe(), &trades)
}
