use crate::config::Config;
use crate::dashboard::DashboardSnapshot;
use crate::meta::engine_name;
use chrono::SecondsFormat;
use disciplined_domain::events::domain_event::DomainEvent;
use disciplined_domain::repositories::artifacts::ArtifactWriter;
use disciplined_domain::services::audit::AuditEvent;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

pub const TRADES_FILE: &str = "trades.csv";
pub const DAILY_FILE: &str = "daily_pnl.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const DASHBOARD_FILE: &str = "dashboard.html";
pub const LOGS_FILE: &str = "logs.jsonl";

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub out_dir: PathBuf,
    pub fingerprint: String,
    pub files: Vec<PathBuf>,
    pub wrote_html: bool,
}

/// `paths.out_dir/<fingerprint>`; unchanged trade sets export to the same place.
pub fn default_export_dir(config: &Config, snapshot: &DashboardSnapshot) -> PathBuf {
    Path::new(&config.paths.out_dir).join(&snapshot.fingerprint)
}

pub fn dashboard_meta_json(config: &Config, snapshot: &DashboardSnapshot) -> serde_json::Value {
    let (start, end) = match snapshot.period() {
        Some((start, end)) => (
            Some(start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Some(end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
        None => (None, None),
    };
    serde_json::json!({
        "title": config.dashboard.title,
        "currency": config.dashboard.currency,
        "source": snapshot.source,
        "fingerprint": snapshot.fingerprint,
        "start": start,
        "end": end,
        "engine": engine_name(),
        "theme": config.theme.to_json(),
    })
}

/// Summary payload printed by headless runs.
pub fn summary_json(config: &Config, snapshot: &DashboardSnapshot) -> serde_json::Value {
    let summary = &snapshot.report.summary;
    serde_json::json!({
        "meta": dashboard_meta_json(config, snapshot),
        "summary": {
            "total_pnl": summary.total_pnl,
            "total_trades": summary.total_trades,
            "win_rate": summary.win_rate,
            "average_gain": summary.average_gain,
            "average_loss": summary.average_loss,
            "max_drawdown": summary.max_drawdown,
        },
        "days": snapshot.daily.len(),
    })
}

/// Writes every artifact for `snapshot` into `out_dir`. Failures are returned;
/// the snapshot itself is never touched.
pub fn export_snapshot(
    config: &Config,
    snapshot: &DashboardSnapshot,
    events: &[DomainEvent],
    out_dir: &Path,
    writer: &dyn ArtifactWriter,
) -> Result<ExportResult, String> {
    let _span = info_span!(
        "export_snapshot",
        fingerprint = %snapshot.fingerprint,
        out_dir = %out_dir.display()
    )
    .entered();
    let start = Instant::now();
    let meta = dashboard_meta_json(config, snapshot);

    writer.ensure_dir(out_dir)?;
    let mut files = Vec::with_capacity(5);

    let trades_path = out_dir.join(TRADES_FILE);
    writer.write_trades_csv(&trades_path, &snapshot.trades, &snapshot.report)?;
    files.push(trades_path);

    let daily_path = out_dir.join(DAILY_FILE);
    writer.write_daily_csv(&daily_path, &snapshot.daily)?;
    files.push(daily_path);

    let summary_path = out_dir.join(SUMMARY_FILE);
    writer.write_summary_json(&summary_path, &snapshot.report.summary, Some(&meta))?;
    files.push(summary_path);

    let wrote_html = config.report.html;
    if wrote_html {
        let html_path = out_dir.join(DASHBOARD_FILE);
        writer.write_dashboard_html(
            &html_path,
            &snapshot.trades,
            &snapshot.report,
            &snapshot.daily,
            Some(&meta),
        )?;
        files.push(html_path);
    }

    let audit = build_audit_events(snapshot, events);
    let logs_path = out_dir.join(LOGS_FILE);
    writer.write_audit_jsonl(&logs_path, &audit)?;
    files.push(logs_path);

    metrics::histogram!("disciplined.export.write_ms")
        .record(start.elapsed().as_secs_f64() * 1000.0);
    metrics::counter!("disciplined.export.files").increment(files.len() as u64);
    info!(files = files.len(), wrote_html, "export complete");

    Ok(ExportResult {
        out_dir: out_dir.to_path_buf(),
        fingerprint: snapshot.fingerprint.clone(),
        files,
        wrote_html,
    })
}

pub fn export_result_json(result: &ExportResult) -> serde_json::Value {
    serde_json::json!({
        "out_dir": result.out_dir.display().to_string(),
        "fingerprint": result.fingerprint,
        "wrote_html": result.wrote_html,
        "files": result
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    })
}

/// One event per trade, one per domain event, then the summary.
fn build_audit_events(snapshot: &DashboardSnapshot, events: &[DomainEvent]) -> Vec<AuditEvent> {
    let fingerprint = &snapshot.fingerprint;
    let end_ts = snapshot
        .trades
        .last()
        .map(|t| t.timestamp.timestamp())
        .unwrap_or(0);
    let mut out = Vec::with_capacity(snapshot.trades.len() + events.len() + 1);

    for ((trade, equity), drawdown) in snapshot
        .trades
        .iter()
        .zip(&snapshot.report.equity_curve)
        .zip(&snapshot.report.drawdown)
    {
        out.push(AuditEvent {
            fingerprint: fingerprint.clone(),
            timestamp: trade.timestamp.timestamp(),
            stage: "trade".to_string(),
            symbol: Some(trade.symbol.clone()),
            action: trade.side.as_str().to_string(),
            error: None,
            details: serde_json::json!({
                "volume": trade.volume,
                "open_price": trade.open_price,
                "close_price": trade.close_price,
                "profit": trade.profit,
                "equity": equity.cumulative_profit,
                "drawdown": drawdown.drawdown,
            }),
        });
    }

    for event in events {
        out.push(AuditEvent {
            fingerprint: fingerprint.clone(),
            timestamp: end_ts,
            stage: "dashboard".to_string(),
            symbol: None,
            action: event.name().to_string(),
            error: None,
            details: serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
        });
    }

    let summary = &snapshot.report.summary;
    out.push(AuditEvent {
        fingerprint: fingerprint.clone(),
        timestamp: end_ts,
        stage: "summary".to_string(),
        symbol: None,
        action: "complete".to_string(),
        error: None,
        details: serde_json::json!({
            "source": snapshot.source,
            "total_pnl": summary.total_pnl,
            "total_trades": summary.total_trades,
            "win_rate": summary.win_rate,
            "max_drawdown": summary.max_drawdown,
            "days": snapshot.daily.len(),
        }),
    });
    out
}
