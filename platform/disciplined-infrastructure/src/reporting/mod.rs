use chrono::SecondsFormat;
use disciplined_domain::entities::metrics::{MetricsReport, MetricsSummary};
use disciplined_domain::services::audit::AuditEvent;
use disciplined_domain::services::color::is_hex_color;
use disciplined_domain::services::validation::{validate_raw_trade, RawTrade};
use disciplined_domain::value_objects::daily_pnl::DailyPnl;
use disciplined_domain::value_objects::trade::Trade;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const TRADE_COLUMNS: [&str; 7] = [
    "timestamp",
    "symbol",
    "side",
    "volume",
    "open_price",
    "close_price",
    "profit",
];

pub const DERIVED_COLUMNS: [&str; 3] = ["equity_curve", "peak", "drawdown"];

pub fn write_audit_jsonl(path: &Path, events: &[AuditEvent]) -> Result<(), String> {
    let mut file =
        fs::File::create(path).map_err(|err| format!("failed to create logs: {}", err))?;
    for event in events {
        let line = serde_json::to_string(event)
            .map_err(|err| format!("failed to serialize audit event: {}", err))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|err| format!("failed to write audit event: {}", err))?;
    }
    Ok(())
}

fn trade_cells(trade: &Trade) -> [String; 7] {
    [
        trade
            .timestamp
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        trade.symbol.clone(),
        trade.side.as_str().to_string(),
        trade.volume.to_string(),
        trade.open_price.to_string(),
        trade.close_price.to_string(),
        trade.profit.to_string(),
    ]
}

/// Trade table plus the derived `equity_curve`, `peak` and `drawdown` columns.
///
/// The first seven columns are the input format read by [`read_trades_csv`].
pub fn write_trades_csv(path: &Path, trades: &[Trade], report: &MetricsReport) -> Result<(), String> {
    if trades.len() != report.equity_curve.len() || trades.len() != report.drawdown.len() {
        return Err(format!(
            "trades/report length mismatch (trades={}, equity={}, drawdown={})",
            trades.len(),
            report.equity_curve.len(),
            report.drawdown.len()
        ));
    }

    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create trades csv {}: {}", path.display(), err))?;
    wtr.write_record(TRADE_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()))
        .map_err(|err| format!("failed to write trades csv header: {}", err))?;

    for ((trade, equity), drawdown) in trades
        .iter()
        .zip(&report.equity_curve)
        .zip(&report.drawdown)
    {
        if trade.timestamp != equity.timestamp {
            return Err(format!(
                "trades are not in report order (trade at {}, equity point at {})",
                trade.timestamp, equity.timestamp
            ));
        }
        let [ts, symbol, side, volume, open, close, profit] = trade_cells(trade);
        wtr.write_record([
            ts,
            symbol,
            side,
            volume,
            open,
            close,
            profit,
            equity.cumulative_profit.to_string(),
            drawdown.peak_to_date.to_string(),
            drawdown.drawdown.to_string(),
        ])
        .map_err(|err| format!("failed to write trades row: {}", err))?;
    }

    wtr.flush()
        .map_err(|err| format!("failed to flush trades csv: {}", err))
}

/// Input-format trade table (no derived columns).
pub fn write_raw_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create trades csv {}: {}", path.display(), err))?;
    wtr.write_record(TRADE_COLUMNS)
        .map_err(|err| format!("failed to write trades csv header: {}", err))?;
    for trade in trades {
        wtr.write_record(trade_cells(trade))
            .map_err(|err| format!("failed to write trades row: {}", err))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush trades csv: {}", err))
}

pub fn write_daily_csv(path: &Path, daily: &[DailyPnl]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create daily csv {}: {}", path.display(), err))?;
    wtr.write_record(["date", "daily_pnl"])
        .map_err(|err| format!("failed to write daily csv header: {}", err))?;
    for row in daily {
        wtr.write_record([row.date.format("%Y-%m-%d").to_string(), row.pnl.to_string()])
            .map_err(|err| format!("failed to write daily row: {}", err))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush daily csv: {}", err))
}

#[derive(Debug, Clone, serde::Deserialize)]
struct TradeRecord {
    timestamp: Option<String>,
    symbol: Option<String>,
    side: Option<String>,
    volume: Option<String>,
    open_price: Option<String>,
    close_price: Option<String>,
    profit: Option<String>,
}

impl From<TradeRecord> for RawTrade {
    fn from(record: TradeRecord) -> Self {
        RawTrade {
            timestamp: record.timestamp,
            symbol: record.symbol,
            side: record.side,
            volume: record.volume,
            open_price: record.open_price,
            close_price: record.close_price,
            profit: record.profit,
        }
    }
}

/// Reads and validates a trade table. Extra columns (e.g. a previous export's
/// derived columns) are ignored; the first invalid row aborts the load.
pub fn read_trades_csv(path: &Path) -> Result<Vec<Trade>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| format!("failed to open trades csv {}: {}", path.display(), err))?;
    let mut trades = Vec::new();
    for (idx, result) in rdr.deserialize::<TradeRecord>().enumerate() {
        let row = idx + 1;
        let record =
            result.map_err(|err| format!("failed to parse trade record at row {row}: {err}"))?;
        let trade = validate_raw_trade(&RawTrade::from(record))
            .map_err(|err| format!("invalid trade at row {row}: {err}"))?;
        trades.push(trade);
    }
    Ok(trades)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub profit: String,
    pub loss: String,
    pub equity: String,
    pub drawdown: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            profit: "#2ecc71".to_string(),
            loss: "#ff4d4d".to_string(),
            equity: "#4da3ff".to_string(),
            drawdown: "#ffb347".to_string(),
        }
    }
}

/// Presentation metadata carried in the `meta` JSON handed to the writers.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMeta {
    pub title: String,
    pub currency: String,
    pub source: String,
    pub fingerprint: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub theme: ThemeColors,
}

impl Default for DashboardMeta {
    fn default() -> Self {
        Self {
            title: "Trading Dashboard".to_string(),
            currency: "USD".to_string(),
            source: "unknown".to_string(),
            fingerprint: "unknown".to_string(),
            start: None,
            end: None,
            theme: ThemeColors::default(),
        }
    }
}

impl DashboardMeta {
    pub fn from_json(meta: Option<&serde_json::Value>) -> Self {
        let defaults = Self::default();
        let Some(meta) = meta else {
            return defaults;
        };
        let text = |key: &str| meta.get(key).and_then(|v| v.as_str()).map(str::to_string);
        let theme = meta.get("theme");
        let color = |key: &str, fallback: String| {
            theme
                .and_then(|t| t.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or(fallback)
        };
        Self {
            title: text("title").unwrap_or(defaults.title),
            currency: text("currency").unwrap_or(defaults.currency),
            source: text("source").unwrap_or(defaults.source),
            fingerprint: text("fingerprint").unwrap_or(defaults.fingerprint),
            start: text("start"),
            end: text("end"),
            theme: ThemeColors {
                profit: color("profit_color", defaults.theme.profit),
                loss: color("loss_color", defaults.theme.loss),
                equity: color("equity_color", defaults.theme.equity),
                drawdown: color("drawdown_color", defaults.theme.drawdown),
            },
        }
    }
}

pub fn write_summary_json(
    path: &Path,
    summary: &MetricsSummary,
    meta: Option<&serde_json::Value>,
) -> Result<(), String> {
    let json = serde_json::json!({
        "meta": meta,
        "total_pnl": summary.total_pnl,
        "total_trades": summary.total_trades,
        "win_rate": summary.win_rate,
        "average_gain": summary.average_gain,
        "average_loss": summary.average_loss,
        "max_drawdown": summary.max_drawdown,
    });
    let json = serde_json::to_string_pretty(&json)
        .map_err(|err| format!("failed to serialize summary: {}", err))?;
    let mut file =
        fs::File::create(path).map_err(|err| format!("failed to create summary: {}", err))?;
    file.write_all(json.as_bytes())
        .map_err(|err| format!("failed to write summary: {}", err))
}

pub fn write_dashboard_html(
    path: &Path,
    trades: &[Trade],
    report: &MetricsReport,
    daily: &[DailyPnl],
    meta: Option<&serde_json::Value>,
) -> Result<(), String> {
    let meta = DashboardMeta::from_json(meta);
    let summary = &report.summary;
    let equity_json = script_json(&report.equity_curve, "equity")?;
    let drawdown_json = script_json(&report.drawdown, "drawdown")?;
    let daily_json = script_json(daily, "daily pnl")?;
    let trades_json = script_json(trades, "trades")?;

    let title = html_escape(&meta.title);
    let currency = html_escape(&meta.currency);
    let source = html_escape(&meta.source);
    let fingerprint = html_escape(&meta.fingerprint);
    let start = html_escape(meta.start.as_deref().unwrap_or("n/a"));
    let end = html_escape(meta.end.as_deref().unwrap_or("n/a"));
    let profit_color = css_color(&meta.theme.profit);
    let loss_color = css_color(&meta.theme.loss);
    let equity_color = css_color(&meta.theme.equity);
    let drawdown_color = css_color(&meta.theme.drawdown);
    let pnl_color = if summary.total_pnl >= 0.0 {
        profit_color.as_str()
    } else {
        loss_color.as_str()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>{title}</title>
  <style>
    body {{ font-family: ui-sans-serif, system-ui; padding: 24px; background: #141414; color: #eee; }}
    code {{ background: #222; padding: 2px 6px; border-radius: 4px; }}
    .kpis {{ display: grid; grid-template-columns: repeat(6, 1fr); gap: 12px; margin-bottom: 16px; }}
    .kpi {{ border: 1px solid #333; border-radius: 10px; padding: 12px; background: #1c1c1c; }}
    .kpi .label {{ font-size: 12px; color: #999; }}
    .kpi .value {{ font-size: 20px; font-weight: 700; }}
    .grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; align-items: start; }}
    .card {{ border: 1px solid #333; border-radius: 10px; padding: 16px; background: #1c1c1c; }}
    canvas {{ width: 100%; height: 260px; border: 1px solid #2a2a2a; border-radius: 8px; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #2a2a2a; padding: 6px; font-size: 12px; }}
    th {{ background: #222; text-align: left; }}
    .muted {{ color: #888; }}
    .scroll {{ max-height: 360px; overflow-y: auto; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p class="muted">
    source: <code>{source}</code> · fingerprint: <code>{fingerprint}</code>
    · start: <code>{start}</code> · end: <code>{end}</code>
  </p>

  <div class="kpis">
    <div class="kpi"><div class="label">Total PNL ({currency})</div><div class="value" style="color: {pnl_color}">{total_pnl:.2}</div></div>
    <div class="kpi"><div class="label">Total trades</div><div class="value">{total_trades}</div></div>
    <div class="kpi"><div class="label">Win rate</div><div class="value">{win_rate:.2}%</div></div>
    <div class="kpi"><div class="label">Average gain</div><div class="value" style="color: {profit_color}">{average_gain:.2}</div></div>
    <div class="kpi"><div class="label">Average loss</div><div class="value" style="color: {loss_color}">{average_loss:.2}</div></div>
    <div class="kpi"><div class="label">Max drawdown</div><div class="value" style="color: {drawdown_color}">{max_drawdown:.2}</div></div>
  </div>

  <div class="grid">
    <div class="card">
      <h2>Equity curve</h2>
      <canvas id="equity"></canvas>
    </div>
    <div class="card">
      <h2>Drawdown</h2>
      <canvas id="drawdown"></canvas>
    </div>
    <div class="card scroll">
      <h2>Daily PNL</h2>
      <table id="daily_table">
        <thead><tr><th>date</th><th>daily pnl</th></tr></thead>
        <tbody></tbody>
      </table>
    </div>
    <div class="card scroll">
      <h2>Trades</h2>
      <table id="trades_table">
        <thead>
          <tr>
            <th>timestamp</th>
            <th>symbol</th>
            <th>side</th>
            <th>volume</th>
            <th>open</th>
            <th>close</th>
            <th>profit</th>
          </tr>
        </thead>
        <tbody></tbody>
      </table>
    </div>
  </div>

  <script>
    const equity = {equity_json};
    const drawdown = {drawdown_json};
    const daily = {daily_json};
    const trades = {trades_json};
    const profitColor = '{profit_color}';
    const lossColor = '{loss_color}';

    function drawLine(canvas, values, color, emptyLabel) {{
      const ctx = canvas.getContext('2d');
      const w = canvas.width = canvas.clientWidth * window.devicePixelRatio;
      const h = canvas.height = canvas.clientHeight * window.devicePixelRatio;
      ctx.clearRect(0, 0, w, h);

      if (!values || values.length < 2) {{
        ctx.fillStyle = '#888';
        ctx.fillText(emptyLabel, 10, 20);
        return;
      }}

      const minV = Math.min(...values);
      const maxV = Math.max(...values);
      const pad = 20 * window.devicePixelRatio;
      const x0 = pad, y0 = pad, x1 = w - pad, y1 = h - pad;

      function x(i) {{
        return x0 + (i / (values.length - 1)) * (x1 - x0);
      }}
      function y(v) {{
        if (maxV === minV) return (y0 + y1) / 2;
        const t = (v - minV) / (maxV - minV);
        return y1 - t * (y1 - y0);
      }}

      ctx.strokeStyle = color;
      ctx.lineWidth = 2 * window.devicePixelRatio;
      ctx.beginPath();
      ctx.moveTo(x(0), y(values[0]));
      for (let i = 1; i < values.length; i++) {{
        ctx.lineTo(x(i), y(values[i]));
      }}
      ctx.stroke();
    }}

    function cell(text, color) {{
      const td = document.createElement('td');
      td.textContent = text;
      if (color) td.style.color = color;
      return td;
    }}

    function renderDaily(tableId, rows) {{
      const tbody = document.querySelector(`#${{tableId}} tbody`);
      tbody.innerHTML = '';
      for (const r of rows) {{
        const tr = document.createElement('tr');
        tr.appendChild(cell(r.date));
        tr.appendChild(cell(r.pnl.toFixed(2), r.pnl > 0 ? profitColor : (r.pnl < 0 ? lossColor : null)));
        tbody.appendChild(tr);
      }}
    }}

    function renderTrades(tableId, rows) {{
      const tbody = document.querySelector(`#${{tableId}} tbody`);
      tbody.innerHTML = '';
      for (const t of rows) {{
        const tr = document.createElement('tr');
        tr.appendChild(cell(t.timestamp));
        tr.appendChild(cell(t.symbol));
        tr.appendChild(cell(t.side));
        tr.appendChild(cell(t.volume));
        tr.appendChild(cell(t.open_price));
        tr.appendChild(cell(t.close_price));
        tr.appendChild(cell(t.profit.toFixed(2), t.profit >= 0 ? profitColor : lossColor));
        tbody.appendChild(tr);
      }}
    }}

    function drawAll() {{
      drawLine(document.getElementById('equity'), equity.map(p => p.cumulative_profit), '{equity_color}', 'no equity data');
      drawLine(document.getElementById('drawdown'), drawdown.map(p => -p.drawdown), '{drawdown_color}', 'no drawdown data');
    }}

    drawAll();
    renderDaily('daily_table', daily);
    renderTrades('trades_table', trades);
    window.addEventListener('resize', drawAll);
  </script>
</body>
</html>"#,
        total_pnl = summary.total_pnl,
        total_trades = summary.total_trades,
        win_rate = summary.win_rate,
        average_gain = summary.average_gain,
        average_loss = summary.average_loss,
        max_drawdown = summary.max_drawdown,
    );

    let mut file =
        fs::File::create(path).map_err(|err| format!("failed to create html: {}", err))?;
    file.write_all(html.as_bytes())
        .map_err(|err| format!("failed to write html: {}", err))
}

fn script_json<T: Serialize + ?Sized>(value: &T, label: &str) -> Result<String, String> {
    serde_json::to_string(value)
        .map(|json| json.replace("</", "<\\/"))
        .map_err(|err| format!("failed to serialize {label}: {err}"))
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Falls back to grey for anything that is not `#rrggbb`.
fn css_color(raw: &str) -> String {
    let value = raw.trim();
    if is_hex_color(value) {
        value.to_string()
    } else {
        "#888888".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        css_color, html_escape, is_hex_color, read_trades_csv, write_audit_jsonl,
        write_daily_csv, write_dashboard_html, write_raw_trades_csv, write_summary_json,
        write_trades_csv, DashboardMeta,
    };
    use chrono::{TimeZone, Utc};
    use disciplined_domain::entities::metrics::compute_metrics;
    use disciplined_domain::services::audit::AuditEvent;
    use disciplined_domain::services::daily::daily_pnl;
    use disciplined_domain::value_objects::side::Side;
    use disciplined_domain::value_objects::trade::Trade;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "disciplined_{prefix}_{}_{}",
            std::process::id(),
            now
        ))
    }

    fn trade(day: u32, side: Side, profit: f64) -> Trade {
        Trade {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 14, 0, 0).unwrap(),
            symbol: "EURUSD".to_string(),
            side,
            volume: 0.5,
            open_price: 1.1,
            close_price: 1.102,
            profit,
        }
    }

    fn sample() -> Vec<Trade> {
        vec![
            trade(1, Side::Buy, 100.0),
            trade(2, Side::Sell, -50.0),
            trade(4, Side::Buy, 200.0),
        ]
    }

    #[test]
    fn trades_csv_has_derived_columns_in_field_order() {
        let dir = unique_tmp_dir("trades_export");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        let trades = sample();
        let report = compute_metrics(&trades);

        write_trades_csv(path.as_path(), &trades, &report).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,symbol,side,volume,open_price,close_price,profit,equity_curve,peak,drawdown"
        );
        assert_eq!(
            lines[1],
            "2024-01-01T14:00:00Z,EURUSD,BUY,0.5,1.1,1.102,100,100,100,0"
        );
        assert_eq!(
            lines[2],
            "2024-01-02T14:00:00Z,EURUSD,SELL,0.5,1.1,1.102,-50,50,100,50"
        );
        assert_eq!(lines.len(), 4);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn export_reloads_as_trade_source() {
        let dir = unique_tmp_dir("trades_reload");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        let mut trades = sample();
        trades[0].symbol = "odd,sym\"bol".to_string();
        let report = compute_metrics(&trades);

        write_trades_csv(path.as_path(), &trades, &report).expect("write");
        let parsed = read_trades_csv(path.as_path()).expect("read back");
        assert_eq!(parsed, trades);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn raw_trades_csv_matches_input_format() {
        let dir = unique_tmp_dir("trades_raw");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        let trades = sample();

        write_raw_trades_csv(path.as_path(), &trades).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(
            contents.lines().next(),
            Some("timestamp,symbol,side,volume,open_price,close_price,profit")
        );
        assert_eq!(read_trades_csv(path.as_path()).expect("reload"), trades);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn trades_csv_rejects_misaligned_report() {
        let dir = unique_tmp_dir("trades_misaligned");
        fs::create_dir_all(&dir).expect("dir");
        let trades = sample();
        let report = compute_metrics(&trades[..2]);
        let err = write_trades_csv(dir.join("t.csv").as_path(), &trades, &report)
            .expect_err("length mismatch");
        assert!(err.contains("length mismatch"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn read_trades_csv_names_row_and_field() {
        let dir = unique_tmp_dir("trades_invalid");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        fs::write(
            &path,
            "timestamp,symbol,side,volume,open_price,close_price,profit\n\
             2024-01-01T00:00:00Z,EURUSD,BUY,1,1.1,,10\n\
             2024-01-02T00:00:00Z,EURUSD,SELL,0,1.1,,10\n",
        )
        .expect("write");

        let err = read_trades_csv(path.as_path()).expect_err("zero volume");
        assert!(err.contains("row 2"), "{err}");
        assert!(err.contains("`volume`"), "{err}");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn read_trades_csv_rejects_non_positive_derived_close() {
        let dir = unique_tmp_dir("trades_negative_close");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        fs::write(
            &path,
            "timestamp,symbol,side,volume,open_price,close_price,profit\n\
             2024-01-01T00:00:00Z,EURUSD,BUY,1,1.1,,10\n\
             2024-01-02T00:00:00Z,EURUSD,BUY,0.01,1.1,,-5000\n",
        )
        .expect("write");

        let err = read_trades_csv(path.as_path()).expect_err("negative close");
        assert!(err.contains("row 2"), "{err}");
        assert!(err.contains("`close_price`"), "{err}");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn read_trades_csv_derives_blank_close_price() {
        let dir = unique_tmp_dir("trades_derive");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("trades.csv");
        fs::write(
            &path,
            "timestamp,symbol,side,volume,open_price,close_price,profit\n\
             1704067200,GBPUSD,sell,2,1.25,,-200\n",
        )
        .expect("write");

        let parsed = read_trades_csv(path.as_path()).expect("read");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].side, Side::Sell);
        assert_eq!(parsed[0].close_price, 1.251);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn writes_daily_summary_dashboard_and_logs() {
        let dir = unique_tmp_dir("report_files");
        fs::create_dir_all(&dir).expect("dir");
        let trades = sample();
        let report = compute_metrics(&trades);
        let daily = daily_pnl(&trades);
        let meta = serde_json::json!({
            "title": "<DISCIPLINEDTRADE>",
            "currency": "EUR",
            "theme": { "profit_color": "#00ff00" },
        });

        write_daily_csv(dir.join("daily_pnl.csv").as_path(), &daily).expect("daily");
        write_summary_json(dir.join("summary.json").as_path(), &report.summary, Some(&meta))
            .expect("summary");
        write_dashboard_html(
            dir.join("dashboard.html").as_path(),
            &trades,
            &report,
            &daily,
            Some(&meta),
        )
        .expect("html");
        write_audit_jsonl(
            dir.join("logs.jsonl").as_path(),
            &[AuditEvent {
                fingerprint: "abc".to_string(),
                timestamp: 0,
                stage: "summary".to_string(),
                symbol: None,
                action: "complete".to_string(),
                error: None,
                details: serde_json::json!({}),
            }],
        )
        .expect("logs");

        let daily_csv = fs::read_to_string(dir.join("daily_pnl.csv")).expect("daily csv");
        assert_eq!(
            daily_csv,
            "date,daily_pnl\n2024-01-01,100\n2024-01-02,-50\n2024-01-03,0\n2024-01-04,200\n"
        );

        let summary: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.join("summary.json")).expect("summary json"),
        )
        .expect("valid json");
        assert_eq!(summary["total_pnl"], serde_json::json!(250.0));
        assert_eq!(summary["max_drawdown"], serde_json::json!(50.0));
        assert_eq!(summary["meta"]["currency"], serde_json::json!("EUR"));

        let html = fs::read_to_string(dir.join("dashboard.html")).expect("html");
        assert!(html.contains("&lt;DISCIPLINEDTRADE&gt;"));
        assert!(html.contains("#00ff00"));
        assert!(html.contains("#ff4d4d"));

        let logs = fs::read_to_string(dir.join("logs.jsonl")).expect("logs");
        assert_eq!(logs.lines().count(), 1);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn meta_defaults_fill_missing_keys() {
        let meta = DashboardMeta::from_json(Some(&serde_json::json!({
            "source": "csv(data.csv)",
            "start": "2024-01-01",
        })));
        assert_eq!(meta.source, "csv(data.csv)");
        assert_eq!(meta.start.as_deref(), Some("2024-01-01"));
        assert_eq!(meta.end, None);
        assert_eq!(meta.title, DashboardMeta::default().title);
        assert_eq!(DashboardMeta::from_json(None), DashboardMeta::default());
    }

    #[test]
    fn escaping_helpers() {
        assert_eq!(html_escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(css_color(" #A1b2C3 "), "#A1b2C3");
        assert_eq!(css_color("red;}"), "#888888");
    }

    #[test]
    fn css_color_accepts_exactly_the_theme_colours() {
        for raw in ["#2ecc71", "#FFB347", "#00ffzz", "#abc", "2ecc71", "#ééé"] {
            let accepted = css_color(raw) == raw;
            assert_eq!(accepted, is_hex_color(raw), "{raw}");
        }
    }
}
