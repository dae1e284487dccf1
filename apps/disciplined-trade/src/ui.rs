use crate::app::{App, ViewId};
use disciplined_application::config::ThemeConfig;
use disciplined_application::dashboard::DashboardSnapshot;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub profit: Color,
    pub loss: Color,
    pub equity: Color,
    pub drawdown: Color,
}

impl Palette {
    pub fn from_theme(theme: &ThemeConfig) -> Self {
        let parse = |raw: &str, fallback: Color| Color::from_str(raw).unwrap_or(fallback);
        Self {
            profit: parse(&theme.profit_color, Color::Green),
            loss: parse(&theme.loss_color, Color::Red),
            equity: parse(&theme.equity_color, Color::Cyan),
            drawdown: parse(&theme.drawdown_color, Color::Yellow),
        }
    }

    fn pnl(&self, value: f64) -> Style {
        if value > 0.0 {
            Style::default().fg(self.profit)
        } else if value < 0.0 {
            Style::default().fg(self.loss)
        } else {
            Style::default()
        }
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(8),
            ]
            .as_ref(),
        )
        .split(size);

    let palette = Palette::from_theme(&app.config.theme);
    draw_top_banner(frame, outer[0], app);
    draw_tabs(frame, outer[1], app);
    match (app.snapshot.clone(), app.active_view) {
        (None, _) => draw_empty(frame, outer[2], app),
        (Some(snapshot), ViewId::Dashboard) => {
            draw_dashboard(frame, outer[2], app, &snapshot, &palette)
        }
        (Some(snapshot), ViewId::Trades) => {
            draw_trades(frame, outer[2], app, &snapshot, &palette)
        }
        (Some(snapshot), ViewId::Daily) => draw_daily(frame, outer[2], app, &snapshot, &palette),
    }
    draw_bottom(frame, outer[3], app);
}

fn draw_top_banner(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.last_error.as_deref() {
        Line::from(Span::styled(
            format!("error: {err}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(info) = app.info_message.as_deref() {
        Line::from(Span::styled(info.to_string(), Style::default().fg(Color::Yellow)))
    } else {
        Line::from(Span::styled(
            "r reload · e export · tab switch view · ↑/↓ scroll · PgUp/PgDn logs · q quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = ViewId::ALL
        .iter()
        .map(|view| Line::from(view.title()))
        .collect();
    let fingerprint = app
        .snapshot
        .as_ref()
        .map(|s| s.fingerprint.as_str())
        .unwrap_or("-");
    let title = format!(
        "{} · {} · {}",
        app.config.dashboard.title,
        app.source_label(),
        fingerprint
    );
    let tabs = Tabs::new(titles)
        .block(Block::default().title(title).borders(Borders::ALL))
        .select(app.active_view.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_empty(frame: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(app.config.dashboard.title.clone()),
        Line::from(""),
        Line::from("No trades loaded."),
        Line::from("Press r to load the configured trade source."),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title("Dashboard").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_dashboard(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &DashboardSnapshot,
    palette: &Palette,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)].as_ref())
        .split(area);
    draw_kpis(frame, rows[0], app, snapshot, palette);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    let equity_data: Vec<(f64, f64)> = snapshot
        .report
        .equity_curve
        .iter()
        .enumerate()
        .map(|(idx, p)| ((idx + 1) as f64, p.cumulative_profit))
        .collect();
    let drawdown_data: Vec<(f64, f64)> = snapshot
        .report
        .drawdown
        .iter()
        .enumerate()
        .map(|(idx, p)| ((idx + 1) as f64, -p.drawdown))
        .collect();

    let period = snapshot
        .period()
        .map(|(start, end)| {
            format!(
                " {} → {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )
        })
        .unwrap_or_default();

    frame.render_widget(
        line_chart(
            &equity_data,
            "equity",
            format!("Equity curve{period}"),
            palette.equity,
        ),
        charts[0],
    );
    frame.render_widget(
        line_chart(
            &drawdown_data,
            "drawdown",
            "Drawdown".to_string(),
            palette.drawdown,
        ),
        charts[1],
    );
}

fn draw_kpis(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &DashboardSnapshot,
    palette: &Palette,
) {
    let summary = &snapshot.report.summary;
    let currency = &app.config.dashboard.currency;
    let cells = [
        (
            format!("Total PNL ({currency})"),
            format!("{:.2}", summary.total_pnl),
            palette.pnl(summary.total_pnl),
        ),
        (
            "Trades".to_string(),
            summary.total_trades.to_string(),
            Style::default(),
        ),
        (
            "Win rate".to_string(),
            format!("{:.2}%", summary.win_rate),
            Style::default(),
        ),
        (
            "Avg gain".to_string(),
            format!("{:.2}", summary.average_gain),
            Style::default().fg(palette.profit),
        ),
        (
            "Avg loss".to_string(),
            format!("{:.2}", summary.average_loss),
            Style::default().fg(palette.loss),
        ),
        (
            "Max drawdown".to_string(),
            format!("{:.2}", summary.max_drawdown),
            Style::default().fg(palette.drawdown),
        ),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cells.len() as u32); 6].as_ref())
        .split(area);
    for ((label, value, style), column) in cells.into_iter().zip(columns.iter()) {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                value,
                style.add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().title(label).borders(Borders::ALL)),
            *column,
        );
    }
}

fn line_chart<'a>(
    data: &'a [(f64, f64)],
    name: &'a str,
    title: String,
    color: Color,
) -> Chart<'a> {
    let (x_min, x_max) = x_bounds(data);
    let (y_min, y_max) = y_bounds(data);
    Chart::new(vec![Dataset::default()
        .name(name)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)])
    .block(Block::default().title(title).borders(Borders::ALL))
    .x_axis(
        Axis::default()
            .bounds([x_min, x_max])
            .labels(axis_labels(x_min, x_max, 0)),
    )
    .y_axis(
        Axis::default()
            .bounds([y_min, y_max])
            .labels(axis_labels(y_min, y_max, 2)),
    )
}

fn draw_trades(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &DashboardSnapshot,
    palette: &Palette,
) {
    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = snapshot
        .trades
        .iter()
        .zip(&snapshot.report.equity_curve)
        .zip(&snapshot.report.drawdown)
        .skip(app.trade_scroll)
        .take(visible)
        .map(|((trade, equity), drawdown)| {
            Row::new(vec![
                Cell::from(trade.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(trade.symbol.clone()),
                Cell::from(trade.side.as_str()),
                Cell::from(format!("{:.2}", trade.volume)),
                Cell::from(format!("{:.5}", trade.open_price)),
                Cell::from(format!("{:.5}", trade.close_price)),
                Cell::from(format!("{:.2}", trade.profit)).style(palette.pnl(trade.profit)),
                Cell::from(format!("{:.2}", equity.cumulative_profit)),
                Cell::from(format!("{:.2}", drawdown.drawdown)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        "timestamp", "symbol", "side", "volume", "open", "close", "profit", "equity", "drawdown",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(19),
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(10),
    ];
    let title = format!(
        "Trades {}/{}",
        (app.trade_scroll + 1).min(snapshot.trades.len()),
        snapshot.trades.len()
    );
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL)),
        area,
    );
}

fn draw_daily(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    snapshot: &DashboardSnapshot,
    palette: &Palette,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(10)].as_ref())
        .split(area);

    let visible = columns[0].height.saturating_sub(3) as usize;
    let rows: Vec<Row> = snapshot
        .daily
        .iter()
        .skip(app.daily_scroll)
        .take(visible)
        .map(|row| {
            Row::new(vec![
                Cell::from(row.date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("{:.2}", row.pnl)).style(palette.pnl(row.pnl)),
            ])
        })
        .collect();
    let header =
        Row::new(vec!["date", "daily pnl"]).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(
        Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
            .header(header)
            .block(
                Block::default()
                    .title(format!("Daily PNL ({} days)", snapshot.daily.len()))
                    .borders(Borders::ALL),
            ),
        columns[0],
    );

    let daily_data: Vec<(f64, f64)> = snapshot
        .daily
        .iter()
        .enumerate()
        .map(|(idx, row)| (idx as f64, row.pnl))
        .collect();
    let total: f64 = snapshot.daily.iter().map(|row| row.pnl).sum();
    let color = if total >= 0.0 {
        palette.profit
    } else {
        palette.loss
    };
    frame.render_widget(
        line_chart(
            &daily_data,
            "daily",
            format!("Daily PNL by day (sum {total:.2})"),
            color,
        ),
        columns[1],
    );
}

fn x_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    (x_min, x_max)
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, y) in points {
        min = min.min(*y);
        max = max.max(*y);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn axis_labels(min: f64, max: f64, decimals: usize) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(format!("{min:.decimals$}")),
        Line::from(format!("{mid:.decimals$}")),
        Line::from(format!("{max:.decimals$}")),
    ]
}

fn draw_bottom(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let visible = app.logs.lock().tail(app.log_scroll, max_lines);
    let text: Vec<Line> = visible.into_iter().map(Line::from).collect();
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().title("Logs").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::{axis_labels, y_bounds, Palette};
    use disciplined_application::config::ThemeConfig;
    use ratatui::style::Color;

    #[test]
    fn palette_parses_hex_theme() {
        let palette = Palette::from_theme(&ThemeConfig::default());
        assert_eq!(palette.profit, Color::Rgb(0x2e, 0xcc, 0x71));
        assert_eq!(palette.loss, Color::Rgb(0xff, 0x4d, 0x4d));
    }

    #[test]
    fn flat_series_gets_a_visible_range() {
        assert_eq!(y_bounds(&[(1.0, 5.0), (2.0, 5.0)]), (4.0, 6.0));
        assert_eq!(y_bounds(&[]), (0.0, 1.0));
    }

    #[test]
    fn labels_use_requested_precision() {
        let labels = axis_labels(0.0, 10.0, 0);
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[1].to_string(), "5");
    }
}
