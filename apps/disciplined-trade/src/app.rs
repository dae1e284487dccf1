use crate::logging::SharedLogStore;
use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use disciplined_application::config::Config;
use disciplined_application::dashboard::{refresh_dashboard, DashboardCache, DashboardSnapshot};
use disciplined_application::reporting::{default_export_dir, export_snapshot};
use disciplined_domain::events::domain_event::DomainEvent;
use disciplined_domain::repositories::trades::TradeSource;
use disciplined_infrastructure::artifacts::FilesystemArtifactWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const INFO_TTL: Duration = Duration::from_secs(4);

pub enum AppEvent {
    Input(CtEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Dashboard,
    Trades,
    Daily,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [ViewId::Dashboard, ViewId::Trades, ViewId::Daily];

    pub fn title(self) -> &'static str {
        match self {
            ViewId::Dashboard => "Dashboard",
            ViewId::Trades => "Trades",
            ViewId::Daily => "Daily PNL",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ViewId::Dashboard => 0,
            ViewId::Trades => 1,
            ViewId::Daily => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub active_view: ViewId,
    pub config: Arc<Config>,
    source: Box<dyn TradeSource>,
    cache: DashboardCache,

    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub last_events: Vec<DomainEvent>,
    pub last_export: Option<PathBuf>,

    pub logs: SharedLogStore,
    pub log_scroll: usize,
    pub trade_scroll: usize,
    pub daily_scroll: usize,

    pub dirty: bool,
    seen_log_lines: u64,
    pub last_error: Option<String>,
    pub info_message: Option<String>,
    info_expires_at: Option<Instant>,
}

impl App {
    pub fn new(config: Arc<Config>, source: Box<dyn TradeSource>, logs: SharedLogStore) -> Self {
        Self {
            active_view: ViewId::Dashboard,
            config,
            source,
            cache: DashboardCache::new(),
            snapshot: None,
            last_events: Vec::new(),
            last_export: None,
            logs,
            log_scroll: 0,
            trade_scroll: 0,
            daily_scroll: 0,
            dirty: true,
            seen_log_lines: 0,
            last_error: None,
            info_message: None,
            info_expires_at: None,
        }
    }

    pub fn source_label(&self) -> String {
        self.source.describe()
    }

    pub fn spawn_input_reader(&self, tx: tokio::sync::mpsc::UnboundedSender<AppEvent>) {
        std::thread::spawn(move || {
            while let Ok(event) = crossterm::event::read() {
                if tx.send(AppEvent::Input(event)).is_err() {
                    break;
                }
            }
        });
    }

    /// Re-reads the source and publishes it to the cache. On failure the
    /// previous snapshot stays on screen.
    pub fn reload(&mut self) {
        match refresh_dashboard(&mut self.cache, self.source.as_ref()) {
            Ok(outcome) => {
                let message = if outcome.recomputed {
                    format!(
                        "metrics recomputed ({} trades, {})",
                        outcome.snapshot.report.summary.total_trades, outcome.snapshot.fingerprint
                    )
                } else {
                    format!("trade set unchanged ({})", outcome.snapshot.fingerprint)
                };
                let scroll_reset = self
                    .snapshot
                    .as_ref()
                    .map(|s| s.fingerprint != outcome.snapshot.fingerprint)
                    .unwrap_or(true);
                if scroll_reset {
                    self.trade_scroll = 0;
                    self.daily_scroll = 0;
                }
                self.snapshot = Some(outcome.snapshot);
                self.last_events = outcome.events;
                self.last_error = None;
                self.set_info(message);
            }
            Err(err) => {
                warn!(error = %err, "reload failed");
                self.last_error = Some(err);
            }
        }
        self.dirty = true;
    }

    pub fn export(&mut self) {
        let Some(snapshot) = self.snapshot.clone() else {
            self.last_error = Some("nothing to export yet (press r to load trades)".to_string());
            self.dirty = true;
            return;
        };
        let out_dir = default_export_dir(&self.config, &snapshot);
        match export_snapshot(
            &self.config,
            &snapshot,
            &self.last_events,
            &out_dir,
            &FilesystemArtifactWriter::new(),
        ) {
            Ok(result) => {
                info!(out_dir = %result.out_dir.display(), "dashboard exported");
                self.set_info(format!("exported to {}", result.out_dir.display()));
                self.last_export = Some(result.out_dir);
                self.last_error = None;
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.last_error = Some(format!("export failed: {err}"));
            }
        }
        self.dirty = true;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.info_expires_at = Some(Instant::now() + INFO_TTL);
    }

    pub fn on_tick(&mut self) {
        if let Some(until) = self.info_expires_at {
            if Instant::now() >= until {
                self.info_message = None;
                self.info_expires_at = None;
                self.dirty = true;
            }
        }
        let pushed = self.logs.lock().total_pushed();
        if pushed != self.seen_log_lines {
            self.seen_log_lines = pushed;
            self.dirty = true;
        }
    }

    pub fn on_event(&mut self, event: AppEvent) -> Result<bool, String> {
        match event {
            AppEvent::Input(ct) => self.on_input(ct),
        }
    }

    fn on_input(&mut self, event: CtEvent) -> Result<bool, String> {
        match event {
            CtEvent::Key(key) if key.kind != KeyEventKind::Release => self.on_key(key),
            CtEvent::Resize(_, _) => {
                self.dirty = true;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<bool, String> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Right => self.active_view = self.active_view.next(),
            KeyCode::BackTab | KeyCode::Left => self.active_view = self.active_view.prev(),
            KeyCode::Char('1') => self.active_view = ViewId::Dashboard,
            KeyCode::Char('2') => self.active_view = ViewId::Trades,
            KeyCode::Char('3') => self.active_view = ViewId::Daily,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_table(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_table(1),
            KeyCode::PageUp => {
                let max = self.logs.lock().len();
                self.log_scroll = (self.log_scroll + 5).min(max);
            }
            KeyCode::PageDown => self.log_scroll = self.log_scroll.saturating_sub(5),
            _ => return Ok(false),
        }
        self.dirty = true;
        Ok(false)
    }

    fn scroll_table(&mut self, delta: isize) {
        let (rows, scroll) = match (self.active_view, self.snapshot.as_ref()) {
            (ViewId::Trades, Some(s)) => (s.trades.len(), &mut self.trade_scroll),
            (ViewId::Daily, Some(s)) => (s.daily.len(), &mut self.daily_scroll),
            _ => return,
        };
        let max = rows.saturating_sub(1);
        *scroll = scroll.saturating_add_signed(delta).min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppEvent, ViewId};
    use crate::logging::LogStore;
    use chrono::{TimeZone, Utc};
    use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyModifiers};
    use disciplined_application::config::Config;
    use disciplined_domain::repositories::trades::TradeSource;
    use disciplined_domain::value_objects::trade::Trade;
    use disciplined_infrastructure::sources::{MockTradeParams, MockTradeSource};
    use std::cell::Cell;
    use std::sync::Arc;

    struct FlakySource {
        inner: MockTradeSource,
        fail: Arc<Cell<bool>>,
    }

    impl TradeSource for FlakySource {
        fn describe(&self) -> String {
            "flaky".to_string()
        }

        fn load_trades(&self) -> Result<Vec<Trade>, String> {
            if self.fail.get() {
                return Err("source offline".to_string());
            }
            self.inner.load_trades()
        }
    }

    fn mock(trades: usize) -> MockTradeSource {
        MockTradeSource::new(MockTradeParams {
            seed: 9,
            trades,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            days: 10,
            symbols: vec!["EURUSD".to_string()],
            min_profit: -50.0,
            max_profit: 80.0,
        })
    }

    fn make_app(source: Box<dyn TradeSource>) -> App {
        App::new(
            Arc::new(Config::default()),
            source,
            Arc::new(parking_lot::Mutex::new(LogStore::new(10))),
        )
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Input(CtEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn reload_populates_snapshot_then_hits_cache() {
        let mut app = make_app(Box::new(mock(25)));
        assert!(app.snapshot.is_none());

        app.on_event(key(KeyCode::Char('r'))).expect("reload");
        let first = app.snapshot.clone().expect("snapshot");
        assert_eq!(first.report.summary.total_trades, 25);
        assert_eq!(app.last_events.len(), 2);

        app.on_event(key(KeyCode::Char('r'))).expect("reload");
        assert_eq!(app.last_events.len(), 1);
        assert!(app
            .info_message
            .as_deref()
            .is_some_and(|m| m.starts_with("trade set unchanged")));
        assert!(Arc::ptr_eq(&first, app.snapshot.as_ref().expect("snapshot")));
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let fail = Arc::new(Cell::new(false));
        let mut app = make_app(Box::new(FlakySource {
            inner: mock(5),
            fail: fail.clone(),
        }));
        app.reload();
        let before = app.snapshot.clone().expect("snapshot");

        fail.set(true);
        app.reload();
        assert!(app
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("source offline")));
        assert_eq!(app.snapshot.as_deref(), Some(before.as_ref()));
    }

    #[test]
    fn quit_keys() {
        let mut app = make_app(Box::new(mock(1)));
        assert!(app.on_event(key(KeyCode::Char('q'))).expect("q"));
        assert!(app.on_event(key(KeyCode::Esc)).expect("esc"));
        let ctrl_c = AppEvent::Input(CtEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.on_event(ctrl_c).expect("ctrl-c"));
        assert!(!app.on_event(key(KeyCode::Char('x'))).expect("ignored"));
    }

    #[test]
    fn views_cycle_in_both_directions() {
        let mut app = make_app(Box::new(mock(1)));
        app.on_event(key(KeyCode::Tab)).expect("tab");
        assert_eq!(app.active_view, ViewId::Trades);
        app.on_event(key(KeyCode::Tab)).expect("tab");
        app.on_event(key(KeyCode::Tab)).expect("tab");
        assert_eq!(app.active_view, ViewId::Dashboard);
        app.on_event(key(KeyCode::BackTab)).expect("backtab");
        assert_eq!(app.active_view, ViewId::Daily);
        app.on_event(key(KeyCode::Char('2'))).expect("2");
        assert_eq!(app.active_view, ViewId::Trades);
    }

    #[test]
    fn table_scroll_is_clamped_to_rows() {
        let mut app = make_app(Box::new(mock(3)));
        app.reload();
        app.active_view = ViewId::Trades;
        for _ in 0..10 {
            app.on_event(key(KeyCode::Down)).expect("down");
        }
        assert_eq!(app.trade_scroll, 2);
        for _ in 0..10 {
            app.on_event(key(KeyCode::Up)).expect("up");
        }
        assert_eq!(app.trade_scroll, 0);
    }

    #[test]
    fn export_without_snapshot_reports_error() {
        let mut app = make_app(Box::new(mock(1)));
        app.export();
        assert!(app.last_error.is_some());
        assert!(app.last_export.is_none());
    }
}
