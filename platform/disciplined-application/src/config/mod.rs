use chrono::{DateTime, Utc};
pub use disciplined_domain::services::color::is_hex_color;
use disciplined_domain::services::validation::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub source: SourceConfig,
    pub mock: MockConfig,
    pub paths: PathsConfig,
    pub report: ReportConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    pub title: String,
    pub currency: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "DISCIPLINEDTRADE".to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Mock,
    Csv,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MockConfig {
    pub seed: u64,
    pub trades: usize,
    pub start: String,
    pub days: u32,
    pub symbols: Vec<String>,
    pub min_profit: f64,
    pub max_profit: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            trades: 120,
            start: "2024-01-01T00:00:00Z".to_string(),
            days: 90,
            symbols: ["EURUSD", "GBPUSD", "USDJPY", "XAUUSD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_profit: -400.0,
            max_profit: 600.0,
        }
    }
}

impl MockConfig {
    pub fn start_time(&self) -> Result<DateTime<Utc>, String> {
        parse_timestamp(&self.start).map_err(|err| format!("mock.start: {err}"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PathsConfig {
    pub out_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            out_dir: "runs/".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ReportConfig {
    pub html: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { html: true }
    }
}

/// Presentation colours. Never read by the metrics engine.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ThemeConfig {
    pub profit_color: String,
    pub loss_color: String,
    pub equity_color: String,
    pub drawdown_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            profit_color: "#2ecc71".to_string(),
            loss_color: "#ff4d4d".to_string(),
            equity_color: "#4da3ff".to_string(),
            drawdown_color: "#ffb347".to_string(),
        }
    }
}

impl ThemeConfig {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "profit_color": self.profit_color,
            "loss_color": self.loss_color,
            "equity_color": self.equity_color,
            "drawdown_color": self.drawdown_color,
        })
    }

    fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("theme.profit_color", &self.profit_color),
            ("theme.loss_color", &self.loss_color),
            ("theme.equity_color", &self.equity_color),
            ("theme.drawdown_color", &self.drawdown_color),
        ] {
            if !is_hex_color(value) {
                return Err(format!("{key} must be a #rrggbb colour (got '{value}')"));
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.dashboard.title.trim().is_empty() {
            return Err("dashboard.title must not be empty".to_string());
        }
        if self.dashboard.currency.trim().is_empty() {
            return Err("dashboard.currency must not be empty".to_string());
        }
        if self.source.kind == SourceKind::Csv
            && self
                .source
                .path
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err("source.path is required when source.kind = \"csv\"".to_string());
        }
        if self.paths.out_dir.trim().is_empty() {
            return Err("paths.out_dir must not be empty".to_string());
        }
        self.mock.start_time()?;
        self.theme.validate()
    }
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    let config: Config =
        toml::from_str(contents).map_err(|err| format!("failed to parse TOML: {err}"))?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = parse_config(&contents).map_err(|err| format!("{}: {}", path.display(), err))?;
    Ok((config, contents))
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{is_hex_color, parse_config, to_toml_pretty, Config, SourceKind};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.dashboard.title, "DISCIPLINEDTRADE");
        assert_eq!(config.source.kind, SourceKind::Mock);
        assert_eq!(config.mock.seed, 42);
        assert_eq!(config.mock.symbols.len(), 4);
        assert!(config.report.html);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = parse_config(
            r##"
[source]
kind = "csv"
path = "data/trades.csv"

[mock]
seed = 7

[theme]
loss_color = "#aa0000"
"##,
        )
        .expect("parse");
        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.source.path.as_deref(), Some("data/trades.csv"));
        assert_eq!(config.mock.seed, 7);
        assert_eq!(config.mock.trades, 120);
        assert_eq!(config.theme.loss_color, "#aa0000");
        assert_eq!(config.theme.profit_color, "#2ecc71");
    }

    #[test]
    fn parse_config_rejects_malformed_toml() {
        let err = parse_config("[dashboard\ntitle = 1").expect_err("malformed");
        assert!(err.starts_with("failed to parse TOML"));
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let err = parse_config("[dashboard]\ntitle = \"x\"\ncolour = \"red\"\n")
            .expect_err("unknown field");
        assert!(err.contains("colour"), "{err}");

        assert!(parse_config("[charts]\nkind = \"line\"\n").is_err());
    }

    #[test]
    fn csv_source_requires_path() {
        let err = parse_config("[source]\nkind = \"csv\"\n").expect_err("missing path");
        assert!(err.contains("source.path"));
    }

    #[test]
    fn theme_colours_must_be_hex() {
        let err = parse_config("[theme]\nequity_color = \"blue\"\n").expect_err("bad colour");
        assert!(err.contains("theme.equity_color"));
        assert!(is_hex_color("#00FFaa"));
        assert!(!is_hex_color("#00FFa"));
        assert!(!is_hex_color("00FFaa0"));
    }

    #[test]
    fn mock_start_must_be_a_timestamp() {
        let err = parse_config("[mock]\nstart = \"soon\"\n").expect_err("bad start");
        assert!(err.contains("mock.start"));
    }

    #[test]
    fn sample_config_matches_defaults() {
        let sample = include_str!("../../../ops/configs/sample.toml");
        assert_eq!(parse_config(sample).expect("sample"), Config::default());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Csv;
        config.source.path = Some("trades.csv".to_string());
        let rendered = to_toml_pretty(&config).expect("render");
        assert_eq!(parse_config(&rendered).expect("reparse"), config);
    }
}
