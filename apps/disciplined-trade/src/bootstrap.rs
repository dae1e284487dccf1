use disciplined_application::config::{load_config, Config, SourceKind};
use disciplined_domain::repositories::trades::TradeSource;
use disciplined_infrastructure::sources::{CsvTradeSource, MockTradeParams, MockTradeSource};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "DISCIPLINED_CONFIG";

/// `--config` wins over `DISCIPLINED_CONFIG`; blank values count as unset.
pub fn resolve_config_path(cli: Option<PathBuf>) -> Option<PathBuf> {
    cli.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
}

pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => {
            let config = load_config(path)?;
            info!(config = %path.display(), "config loaded");
            Ok(config)
        }
        None => {
            info!("no config given, using built-in defaults");
            Ok(Config::default())
        }
    }
}

pub fn mock_params(config: &Config) -> Result<MockTradeParams, String> {
    let mock = &config.mock;
    let params = MockTradeParams {
        seed: mock.seed,
        trades: mock.trades,
        start: mock.start_time()?,
        days: mock.days,
        symbols: mock.symbols.clone(),
        min_profit: mock.min_profit,
        max_profit: mock.max_profit,
    };
    params.validate()?;
    Ok(params)
}

pub fn build_source(config: &Config) -> Result<Box<dyn TradeSource>, String> {
    match config.source.kind {
        SourceKind::Mock => Ok(Box::new(MockTradeSource::new(mock_params(config)?))),
        SourceKind::Csv => {
            let path = config
                .source
                .path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| "source.path is required when source.kind = \"csv\"".to_string())?;
            Ok(Box::new(CsvTradeSource::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{build_source, load_config_or_default, mock_params};
    use disciplined_application::config::{parse_config, Config};

    #[test]
    fn defaults_build_the_mock_source() {
        let config = load_config_or_default(None).expect("defaults");
        let source = build_source(&config).expect("source");
        assert_eq!(source.describe(), "mock(seed=42, trades=120)");
    }

    #[test]
    fn csv_source_uses_configured_path() {
        let config =
            parse_config("[source]\nkind = \"csv\"\npath = \"data/trades.csv\"\n").expect("config");
        let source = build_source(&config).expect("source");
        assert_eq!(source.describe(), "csv(data/trades.csv)");
    }

    #[test]
    fn invalid_mock_table_is_a_config_error() {
        let mut config = Config::default();
        config.mock.days = 0;
        assert!(mock_params(&config).is_err());
        assert!(build_source(&config).is_err());
    }
}
