use clap::{Parser, ValueEnum};
use disciplined_trade::bootstrap::{load_config_or_default, resolve_config_path};
use disciplined_trade::headless::{HeadlessArgs, HeadlessMode};
use disciplined_trade::{logging, TuiOpts};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "disciplined-trade")]
#[command(about = "DISCIPLINEDTRADE performance dashboard (TUI) + headless runner.", version)]
struct Cli {
    /// Run without TUI and exit after the selected mode completes.
    #[arg(long)]
    headless: bool,

    /// Headless mode: summary | export | generate
    #[arg(long)]
    mode: Option<Mode>,

    /// Config file path (TOML). If omitted, uses env DISCIPLINED_CONFIG, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory (export) or CSV file (generate).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Summary,
    Export,
    Generate,
}

fn main() {
    let cli = Cli::parse();

    let log_store = Arc::new(parking_lot::Mutex::new(logging::LogStore::new(5000)));
    if let Err(err) = init_tracing(cli.headless, log_store.clone()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    tracing::debug!(
        git_sha = env!("DISCIPLINED_GIT_SHA"),
        target = env!("DISCIPLINED_TARGET"),
        "disciplined-trade starting"
    );

    let config_path = resolve_config_path(cli.config);

    if cli.headless {
        let mode = match cli.mode {
            Some(Mode::Summary) => HeadlessMode::Summary,
            Some(Mode::Export) => HeadlessMode::Export,
            Some(Mode::Generate) => HeadlessMode::Generate,
            None => {
                eprintln!("error: --mode is required with --headless");
                std::process::exit(1);
            }
        };

        let result = disciplined_trade::headless::run_headless(HeadlessArgs {
            mode,
            config_path,
            out: cli.out,
        });

        match result {
            Ok(json) => {
                println!(
                    "{}",
                    serde_json::to_string(&json)
                        .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
                );
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    if cli.mode.is_some() {
        eprintln!("error: --mode requires --headless");
        std::process::exit(1);
    }

    let config = match load_config_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = disciplined_trade::run(TuiOpts { config, log_store }) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(headless: bool, log_store: logging::SharedLogStore) -> Result<(), String> {
    let filter = std::env::var("DISCIPLINED_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(logging::LogMakeWriter::new(log_store))
            .init();
    }

    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("DISCIPLINED_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid DISCIPLINED_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
