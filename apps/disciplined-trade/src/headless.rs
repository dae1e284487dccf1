use crate::bootstrap::{build_source, load_config_or_default, mock_params};
use disciplined_application::dashboard::{fingerprint_trades, refresh_dashboard, DashboardCache};
use disciplined_application::reporting::{
    default_export_dir, export_result_json, export_snapshot, summary_json,
};
use disciplined_infrastructure::artifacts::FilesystemArtifactWriter;
use disciplined_infrastructure::reporting::write_raw_trades_csv;
use disciplined_infrastructure::sources::mock::generate_trades;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessMode {
    Summary,
    Export,
    Generate,
}

impl HeadlessMode {
    fn label(self) -> &'static str {
        match self {
            HeadlessMode::Summary => "summary",
            HeadlessMode::Export => "export",
            HeadlessMode::Generate => "generate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessArgs {
    pub mode: HeadlessMode,
    pub config_path: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

pub fn run_headless(args: HeadlessArgs) -> Result<serde_json::Value, String> {
    let config = load_config_or_default(args.config_path.as_deref())?;
    let _span = tracing::info_span!("headless", mode = args.mode.label()).entered();

    match args.mode {
        HeadlessMode::Summary => {
            let source = build_source(&config)?;
            let mut cache = DashboardCache::new();
            let outcome = refresh_dashboard(&mut cache, source.as_ref())?;
            let mut json = summary_json(&config, &outcome.snapshot);
            json["mode"] = serde_json::json!("summary");
            Ok(json)
        }
        HeadlessMode::Export => {
            let source = build_source(&config)?;
            let mut cache = DashboardCache::new();
            let outcome = refresh_dashboard(&mut cache, source.as_ref())?;
            let out_dir = args
                .out
                .unwrap_or_else(|| default_export_dir(&config, &outcome.snapshot));
            let result = export_snapshot(
                &config,
                &outcome.snapshot,
                &outcome.events,
                &out_dir,
                &FilesystemArtifactWriter::new(),
            )?;
            let mut json = summary_json(&config, &outcome.snapshot);
            json["mode"] = serde_json::json!("export");
            json["export"] = export_result_json(&result);
            Ok(json)
        }
        HeadlessMode::Generate => {
            let out = args
                .out
                .ok_or_else(|| "--out FILE is required for --mode generate".to_string())?;
            let params = mock_params(&config)?;
            let trades = generate_trades(&params)?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| {
                    format!("failed to create dir {}: {}", parent.display(), err)
                })?;
            }
            write_raw_trades_csv(&out, &trades)?;
            let fingerprint = fingerprint_trades(&trades)?;
            info!(out = %out.display(), trades = trades.len(), "mock trades written");
            Ok(serde_json::json!({
                "mode": "generate",
                "out": out.display().to_string(),
                "trades": trades.len(),
                "seed": params.seed,
                "fingerprint": fingerprint,
            }))
        }
    }
}
