use crate::reporting;
use disciplined_domain::entities::metrics::{MetricsReport, MetricsSummary};
use disciplined_domain::repositories::artifacts::ArtifactWriter;
use disciplined_domain::services::audit::AuditEvent;
use disciplined_domain::value_objects::daily_pnl::DailyPnl;
use disciplined_domain::value_objects::trade::Trade;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(path)
            .map_err(|err| format!("failed to create dir {}: {}", path.display(), err))
    }

    fn write_trades_csv(
        &self,
        path: &Path,
        trades: &[Trade],
        report: &MetricsReport,
    ) -> Result<(), String> {
        reporting::write_trades_csv(path, trades, report)
    }

    fn write_daily_csv(&self, path: &Path, daily: &[DailyPnl]) -> Result<(), String> {
        reporting::write_daily_csv(path, daily)
    }

    fn write_summary_json(
        &self,
        path: &Path,
        summary: &MetricsSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        reporting::write_summary_json(path, summary, meta)
    }

    fn write_dashboard_html(
        &self,
        path: &Path,
        trades: &[Trade],
        report: &MetricsReport,
        daily: &[DailyPnl],
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        reporting::write_dashboard_html(path, trades, report, daily, meta)
    }

    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<(), String> {
        reporting::write_audit_jsonl(path, events)
    }
}
