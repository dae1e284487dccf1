use crate::entities::metrics::{MetricsReport, MetricsSummary};
use crate::services::audit::AuditEvent;
use crate::value_objects::daily_pnl::DailyPnl;
use crate::value_objects::trade::Trade;
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    /// `trades` must be in the same (time-sorted) order the report was computed in.
    fn write_trades_csv(
        &self,
        path: &Path,
        trades: &[Trade],
        report: &MetricsReport,
    ) -> Result<(), String>;
    fn write_daily_csv(&self, path: &Path, daily: &[DailyPnl]) -> Result<(), String>;
    fn write_summary_json(
        &self,
        path: &Path,
        summary: &MetricsSummary,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String>;
    fn write_dashboard_html(
        &self,
        path: &Path,
        trades: &[Trade],
        report: &MetricsReport,
        daily: &[DailyPnl],
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String>;
    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<(), String>;
}
